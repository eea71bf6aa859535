use crate::auth::auth::AuthUser;
use crate::auth::policy::{Action, Actor, Resource, ResourceKind, authorize, scope_list};
use crate::error::{ApiError, ApiResult};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::utils::db_utils::page_window;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

const LEAVE_COLUMNS: &str =
    "id, employee_id, start_date, end_date, leave_type, reason, status, created_at";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[schema(example = "Flu")]
    pub reason: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID (employees may only name themselves)
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u32>,
}

// typed binding for the dynamic filters
enum FilterValue {
    U64(u64),
    Str(String),
}

async fn find_leave(pool: &MySqlPool, leave_id: u64) -> ApiResult<Option<LeaveRequest>> {
    let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);

    Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(pool)
        .await?)
}

/// Only privileged actors learn that an id does not exist; everyone else gets
/// the same 403 for a missing row as for a foreign one.
fn visible_leave(actor: &Actor, leave: Option<LeaveRequest>) -> ApiResult<LeaveRequest> {
    match leave {
        Some(leave) => {
            authorize(
                actor,
                &Resource::owned_by(ResourceKind::Leave, leave.employee_id),
                Action::Read,
            )?;
            Ok(leave)
        }
        None => {
            authorize(actor, &Resource::collection(ResourceKind::Leave), Action::Read)?;
            Err(ApiError::NotFound("Leave request not found".to_string()))
        }
    }
}

/// Moves a pending request to `status`. Anything already decided stays as is.
async fn decide(
    auth: &AuthUser,
    pool: &MySqlPool,
    leave_id: u64,
    status: LeaveStatus,
) -> ApiResult<LeaveRequest> {
    authorize(&auth.actor(), &Resource::collection(ResourceKind::Leave), Action::Write)?;

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ?
        AND status = ?
        "#,
    )
    .bind(status.to_string())
    .bind(leave_id)
    .bind(LeaveStatus::Pending.to_string())
    .execute(pool)
    .await?;

    let leave = find_leave(pool, leave_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Leave request not found".to_string()))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Validation(format!(
            "Leave request already {}",
            leave.status
        )));
    }

    info!(leave_id, employee_id = leave.employee_id, status = %status, "Leave request decided");
    Ok(leave)
}

/* =========================
Create leave request
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Bad request", body = Object, example = json!({
            "message": "start_date cannot be after end_date"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(skip(auth, pool), fields(user_id = auth.user_id))]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> ApiResult<HttpResponse> {
    let employee_id = auth.require_employee_id()?;
    authorize(
        &auth.actor(),
        &Resource::owned_by(ResourceKind::Leave, employee_id),
        Action::Create,
    )?;

    if payload.start_date > payload.end_date {
        return Err(ApiError::Validation(
            "start_date cannot be after end_date".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, start_date, end_date, leave_type, reason, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type.to_string())
    .bind(payload.reason.as_deref())
    .bind(LeaveStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ApiError::NotFound(format!("Employee {} not found", employee_id))
        }
        _ => ApiError::from(e),
    })?;

    let leave_id = result.last_insert_id();
    let leave = find_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Leave request not found".to_string()))?;

    info!(leave_id, employee_id, "Leave request submitted");
    Ok(HttpResponse::Created().json(leave))
}

/* =========================
Approve leave (HR/Admin)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = LeaveRequest),
        (status = 400, description = "Leave request already processed", body = Object, example = json!({
            "message": "Leave request already rejected"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(skip(auth, pool), fields(user_id = auth.user_id))]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    let leave = decide(&auth, pool.get_ref(), path.into_inner(), LeaveStatus::Approved).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Reject leave (HR/Admin)
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = LeaveRequest),
        (status = 400, description = "Leave request already processed", body = Object, example = json!({
            "message": "Leave request already approved"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(skip(auth, pool), fields(user_id = auth.user_id))]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    let leave = decide(&auth, pool.get_ref(), path.into_inner(), LeaveStatus::Rejected).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(skip(auth, pool), fields(user_id = auth.user_id))]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    let leave = find_leave(pool.get_ref(), path.into_inner()).await?;
    let leave = visible_leave(&auth.actor(), leave)?;

    Ok(HttpResponse::Ok().json(leave))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees may only list their own leave")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(skip(auth, pool), fields(user_id = auth.user_id))]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> ApiResult<HttpResponse> {
    let employee_id = scope_list(&auth.actor(), ResourceKind::Leave, query.employee_id)?;

    // -------------------------
    // Pagination
    // -------------------------
    let (page, per_page, offset) = page_window(query.page, query.per_page);

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.to_string()));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
    debug!(sql = %count_sql, employee_id = ?employee_id, status = ?query.status, "Counting leave requests");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.as_str()),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT {}
        FROM leave_requests
        {}
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        LEAVE_COLUMNS, where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    }))
}
