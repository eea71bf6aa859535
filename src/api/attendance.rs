use crate::auth::auth::AuthUser;
use crate::auth::policy::{Action, Resource, ResourceKind, authorize, scope_list};
use crate::error::{ApiError, ApiResult};
use crate::model::attendance::Attendance;
use crate::utils::db_utils::{SqlValue, page_window};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Employees may only name themselves; omitted means "me" (or everyone, for HR/Admin)
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    /// Inclusive lower bound on the attendance date
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound on the attendance date
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub end: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u32>,
    /// Records per page, at most 100
    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

async fn todays_attendance(pool: &MySqlPool, employee_id: u64) -> ApiResult<Option<Attendance>> {
    Ok(sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, check_in, check_out
        FROM attendance
        WHERE employee_id = ?
        AND date = CURDATE()
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?)
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses(
        (status = 201, description = "Checked in successfully", body = Attendance),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(user_id = auth.user_id))]
pub async fn check_in(auth: AuthUser, pool: web::Data<MySqlPool>) -> ApiResult<HttpResponse> {
    let employee_id = auth.require_employee_id()?;
    authorize(
        &auth.actor(),
        &Resource::owned_by(ResourceKind::Attendance, employee_id),
        Action::Create,
    )?;

    sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in)
        VALUES (?, CURDATE(), CURTIME())
        "#,
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| match &e {
        // one row per employee per day
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Validation("Already checked in today".to_string())
        }
        _ => ApiError::from(e),
    })?;

    let record = todays_attendance(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Attendance record not found".to_string()))?;

    info!(employee_id, "Checked in");
    Ok(HttpResponse::Created().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Attendance),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "You have not checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(user_id = auth.user_id))]
pub async fn check_out(auth: AuthUser, pool: web::Data<MySqlPool>) -> ApiResult<HttpResponse> {
    let employee_id = auth.require_employee_id()?;
    authorize(
        &auth.actor(),
        &Resource::owned_by(ResourceKind::Attendance, employee_id),
        Action::Write,
    )?;

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = CURTIME()
        WHERE employee_id = ?
        AND date = CURDATE()
        AND check_out IS NULL
        "#,
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await?;

    let record = todays_attendance(pool.get_ref(), employee_id).await?;

    match record {
        Some(record) if result.rows_affected() > 0 => {
            info!(employee_id, "Checked out");
            Ok(HttpResponse::Ok().json(record))
        }
        Some(_) => Err(ApiError::Validation("Already checked out today".to_string())),
        None => Err(ApiError::Validation("You have not checked in today".to_string())),
    }
}

/// Attendance history, newest first, one page at a time
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records", body = [Attendance]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees may only read their own history")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(skip(auth, pool), fields(user_id = auth.user_id))]
pub async fn attendance_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> ApiResult<HttpResponse> {
    let employee_id = scope_list(&auth.actor(), ResourceKind::Attendance, query.employee_id)?;
    let (_, per_page, offset) = page_window(query.page, query.per_page);

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<SqlValue> = Vec::new();

    if let Some(id) = employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(id.into());
    }
    if let Some(start) = query.start {
        where_sql.push_str(" AND date >= ?");
        args.push(start.into());
    }
    if let Some(end) = query.end {
        where_sql.push_str(" AND date <= ?");
        args.push(end.into());
    }

    let sql = format!(
        "SELECT id, employee_id, date, check_in, check_out FROM attendance{} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
        where_sql
    );
    debug!(sql = %sql, args = ?args, "Fetching attendance history");

    let mut data_q = sqlx::query_as::<_, Attendance>(&sql);
    for arg in args {
        data_q = match arg {
            SqlValue::U64(v) => data_q.bind(v),
            SqlValue::Date(v) => data_q.bind(v),
            SqlValue::String(v) => data_q.bind(v),
            SqlValue::I32(v) => data_q.bind(v),
            SqlValue::Decimal(v) => data_q.bind(v),
            SqlValue::Timestamp(v) => data_q.bind(v),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(records))
}
