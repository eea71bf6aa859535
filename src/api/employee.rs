use crate::{
    auth::{
        auth::AuthUser,
        policy::{Action, Resource, ResourceKind, authorize},
    },
    error::{ApiError, ApiResult},
    model::employee::Employee,
    utils::db_utils::{Assignments, build_update_sql, execute_update},
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::ToSchema;

const EMPLOYEE_COLUMNS: &str = "id, employee_code, first_name, last_name, email, phone, \
                                department_id, job_title_id, hire_date, status";

/// Contact fields are editable by the employee; the rest is HR data.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(format = "email")]
    pub email: Option<String>,
    pub phone: Option<String>,

    pub employee_code: Option<String>,
    pub department_id: Option<u64>,
    pub job_title_id: Option<u64>,
    pub status: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: Option<NaiveDate>,
}

impl UpdateEmployee {
    fn touches_employment(&self) -> bool {
        self.employee_code.is_some()
            || self.department_id.is_some()
            || self.job_title_id.is_some()
            || self.status.is_some()
            || self.hire_date.is_some()
    }

    fn assignments(self) -> Assignments {
        let mut set = Assignments::new();
        set.set_opt("first_name", self.first_name)
            .set_opt("last_name", self.last_name)
            .set_opt("email", self.email)
            .set_opt("phone", self.phone)
            .set_opt("employee_code", self.employee_code)
            .set_opt("department_id", self.department_id)
            .set_opt("job_title_id", self.job_title_id)
            .set_opt("status", self.status)
            .set_opt("hire_date", self.hire_date);
        set
    }
}

async fn find_employee(pool: &MySqlPool, employee_id: u64) -> ApiResult<Option<Employee>> {
    let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);

    Ok(sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool)
        .await?)
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(skip(auth, pool), fields(user_id = auth.user_id))]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    let employee_id = path.into_inner();
    authorize(
        &auth.actor(),
        &Resource::owned_by(ResourceKind::Profile, employee_id),
        Action::Read,
    )?;

    let employee = find_employee(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "No fields provided"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 409, description = "Email or employee code already in use"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(skip(auth, pool, body), fields(user_id = auth.user_id))]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> ApiResult<HttpResponse> {
    let employee_id = path.into_inner();
    let actor = auth.actor();
    let body = body.into_inner();

    authorize(
        &actor,
        &Resource::owned_by(ResourceKind::Profile, employee_id),
        Action::Write,
    )?;
    if body.touches_employment() {
        authorize(&actor, &Resource::collection(ResourceKind::Profile), Action::Write)?;
    }

    let update = build_update_sql("employees", body.assignments(), "id", employee_id)
        .ok_or_else(|| ApiError::Validation("No fields provided for update".to_string()))?;

    execute_update(pool.get_ref(), update).await.map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Conflict("Email or employee code already in use".to_string())
        }
        _ => ApiError::from(e),
    })?;

    // a no-op update also reports 0 affected rows
    let employee = find_employee(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    info!(employee_id, "Employee profile updated");
    Ok(HttpResponse::Ok().json(employee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::testing::access_token;
    use crate::test_support::request;
    use actix_web::{http::StatusCode, test};
    use serde_json::json;

    #[actix_web::test]
    async fn contact_fields_are_not_employment_fields() {
        let contact = UpdateEmployee {
            phone: Some("+8801700000000".to_string()),
            email: Some("me@company.com".to_string()),
            ..Default::default()
        };
        assert!(!contact.touches_employment());

        let transfer = UpdateEmployee {
            department_id: Some(4),
            ..Default::default()
        };
        assert!(transfer.touches_employment());
    }

    #[actix_web::test]
    async fn employee_cannot_read_another_profile() {
        let app = test_app!();
        let req = request(test::TestRequest::get(), "/api/employee/8", &access_token(3, Some(7)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn employee_cannot_edit_another_profile() {
        let app = test_app!();
        let req = request(test::TestRequest::put(), "/api/employee/8", &access_token(3, Some(7)))
            .set_json(json!({ "phone": "123" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn employee_cannot_move_themselves_between_departments() {
        let app = test_app!();
        let req = request(test::TestRequest::put(), "/api/employee/7", &access_token(3, Some(7)))
            .set_json(json!({ "department_id": 2 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn empty_profile_update_is_rejected() {
        let app = test_app!();
        let req = request(test::TestRequest::put(), "/api/employee/7", &access_token(3, Some(7)))
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
