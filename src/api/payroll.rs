use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiResult;
use crate::model::salary_structure::SalaryStructureInput;
use crate::payroll::service::PayrollService;

#[derive(Deserialize, ToSchema)]
pub struct CreatePayroll {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[serde(flatten)]
    pub salary: SalaryStructureInput,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = crate::payroll::service::PaginatedSalaryResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    query: web::Query<PayrollQuery>,
) -> ApiResult<HttpResponse> {
    let page = service
        .list(
            &auth.actor(),
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(10),
        )
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    post,
    path = "/api/payroll",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Salary structure created", body = crate::payroll::calculator::SalaryView),
        (status = 400, description = "Invalid salary inputs"),
        (status = 401),
        (status = 403),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee already has a salary structure")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    payload: web::Json<CreatePayroll>,
) -> ApiResult<HttpResponse> {
    let CreatePayroll {
        employee_id,
        salary,
    } = payload.into_inner();

    let view = service.create(&auth.actor(), employee_id, salary).await?;

    Ok(HttpResponse::Created().json(view))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id" = u64, Path, description = "Salary structure ID")
    ),
    responses(
        (status = 200, body = crate::payroll::calculator::SalaryView),
        (status = 401),
        (status = 403),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    let view = service.fetch_by_id(&auth.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}",
    request_body = SalaryStructureInput,
    params(
        ("payroll_id" = u64, Path, description = "Salary structure ID")
    ),
    responses(
        (status = 200, description = "Salary structure updated", body = crate::payroll::calculator::SalaryView),
        (status = 400),
        (status = 401),
        (status = 403),
        (status = 404, description = "Salary structure not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
    body: web::Json<SalaryStructureInput>,
) -> ApiResult<HttpResponse> {
    let view = service
        .update_by_id(&auth.actor(), path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    delete,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id" = u64, Path, description = "Salary structure ID")
    ),
    responses(
        (status = 204, description = "Salary structure deleted"),
        (status = 401),
        (status = 403),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    service.delete_by_id(&auth.actor(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/payroll/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, body = crate::payroll::calculator::SalaryView),
        (status = 401),
        (status = 403),
        (status = 404, description = "Salary structure not found for this employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_employee_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    let view = service.fetch(&auth.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    post,
    path = "/api/payroll/employee/{employee_id}",
    request_body = SalaryStructureInput,
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 201, description = "Salary structure created", body = crate::payroll::calculator::SalaryView),
        (status = 400),
        (status = 401),
        (status = 403),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee already has a salary structure")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_employee_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
    body: web::Json<SalaryStructureInput>,
) -> ApiResult<HttpResponse> {
    let view = service
        .create(&auth.actor(), path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(view))
}

#[utoipa::path(
    put,
    path = "/api/payroll/employee/{employee_id}",
    request_body = SalaryStructureInput,
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Salary structure updated", body = crate::payroll::calculator::SalaryView),
        (status = 400),
        (status = 401),
        (status = 403),
        (status = 404, description = "Salary structure not found for this employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_employee_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
    body: web::Json<SalaryStructureInput>,
) -> ApiResult<HttpResponse> {
    let view = service
        .update(&auth.actor(), path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    delete,
    path = "/api/payroll/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 204, description = "Salary structure deleted"),
        (status = 401),
        (status = 403),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_employee_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    service.delete(&auth.actor(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
