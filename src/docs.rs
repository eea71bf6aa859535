use crate::api::attendance::AttendanceQuery;
use crate::api::employee::UpdateEmployee;
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::api::payroll::{CreatePayroll, PayrollQuery};
use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::model::salary_structure::{SalaryStructure, SalaryStructureInput};
use crate::payroll::calculator::{DerivedSalary, SalaryView};
use crate::payroll::service::PaginatedSalaryResponse;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Payroll API",
        version = "1.0.0",
        description = r#"
## Human Resource Management (HRM) Payroll

Salary structures with computed breakdowns, plus the employee self-service
resources they sit beside.

### Key Features
- **Payroll**
  - One salary structure per employee; every response carries the computed
    earnings, deductions and net salary
- **Employee profiles**
  - Read and update your own profile; HR/Admin manage everyone's
- **Attendance**
  - Daily check-in and check-out, history with date filters
- **Leave**
  - File leave, HR/Admin approve or reject

### Security
Every endpoint requires a **JWT Bearer access token** issued by the identity service.
**Admin** and **HR** see everything; **Employee** accounts only reach their own
profile, attendance and leave, and never payroll.

### Amounts
Monetary and percentage values are decimals rendered as strings with two
decimal places (`"21499.00"`). Requests accept strings or JSON numbers.
"#,
    ),
    paths(
        crate::api::payroll::list_payrolls,
        crate::api::payroll::create_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::delete_payroll,
        crate::api::payroll::get_employee_payroll,
        crate::api::payroll::create_employee_payroll,
        crate::api::payroll::update_employee_payroll,
        crate::api::payroll::delete_employee_payroll,

        crate::api::employee::get_employee,
        crate::api::employee::update_employee,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::attendance_history,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave
    ),
    components(
        schemas(
            Role,
            SalaryStructure,
            SalaryStructureInput,
            DerivedSalary,
            SalaryView,
            PaginatedSalaryResponse,
            CreatePayroll,
            PayrollQuery,
            Employee,
            UpdateEmployee,
            Attendance,
            AttendanceQuery,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            CreateLeave,
            LeaveFilter,
            LeaveListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Payroll", description = "Salary structure APIs (HR/Admin)"),
        (name = "Employee", description = "Employee profile APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave management APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
