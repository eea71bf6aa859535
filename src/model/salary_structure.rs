use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};

/// Stored salary inputs for one employee. Derived amounts are never stored;
/// see `payroll::calculator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryStructure {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1001)]
    pub employee_id: u64,
    /// First and last name from `employees`, or the employee code when both are blank.
    #[schema(example = "John Doe", nullable = true)]
    pub employee_name: Option<String>,

    #[schema(value_type = String, example = "30000.00")]
    pub monthly_wage: Decimal,
    #[schema(example = 5)]
    pub working_days_per_week: i32,
    #[schema(value_type = String, example = "8.00")]
    pub working_hours_per_day: Decimal,

    #[schema(value_type = String, example = "50.00")]
    pub basic_percentage: Decimal,
    #[schema(value_type = String, example = "40.00")]
    pub hra_percentage: Decimal,
    #[schema(value_type = String, example = "0.00")]
    pub standard_allowance: Decimal,
    #[schema(value_type = String, example = "8.33")]
    pub performance_bonus_percentage: Decimal,
    #[schema(value_type = String, example = "8.33")]
    pub leave_travel_allowance_percentage: Decimal,
    #[schema(value_type = String, example = "0.00")]
    pub food_allowance: Decimal,

    #[schema(value_type = String, example = "12.00")]
    pub pf_employee_percentage: Decimal,
    #[schema(value_type = String, example = "12.00")]
    pub pf_employer_percentage: Decimal,
    #[schema(value_type = String, example = "200.00")]
    pub professional_tax: Decimal,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

/// A structure ready to insert: every input resolved, no id or timestamps yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSalaryStructure {
    pub employee_id: u64,
    pub monthly_wage: Decimal,
    pub working_days_per_week: i32,
    pub working_hours_per_day: Decimal,
    pub basic_percentage: Decimal,
    pub hra_percentage: Decimal,
    pub standard_allowance: Decimal,
    pub performance_bonus_percentage: Decimal,
    pub leave_travel_allowance_percentage: Decimal,
    pub food_allowance: Decimal,
    pub pf_employee_percentage: Decimal,
    pub pf_employer_percentage: Decimal,
    pub professional_tax: Decimal,
}

impl NewSalaryStructure {
    #[cfg(test)]
    pub fn into_stored(self, id: u64, now: DateTime<Utc>) -> SalaryStructure {
        SalaryStructure {
            id,
            employee_id: self.employee_id,
            employee_name: None,
            monthly_wage: self.monthly_wage,
            working_days_per_week: self.working_days_per_week,
            working_hours_per_day: self.working_hours_per_day,
            basic_percentage: self.basic_percentage,
            hra_percentage: self.hra_percentage,
            standard_allowance: self.standard_allowance,
            performance_bonus_percentage: self.performance_bonus_percentage,
            leave_travel_allowance_percentage: self.leave_travel_allowance_percentage,
            food_allowance: self.food_allowance,
            pf_employee_percentage: self.pf_employee_percentage,
            pf_employer_percentage: self.pf_employer_percentage,
            professional_tax: self.professional_tax,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Salary inputs as sent by a client. Used for both creation (omitted fields
/// take the defaults below) and partial updates (omitted fields are left alone).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SalaryStructureInput {
    #[schema(value_type = Option<String>, example = "30000.00")]
    pub monthly_wage: Option<Decimal>,
    #[schema(example = 5)]
    pub working_days_per_week: Option<i32>,
    #[schema(value_type = Option<String>, example = "8.00")]
    pub working_hours_per_day: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "50.00")]
    pub basic_percentage: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "40.00")]
    pub hra_percentage: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "0.00")]
    pub standard_allowance: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "8.33")]
    pub performance_bonus_percentage: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "8.33")]
    pub leave_travel_allowance_percentage: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "0.00")]
    pub food_allowance: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "12.00")]
    pub pf_employee_percentage: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "12.00")]
    pub pf_employer_percentage: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "200.00")]
    pub professional_tax: Option<Decimal>,
}

/// Column shapes, matching the DECIMAL(precision, 2) definitions of `salary_structures`.
#[derive(Debug, Clone, Copy)]
enum Column {
    /// DECIMAL(12,2), not negative
    Wage,
    /// DECIMAL(10,2), not negative
    Amount,
    /// DECIMAL(5,2), any sign
    Percentage,
    /// DECIMAL(4,2), 0..=24
    Hours,
}

impl Column {
    fn precision(self) -> u32 {
        match self {
            Column::Wage => 12,
            Column::Amount => 10,
            Column::Percentage => 5,
            Column::Hours => 4,
        }
    }

    fn check(self, field: &str, value: Decimal) -> ApiResult<()> {
        if value.normalize().scale() > 2 {
            return Err(ApiError::Validation(format!(
                "{} must have at most 2 decimal places",
                field
            )));
        }

        let limit = Decimal::from(10_i64.pow(self.precision() - 2));
        if value.abs() >= limit {
            return Err(ApiError::Validation(format!(
                "{} must be below {}",
                field, limit
            )));
        }

        match self {
            Column::Wage | Column::Amount if value < Decimal::ZERO => {
                Err(ApiError::Validation(format!("{} must not be negative", field)))
            }
            Column::Hours if value < Decimal::ZERO || value > Decimal::from(24) => {
                Err(ApiError::Validation(format!("{} must be between 0 and 24", field)))
            }
            _ => Ok(()),
        }
    }
}

/// Pads to the two decimal places the columns store.
fn cents(mut value: Decimal) -> Decimal {
    value.rescale(2);
    value
}

impl SalaryStructureInput {
    pub fn validate(&self) -> ApiResult<()> {
        let decimals = [
            ("monthly_wage", self.monthly_wage, Column::Wage),
            ("working_hours_per_day", self.working_hours_per_day, Column::Hours),
            ("basic_percentage", self.basic_percentage, Column::Percentage),
            ("hra_percentage", self.hra_percentage, Column::Percentage),
            ("standard_allowance", self.standard_allowance, Column::Amount),
            (
                "performance_bonus_percentage",
                self.performance_bonus_percentage,
                Column::Percentage,
            ),
            (
                "leave_travel_allowance_percentage",
                self.leave_travel_allowance_percentage,
                Column::Percentage,
            ),
            ("food_allowance", self.food_allowance, Column::Amount),
            ("pf_employee_percentage", self.pf_employee_percentage, Column::Percentage),
            ("pf_employer_percentage", self.pf_employer_percentage, Column::Percentage),
            ("professional_tax", self.professional_tax, Column::Amount),
        ];

        for (field, value, column) in decimals {
            if let Some(value) = value {
                column.check(field, value)?;
            }
        }

        if let Some(days) = self.working_days_per_week {
            if !(0..=7).contains(&days) {
                return Err(ApiError::Validation(
                    "working_days_per_week must be between 0 and 7".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Resolves omitted fields to the creation defaults.
    pub fn into_new(self, employee_id: u64) -> NewSalaryStructure {
        NewSalaryStructure {
            employee_id,
            monthly_wage: cents(self.monthly_wage.unwrap_or(Decimal::ZERO)),
            working_days_per_week: self.working_days_per_week.unwrap_or(5),
            working_hours_per_day: cents(self.working_hours_per_day.unwrap_or(Decimal::new(8, 0))),
            basic_percentage: cents(self.basic_percentage.unwrap_or(Decimal::new(50, 0))),
            hra_percentage: cents(self.hra_percentage.unwrap_or(Decimal::new(40, 0))),
            standard_allowance: cents(self.standard_allowance.unwrap_or(Decimal::ZERO)),
            performance_bonus_percentage: cents(
                self.performance_bonus_percentage
                    .unwrap_or(Decimal::new(833, 2)),
            ),
            leave_travel_allowance_percentage: cents(
                self.leave_travel_allowance_percentage
                    .unwrap_or(Decimal::new(833, 2)),
            ),
            food_allowance: cents(self.food_allowance.unwrap_or(Decimal::ZERO)),
            pf_employee_percentage: cents(self.pf_employee_percentage.unwrap_or(Decimal::new(12, 0))),
            pf_employer_percentage: cents(self.pf_employer_percentage.unwrap_or(Decimal::new(12, 0))),
            professional_tax: cents(self.professional_tax.unwrap_or(Decimal::new(200, 0))),
        }
    }

    /// Merges the provided fields into `target`; timestamps are the caller's concern.
    #[cfg(test)]
    pub fn apply_to(&self, target: &mut SalaryStructure) {
        fn merge(slot: &mut Decimal, value: Option<Decimal>) {
            if let Some(value) = value {
                *slot = cents(value);
            }
        }

        merge(&mut target.monthly_wage, self.monthly_wage);
        if let Some(days) = self.working_days_per_week {
            target.working_days_per_week = days;
        }
        merge(&mut target.working_hours_per_day, self.working_hours_per_day);
        merge(&mut target.basic_percentage, self.basic_percentage);
        merge(&mut target.hra_percentage, self.hra_percentage);
        merge(&mut target.standard_allowance, self.standard_allowance);
        merge(
            &mut target.performance_bonus_percentage,
            self.performance_bonus_percentage,
        );
        merge(
            &mut target.leave_travel_allowance_percentage,
            self.leave_travel_allowance_percentage,
        );
        merge(&mut target.food_allowance, self.food_allowance);
        merge(&mut target.pf_employee_percentage, self.pf_employee_percentage);
        merge(&mut target.pf_employer_percentage, self.pf_employer_percentage);
        merge(&mut target.professional_tax, self.professional_tax);
    }

    pub fn is_empty(&self) -> bool {
        self.monthly_wage.is_none()
            && self.working_days_per_week.is_none()
            && self.working_hours_per_day.is_none()
            && self.basic_percentage.is_none()
            && self.hra_percentage.is_none()
            && self.standard_allowance.is_none()
            && self.performance_bonus_percentage.is_none()
            && self.leave_travel_allowance_percentage.is_none()
            && self.food_allowance.is_none()
            && self.pf_employee_percentage.is_none()
            && self.pf_employer_percentage.is_none()
            && self.professional_tax.is_none()
    }
}
