//! Salary breakdown derived from a stored [`SalaryStructure`].
//!
//! Every stage runs at full decimal precision; amounts are rounded half-up to
//! cents only when the breakdown is produced.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::salary_structure::SalaryStructure;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DerivedSalary {
    #[schema(value_type = String, example = "360000.00")]
    pub yearly_wage: Decimal,
    #[schema(value_type = String, example = "15000.00")]
    pub basic_salary: Decimal,
    #[schema(value_type = String, example = "6000.00")]
    pub hra: Decimal,
    #[schema(value_type = String, example = "1249.50")]
    pub performance_bonus: Decimal,
    #[schema(value_type = String, example = "1249.50")]
    pub leave_travel_allowance: Decimal,
    #[schema(value_type = String, example = "23499.00")]
    pub total_earnings: Decimal,
    #[schema(value_type = String, example = "1800.00")]
    pub pf_employee: Decimal,
    /// Employer-side contribution; reported, never deducted from the employee.
    #[schema(value_type = String, example = "1800.00")]
    pub pf_employer: Decimal,
    #[schema(value_type = String, example = "2000.00")]
    pub total_deductions: Decimal,
    /// May be negative when deductions exceed earnings.
    #[schema(value_type = String, example = "21499.00")]
    pub net_salary: Decimal,
}

/// A stored structure together with its breakdown, as returned by every payroll endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SalaryView {
    #[serde(flatten)]
    pub structure: SalaryStructure,
    #[serde(flatten)]
    pub derived: DerivedSalary,
}

impl From<SalaryStructure> for SalaryView {
    fn from(structure: SalaryStructure) -> Self {
        let derived = compute(&structure);
        Self { structure, derived }
    }
}

fn percent_of(base: Decimal, percentage: Decimal) -> Decimal {
    base * percentage / Decimal::ONE_HUNDRED
}

fn to_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

impl DerivedSalary {
    fn rounded(self) -> Self {
        Self {
            yearly_wage: to_cents(self.yearly_wage),
            basic_salary: to_cents(self.basic_salary),
            hra: to_cents(self.hra),
            performance_bonus: to_cents(self.performance_bonus),
            leave_travel_allowance: to_cents(self.leave_travel_allowance),
            total_earnings: to_cents(self.total_earnings),
            pf_employee: to_cents(self.pf_employee),
            pf_employer: to_cents(self.pf_employer),
            total_deductions: to_cents(self.total_deductions),
            net_salary: to_cents(self.net_salary),
        }
    }
}

/// The breakdown at full precision. Totals here are exact sums of their parts.
pub fn exact(s: &SalaryStructure) -> DerivedSalary {
    let basic_salary = percent_of(s.monthly_wage, s.basic_percentage);
    let hra = percent_of(basic_salary, s.hra_percentage);
    let performance_bonus = percent_of(basic_salary, s.performance_bonus_percentage);
    let leave_travel_allowance = percent_of(basic_salary, s.leave_travel_allowance_percentage);

    let total_earnings = basic_salary
        + hra
        + s.standard_allowance
        + performance_bonus
        + leave_travel_allowance
        + s.food_allowance;

    let pf_employee = percent_of(basic_salary, s.pf_employee_percentage);
    let pf_employer = percent_of(basic_salary, s.pf_employer_percentage);
    let total_deductions = pf_employee + s.professional_tax;

    DerivedSalary {
        yearly_wage: s.monthly_wage * Decimal::from(12),
        basic_salary,
        hra,
        performance_bonus,
        leave_travel_allowance,
        total_earnings,
        pf_employee,
        pf_employer,
        total_deductions,
        net_salary: total_earnings - total_deductions,
    }
}

/// The breakdown as reported: each amount rounded half-up to cents from its exact value.
pub fn compute(s: &SalaryStructure) -> DerivedSalary {
    exact(s).rounded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::salary_structure::SalaryStructureInput;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn structure(input: SalaryStructureInput) -> SalaryStructure {
        input.into_new(1).into_stored(1, Utc::now())
    }

    fn with_wage(wage: Decimal) -> SalaryStructure {
        structure(SalaryStructureInput {
            monthly_wage: Some(wage),
            ..Default::default()
        })
    }

    #[test]
    fn default_cascade_for_thirty_thousand() {
        let derived = compute(&with_wage(dec!(30000)));

        assert_eq!(derived.basic_salary, dec!(15000));
        assert_eq!(derived.hra, dec!(6000));
        assert_eq!(derived.performance_bonus, dec!(1249.50));
        assert_eq!(derived.leave_travel_allowance, dec!(1249.50));
        assert_eq!(derived.total_earnings, dec!(23499.00));
        assert_eq!(derived.pf_employee, dec!(1800));
        assert_eq!(derived.pf_employer, dec!(1800));
        assert_eq!(derived.total_deductions, dec!(2000));
        assert_eq!(derived.net_salary, dec!(21499.00));
        assert_eq!(derived.yearly_wage, dec!(360000));
    }

    #[test]
    fn totals_hold_exactly() {
        for wage in [dec!(0), dec!(1), dec!(12345.67), dec!(30000), dec!(9999999999.99)] {
            let derived = exact(&with_wage(wage));
            assert_eq!(
                derived.total_deductions,
                derived.pf_employee + dec!(200),
                "wage {}",
                wage
            );
            assert_eq!(
                derived.net_salary,
                derived.total_earnings - derived.total_deductions,
                "wage {}",
                wage
            );
        }
    }

    #[test]
    fn yearly_wage_is_twelve_months() {
        for wage in [dec!(0), dec!(0.01), dec!(30000), dec!(9999999999.99)] {
            assert_eq!(compute(&with_wage(wage)).yearly_wage, wage * dec!(12));
        }
    }

    #[test]
    fn pf_employer_is_not_deducted() {
        let derived = compute(&structure(SalaryStructureInput {
            monthly_wage: Some(dec!(10000)),
            pf_employer_percentage: Some(dec!(99)),
            ..Default::default()
        }));
        assert_eq!(derived.pf_employer, dec!(4950));
        assert_eq!(derived.total_deductions, dec!(800));
    }

    #[test]
    fn net_salary_can_go_negative() {
        let derived = compute(&with_wage(dec!(0)));
        assert_eq!(derived.total_earnings, dec!(0));
        assert_eq!(derived.net_salary, dec!(-200));
    }

    #[test]
    fn out_of_range_percentages_propagate() {
        let derived = compute(&structure(SalaryStructureInput {
            monthly_wage: Some(dec!(1000)),
            basic_percentage: Some(dec!(150)),
            hra_percentage: Some(dec!(-10)),
            ..Default::default()
        }));
        assert_eq!(derived.basic_salary, dec!(1500));
        assert_eq!(derived.hra, dec!(-150));
    }

    #[test]
    fn rounds_half_up_only_at_output() {
        // basic = 0.05, bonus = 0.05 * 8.33% = 0.004165
        let derived = compute(&structure(SalaryStructureInput {
            monthly_wage: Some(dec!(0.10)),
            ..Default::default()
        }));
        assert_eq!(derived.basic_salary, dec!(0.05));
        assert_eq!(derived.performance_bonus, dec!(0.00));

        let half = compute(&structure(SalaryStructureInput {
            monthly_wage: Some(dec!(0.01)),
            basic_percentage: Some(dec!(50)),
            ..Default::default()
        }));
        assert_eq!(half.basic_salary, dec!(0.01));
        assert_eq!(half.basic_salary.to_string(), "0.01");
    }

    #[test]
    fn reported_amounts_come_from_exact_values() {
        let s = structure(SalaryStructureInput {
            monthly_wage: Some(dec!(12345.67)),
            ..Default::default()
        });
        let exact = exact(&s);
        let reported = compute(&s);

        assert_eq!(exact.basic_salary, dec!(6172.835));
        assert_eq!(reported.basic_salary, dec!(6172.84));
        assert_eq!(reported.total_earnings, dec!(9670.36));
        assert_eq!(reported.net_salary, dec!(8729.62));
    }

    #[test]
    fn compute_is_idempotent() {
        let s = with_wage(dec!(51234.56));
        assert_eq!(compute(&s), compute(&s));
    }

    #[test]
    fn view_serializes_flat_with_cents() {
        let view = SalaryView::from(with_wage(dec!(30000)));
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["employee_id"], 1);
        assert_eq!(json["monthly_wage"], "30000.00");
        assert_eq!(json["basic_salary"], "15000.00");
        assert_eq!(json["net_salary"], "21499.00");
        assert!(json.get("structure").is_none());
    }
}
