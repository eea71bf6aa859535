//! Persistence for salary structures.
//!
//! Expected table (MySQL):
//!
//! ```sql
//! CREATE TABLE salary_structures (
//!     id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
//!     employee_id BIGINT UNSIGNED NOT NULL UNIQUE,
//!     monthly_wage DECIMAL(12,2) NOT NULL DEFAULT 0,
//!     working_days_per_week INT NOT NULL DEFAULT 5,
//!     working_hours_per_day DECIMAL(4,2) NOT NULL DEFAULT 8,
//!     basic_percentage DECIMAL(5,2) NOT NULL DEFAULT 50,
//!     hra_percentage DECIMAL(5,2) NOT NULL DEFAULT 40,
//!     standard_allowance DECIMAL(10,2) NOT NULL DEFAULT 0,
//!     performance_bonus_percentage DECIMAL(5,2) NOT NULL DEFAULT 8.33,
//!     leave_travel_allowance_percentage DECIMAL(5,2) NOT NULL DEFAULT 8.33,
//!     food_allowance DECIMAL(10,2) NOT NULL DEFAULT 0,
//!     pf_employee_percentage DECIMAL(5,2) NOT NULL DEFAULT 12,
//!     pf_employer_percentage DECIMAL(5,2) NOT NULL DEFAULT 12,
//!     professional_tax DECIMAL(10,2) NOT NULL DEFAULT 200,
//!     created_at TIMESTAMP NOT NULL,
//!     updated_at TIMESTAMP NOT NULL,
//!     FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::error::{ApiError, ApiResult};
use crate::model::salary_structure::{NewSalaryStructure, SalaryStructure, SalaryStructureInput};
use crate::utils::db_utils::{Assignments, SqlValue, build_update_sql, execute_update};

#[async_trait]
pub trait SalaryStructureRepository: Send + Sync {
    /// One page ordered by id, plus the total row count.
    async fn list(&self, limit: u32, offset: u64) -> ApiResult<(Vec<SalaryStructure>, i64)>;
    async fn find_by_id(&self, id: u64) -> ApiResult<Option<SalaryStructure>>;
    async fn find_by_employee(&self, employee_id: u64) -> ApiResult<Option<SalaryStructure>>;

    /// Fails with `Conflict` when the employee already has a structure and with
    /// `NotFound` when the employee does not exist.
    async fn insert(&self, new: NewSalaryStructure, now: DateTime<Utc>) -> ApiResult<SalaryStructure>;

    /// Writes only the fields present in `patch`. `None` if the row is gone.
    async fn update(
        &self,
        id: u64,
        patch: &SalaryStructureInput,
        updated_at: DateTime<Utc>,
    ) -> ApiResult<Option<SalaryStructure>>;

    /// `false` if nothing was deleted.
    async fn delete(&self, id: u64) -> ApiResult<bool>;
}

/// Salary columns plus the owner's display name. A blank name falls back to the employee code.
const SELECT_WITH_NAME: &str = r#"
    SELECT s.id, s.employee_id,
        COALESCE(NULLIF(TRIM(CONCAT(e.first_name, ' ', e.last_name)), ''), e.employee_code) AS employee_name,
        s.monthly_wage, s.working_days_per_week, s.working_hours_per_day,
        s.basic_percentage, s.hra_percentage, s.standard_allowance,
        s.performance_bonus_percentage, s.leave_travel_allowance_percentage, s.food_allowance,
        s.pf_employee_percentage, s.pf_employer_percentage, s.professional_tax,
        s.created_at, s.updated_at
    FROM salary_structures s
    LEFT JOIN employees e ON e.id = s.employee_id
"#;

pub struct MySqlSalaryRepository {
    pool: MySqlPool,
}

impl MySqlSalaryRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, column: &str, value: u64) -> ApiResult<Option<SalaryStructure>> {
        let sql = format!("{} WHERE s.{} = ?", SELECT_WITH_NAME, column);

        let row = sqlx::query_as::<_, SalaryStructure>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}

fn assignments(patch: &SalaryStructureInput, updated_at: DateTime<Utc>) -> Assignments {
    let mut set = Assignments::new();
    set.set_opt("monthly_wage", patch.monthly_wage)
        .set_opt("working_days_per_week", patch.working_days_per_week)
        .set_opt("working_hours_per_day", patch.working_hours_per_day)
        .set_opt("basic_percentage", patch.basic_percentage)
        .set_opt("hra_percentage", patch.hra_percentage)
        .set_opt("standard_allowance", patch.standard_allowance)
        .set_opt(
            "performance_bonus_percentage",
            patch.performance_bonus_percentage,
        )
        .set_opt(
            "leave_travel_allowance_percentage",
            patch.leave_travel_allowance_percentage,
        )
        .set_opt("food_allowance", patch.food_allowance)
        .set_opt("pf_employee_percentage", patch.pf_employee_percentage)
        .set_opt("pf_employer_percentage", patch.pf_employer_percentage)
        .set_opt("professional_tax", patch.professional_tax)
        .set("updated_at", SqlValue::Timestamp(updated_at));
    set
}

#[async_trait]
impl SalaryStructureRepository for MySqlSalaryRepository {
    async fn list(&self, limit: u32, offset: u64) -> ApiResult<(Vec<SalaryStructure>, i64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM salary_structures")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!("{} ORDER BY s.id LIMIT ? OFFSET ?", SELECT_WITH_NAME);
        let data = sqlx::query_as::<_, SalaryStructure>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((data, total))
    }

    async fn find_by_id(&self, id: u64) -> ApiResult<Option<SalaryStructure>> {
        self.fetch_one_where("id", id).await
    }

    async fn find_by_employee(&self, employee_id: u64) -> ApiResult<Option<SalaryStructure>> {
        self.fetch_one_where("employee_id", employee_id).await
    }

    async fn insert(&self, new: NewSalaryStructure, now: DateTime<Utc>) -> ApiResult<SalaryStructure> {
        let employee_id = new.employee_id;

        let result = sqlx::query(
            r#"
            INSERT INTO salary_structures
            (employee_id, monthly_wage, working_days_per_week, working_hours_per_day,
             basic_percentage, hra_percentage, standard_allowance,
             performance_bonus_percentage, leave_travel_allowance_percentage, food_allowance,
             pf_employee_percentage, pf_employer_percentage, professional_tax,
             created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.monthly_wage)
        .bind(new.working_days_per_week)
        .bind(new.working_hours_per_day)
        .bind(new.basic_percentage)
        .bind(new.hra_percentage)
        .bind(new.standard_allowance)
        .bind(new.performance_bonus_percentage)
        .bind(new.leave_travel_allowance_percentage)
        .bind(new.food_allowance)
        .bind(new.pf_employee_percentage)
        .bind(new.pf_employer_percentage)
        .bind(new.professional_tax)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_id(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(ApiError::Conflict(format!(
                    "Salary structure already exists for employee {}",
                    employee_id
                )));
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                return Err(ApiError::NotFound(format!(
                    "Employee {} not found",
                    employee_id
                )));
            }
            Err(e) => return Err(e.into()),
        };

        // read back so the response carries what the database stored
        self.find_by_id(id)
            .await?
            .ok_or(ApiError::Internal(sqlx::Error::RowNotFound))
    }

    async fn update(
        &self,
        id: u64,
        patch: &SalaryStructureInput,
        updated_at: DateTime<Utc>,
    ) -> ApiResult<Option<SalaryStructure>> {
        if let Some(update) = build_update_sql("salary_structures", assignments(patch, updated_at), "id", id) {
            execute_update(&self.pool, update).await?;
        }

        self.find_by_id(id).await
    }

    async fn delete(&self, id: u64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM salary_structures WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn patch_assignments_skip_absent_fields() {
        let patch = SalaryStructureInput {
            monthly_wage: Some(dec!(42000)),
            working_days_per_week: Some(6),
            ..Default::default()
        };
        let now = Utc::now();

        let update = build_update_sql("salary_structures", assignments(&patch, now), "id", 3).unwrap();

        assert_eq!(
            update.sql,
            "UPDATE salary_structures SET monthly_wage = ?, working_days_per_week = ?, updated_at = ? WHERE id = ?"
        );
        assert_eq!(update.values[2], SqlValue::Timestamp(now));
    }
}
