use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I32(i32),
    U64(u64),
    Decimal(Decimal),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Collects `column = ?` pairs for a partial update. Column names are always
/// compile-time constants; only values are bound.
#[derive(Debug, Default)]
pub struct Assignments(Vec<(&'static str, SqlValue)>);

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &'static str, value: SqlValue) -> &mut Self {
        self.0.push((column, value));
        self
    }

    pub fn set_opt<T: Into<SqlValue>>(&mut self, column: &'static str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.0.push((column, value.into()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I32(v)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Returns `None` when there is nothing to set.
pub fn build_update_sql(
    table: &str,
    assignments: Assignments,
    id_column: &str,
    id_value: u64,
) -> Option<SqlUpdate> {
    if assignments.is_empty() {
        return None;
    }

    let set_clause = assignments
        .0
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = assignments.0.into_iter().map(|(_, v)| v).collect();
    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Some(SqlUpdate { sql, values })
}

/// ===============================
/// Pagination window
/// ===============================
/// Clamps `page` to at least 1 and `per_page` to 1..=100 (default 10) and
/// returns them with the row offset. The offset is computed in `u64` so any
/// client-supplied page stays in range.
pub fn page_window(page: Option<u32>, per_page: Option<u32>) -> (u32, u32, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(10).clamp(1, 100);
    let offset = u64::from(page - 1) * u64::from(per_page);
    (page, per_page, offset)
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    tracing::debug!(sql = %update.sql, "Executing dynamic update");

    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I32(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Decimal(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Timestamp(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn builds_set_clause_in_insertion_order() {
        let mut assignments = Assignments::new();
        assignments
            .set_opt("monthly_wage", Some(dec!(100.00)))
            .set_opt::<i32>("working_days_per_week", None)
            .set("professional_tax", SqlValue::Decimal(dec!(0)));

        let update = build_update_sql("salary_structures", assignments, "id", 9).unwrap();

        assert_eq!(
            update.sql,
            "UPDATE salary_structures SET monthly_wage = ?, professional_tax = ? WHERE id = ?"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::Decimal(dec!(100.00)),
                SqlValue::Decimal(dec!(0)),
                SqlValue::U64(9)
            ]
        );
    }

    #[test]
    fn page_window_clamps_and_never_overflows() {
        assert_eq!(page_window(None, None), (1, 10, 0));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(3), Some(500)), (3, 100, 200));
        assert_eq!(
            page_window(Some(u32::MAX), Some(100)),
            (u32::MAX, 100, (u64::from(u32::MAX) - 1) * 100)
        );
    }

    #[test]
    fn nothing_to_update_builds_nothing() {
        assert!(build_update_sql("employees", Assignments::new(), "id", 1).is_none());
    }
}
