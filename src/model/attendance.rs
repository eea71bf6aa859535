use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row per employee per day (`UNIQUE (employee_id, date)`).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "09:02:11", value_type = String, nullable = true)]
    pub check_in: Option<NaiveTime>,

    #[schema(example = "17:45:03", value_type = String, nullable = true)]
    pub check_out: Option<NaiveTime>,
}
