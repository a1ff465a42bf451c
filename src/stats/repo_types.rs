use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MedicationStatistics {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub user_id: Uuid,
    pub total_doses_taken: i32,
    pub average_doses_per_day: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub last_update: OffsetDateTime,
}

/// Statistics joined with the medication they describe.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatisticsRow {
    pub medication_id: Uuid,
    pub medication_name: String,
    pub total_doses_taken: i32,
    pub average_doses_per_day: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_taken: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_update: OffsetDateTime,
}
