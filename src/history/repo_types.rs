use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One field edit on a medication.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChangeEntry {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub user_id: Uuid,
    pub field_changed: String,
    pub old_value: String,
    pub new_value: String,
    #[serde(with = "time::serde::rfc3339")]
    pub change_date: OffsetDateTime,
}

/// One dose taken.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DoseLog {
    pub id: Uuid,
    pub medication_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
