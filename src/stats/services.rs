use sqlx::PgConnection;
use time::OffsetDateTime;
use tracing::debug;

use super::{repo, repo_types::MedicationStatistics};
use crate::medications::repo_types::Medication;

/// What kind of save triggered a statistics refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    /// A dose was consumed; counts towards `total_doses_taken`.
    DoseTaken,
    /// Any other create or edit.
    Edit,
}

/// `total / max(whole days since last_taken, 1)`, or 0 if never taken.
pub fn average_doses_per_day(
    total_doses_taken: i32,
    last_taken: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> f64 {
    let Some(last_taken) = last_taken else {
        return 0.0;
    };
    let days = (now - last_taken).whole_days().max(1);
    f64::from(total_doses_taken) / days as f64
}

pub fn apply(
    stats: &mut MedicationStatistics,
    med: &Medication,
    kind: SaveKind,
    now: OffsetDateTime,
) {
    if kind == SaveKind::DoseTaken {
        stats.total_doses_taken += 1;
    }
    stats.average_doses_per_day = average_doses_per_day(stats.total_doses_taken, med.last_taken, now);
    stats.last_update = now;
}

/// Fetch-or-create the (user, medication) row and recompute it. Runs on every
/// medication save, inside the caller's transaction.
pub async fn refresh(
    conn: &mut PgConnection,
    med: &Medication,
    kind: SaveKind,
    now: OffsetDateTime,
) -> anyhow::Result<MedicationStatistics> {
    let mut stats = repo::get_or_create_for_update(conn, med.user_id, med.id).await?;
    apply(&mut stats, med, kind, now);
    let saved = repo::save(conn, &stats).await?;
    debug!(
        medication_id = %med.id,
        total = saved.total_doses_taken,
        average = saved.average_doses_per_day,
        "statistics refreshed"
    );
    Ok(saved)
}
