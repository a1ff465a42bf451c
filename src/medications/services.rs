use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    dto::NewMedication,
    repo::{self, MedicationFields},
    repo_types::{DoseAction, Medication, MAX_REMAINING_QUANTITY},
};
use crate::{
    error::AppError,
    history,
    schedules,
    stats::services::{self as stats, SaveKind},
};

/// Result of a dose-taken request.
#[derive(Debug)]
pub struct DoseOutcome {
    pub medication: Medication,
    pub taken: bool,
}

/// Inserts the medication with its optional drug and first schedule.
pub async fn create_medication(
    db: &PgPool,
    user_id: Uuid,
    new: NewMedication,
) -> anyhow::Result<Medication> {
    let mut tx = db.begin().await.context("begin tx")?;

    let drug_id = match &new.drug {
        Some(drug) => Some(repo::insert_drug(&mut tx, drug.quantity, drug.unit).await?.id),
        None => None,
    };
    let medication = repo::insert(&mut tx, user_id, drug_id, &new.fields).await?;
    if let Some(schedule) = &new.schedule {
        schedules::repo::insert(&mut tx, medication.id, user_id, schedule).await?;
    }
    stats::refresh(&mut tx, &medication, SaveKind::Edit, OffsetDateTime::now_utc()).await?;

    tx.commit().await.context("commit tx")?;
    info!(%user_id, medication_id = %medication.id, name = %medication.name, "medication created");
    Ok(medication)
}

/// Replaces the editable fields and records one history entry per changed
/// field. `None` when the caller does not own the medication.
pub async fn update_medication(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    fields: MedicationFields,
) -> anyhow::Result<Option<Medication>> {
    let mut tx = db.begin().await.context("begin tx")?;
    let Some(before) = repo::find_owned_for_update(&mut tx, user_id, id).await? else {
        return Ok(None);
    };

    let mut after = before.clone();
    after.name = fields.name;
    after.dosage = fields.dosage;
    after.notes = fields.notes;
    after.remaining_quantity = fields.remaining_quantity;

    let saved = repo::save(&mut tx, &after).await?;
    let changes = history::services::diff(&before, &saved);
    history::repo::insert_changes(&mut tx, saved.id, user_id, &changes).await?;
    stats::refresh(&mut tx, &saved, SaveKind::Edit, OffsetDateTime::now_utc()).await?;

    tx.commit().await.context("commit tx")?;
    info!(%user_id, medication_id = %id, changed = changes.len(), "medication updated");
    Ok(Some(saved))
}

/// Takes one dose if any stock is left. An empty stock is reported with
/// `taken: false` and writes nothing.
pub async fn mark_taken(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<DoseOutcome>> {
    let mut tx = db.begin().await.context("begin tx")?;
    let Some(mut medication) = repo::find_owned_for_update(&mut tx, user_id, id).await? else {
        return Ok(None);
    };

    let now = OffsetDateTime::now_utc();
    if !medication.take_dose(now) {
        tx.rollback().await.context("rollback tx")?;
        debug!(%user_id, medication_id = %id, "dose ignored, stock empty");
        return Ok(Some(DoseOutcome {
            medication,
            taken: false,
        }));
    }

    let saved = repo::save(&mut tx, &medication).await?;
    history::repo::insert_dose_log(&mut tx, saved.id).await?;
    stats::refresh(&mut tx, &saved, SaveKind::DoseTaken, now).await?;

    tx.commit().await.context("commit tx")?;
    info!(%user_id, medication_id = %id, remaining = saved.remaining_quantity, "dose taken");
    Ok(Some(DoseOutcome {
        medication: saved,
        taken: true,
    }))
}

/// Moves stock by one unit; a change is recorded in the history. Growing a
/// full stock is a bad request.
pub async fn adjust_stock(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    action: DoseAction,
) -> Result<Option<Medication>, AppError> {
    let mut tx = db.begin().await.context("begin tx")?;
    let Some(before) = repo::find_owned_for_update(&mut tx, user_id, id).await? else {
        return Ok(None);
    };

    let mut after = before.clone();
    if !after.adjust(action) {
        tx.rollback().await.context("rollback tx")?;
        return Err(AppError::BadRequest(format!(
            "Stock cannot exceed {MAX_REMAINING_QUANTITY} units"
        )));
    }

    let saved = repo::save(&mut tx, &after).await?;
    let changes = history::services::diff(&before, &saved);
    history::repo::insert_changes(&mut tx, saved.id, user_id, &changes).await?;
    stats::refresh(&mut tx, &saved, SaveKind::Edit, OffsetDateTime::now_utc()).await?;

    tx.commit().await.context("commit tx")?;
    info!(%user_id, medication_id = %id, ?action, remaining = saved.remaining_quantity, "stock adjusted");
    Ok(Some(saved))
}
