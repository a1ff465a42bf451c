use anyhow::Context;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{
    repo_types::{ChangeEntry, DoseLog},
    services::FieldChange,
};

pub async fn insert_changes(
    conn: &mut PgConnection,
    medication_id: Uuid,
    user_id: Uuid,
    changes: &[FieldChange],
) -> anyhow::Result<()> {
    for change in changes {
        sqlx::query(
            r#"
            INSERT INTO medication_change_history
                (medication_id, user_id, field_changed, old_value, new_value)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(medication_id)
        .bind(user_id)
        .bind(change.field)
        .bind(&change.old_value)
        .bind(&change.new_value)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("insert change of {}", change.field))?;
    }
    Ok(())
}

/// Newest first.
pub async fn list_changes(
    db: &PgPool,
    medication_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<ChangeEntry>> {
    let rows = sqlx::query_as::<_, ChangeEntry>(
        r#"
        SELECT id, medication_id, user_id, field_changed, old_value, new_value, change_date
          FROM medication_change_history
         WHERE medication_id = $1
         ORDER BY change_date DESC
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(medication_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list change history")?;
    Ok(rows)
}

pub async fn insert_dose_log(conn: &mut PgConnection, medication_id: Uuid) -> anyhow::Result<DoseLog> {
    let row = sqlx::query_as::<_, DoseLog>(
        r#"
        INSERT INTO dose_logs (medication_id)
        VALUES ($1)
        RETURNING id, medication_id, created_at
        "#,
    )
    .bind(medication_id)
    .fetch_one(&mut *conn)
    .await
    .context("insert dose log")?;
    Ok(row)
}

/// Newest first.
pub async fn list_dose_logs(
    db: &PgPool,
    medication_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<DoseLog>> {
    let rows = sqlx::query_as::<_, DoseLog>(
        r#"
        SELECT id, medication_id, created_at
          FROM dose_logs
         WHERE medication_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(medication_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list dose logs")?;
    Ok(rows)
}
