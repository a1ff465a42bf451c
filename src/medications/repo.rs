use anyhow::Context;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::repo_types::{Drug, DrugUnit, Medication};

/// Validated column values for insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationFields {
    pub name: String,
    pub dosage: i32,
    pub notes: Option<String>,
    pub remaining_quantity: i32,
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Medication>> {
    let rows = sqlx::query_as::<_, Medication>(
        r#"
        SELECT id, user_id, drug_id, name, dosage, notes, remaining_quantity, last_taken, created_at
        FROM medications
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list medications")?;
    Ok(rows)
}

/// Fetch a medication only if it belongs to `user_id`.
pub async fn find_owned(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<Medication>> {
    let row = sqlx::query_as::<_, Medication>(
        r#"
        SELECT id, user_id, drug_id, name, dosage, notes, remaining_quantity, last_taken, created_at
        FROM medications
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find medication")?;
    Ok(row)
}

/// Same as [`find_owned`] but locks the row until the transaction ends.
pub async fn find_owned_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<Medication>> {
    let row = sqlx::query_as::<_, Medication>(
        r#"
        SELECT id, user_id, drug_id, name, dosage, notes, remaining_quantity, last_taken, created_at
        FROM medications
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
    .context("lock medication")?;
    Ok(row)
}

pub async fn insert(
    conn: &mut PgConnection,
    user_id: Uuid,
    drug_id: Option<Uuid>,
    fields: &MedicationFields,
) -> anyhow::Result<Medication> {
    let row = sqlx::query_as::<_, Medication>(
        r#"
        INSERT INTO medications (user_id, drug_id, name, dosage, notes, remaining_quantity)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, drug_id, name, dosage, notes, remaining_quantity, last_taken, created_at
        "#,
    )
    .bind(user_id)
    .bind(drug_id)
    .bind(&fields.name)
    .bind(fields.dosage)
    .bind(&fields.notes)
    .bind(fields.remaining_quantity)
    .fetch_one(&mut *conn)
    .await
    .context("insert medication")?;
    Ok(row)
}

/// Persist the mutable columns of `med`.
pub async fn save(conn: &mut PgConnection, med: &Medication) -> anyhow::Result<Medication> {
    let row = sqlx::query_as::<_, Medication>(
        r#"
        UPDATE medications
           SET name = $2,
               dosage = $3,
               notes = $4,
               remaining_quantity = $5,
               last_taken = $6
         WHERE id = $1
        RETURNING id, user_id, drug_id, name, dosage, notes, remaining_quantity, last_taken, created_at
        "#,
    )
    .bind(med.id)
    .bind(&med.name)
    .bind(med.dosage)
    .bind(&med.notes)
    .bind(med.remaining_quantity)
    .bind(med.last_taken)
    .fetch_one(&mut *conn)
    .await
    .context("update medication")?;
    Ok(row)
}

/// Returns `false` when no owned row matched.
pub async fn delete_owned(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(r#"DELETE FROM medications WHERE id = $1 AND user_id = $2"#)
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete medication")?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_drug(
    conn: &mut PgConnection,
    quantity: i32,
    unit: DrugUnit,
) -> anyhow::Result<Drug> {
    let row = sqlx::query_as::<_, Drug>(
        r#"
        INSERT INTO drugs (quantity, unit)
        VALUES ($1, $2)
        RETURNING id, quantity, unit, created_at
        "#,
    )
    .bind(quantity)
    .bind(unit.as_str())
    .fetch_one(&mut *conn)
    .await
    .context("insert drug")?;
    Ok(row)
}

pub async fn find_drug(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Drug>> {
    let row = sqlx::query_as::<_, Drug>(
        r#"SELECT id, quantity, unit, created_at FROM drugs WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find drug")?;
    Ok(row)
}
