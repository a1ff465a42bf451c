use anyhow::Context;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::repo_types::{MedicationStatistics, StatisticsRow};

/// Ensures the row exists, then locks it for the rest of the transaction.
pub async fn get_or_create_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
    medication_id: Uuid,
) -> anyhow::Result<MedicationStatistics> {
    sqlx::query(
        r#"
        INSERT INTO medication_statistics (user_id, medication_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, medication_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(medication_id)
    .execute(&mut *conn)
    .await
    .context("create statistics")?;

    let row = sqlx::query_as::<_, MedicationStatistics>(
        r#"
        SELECT id, medication_id, user_id, total_doses_taken, average_doses_per_day, last_update
          FROM medication_statistics
         WHERE user_id = $1 AND medication_id = $2
         FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(medication_id)
    .fetch_one(&mut *conn)
    .await
    .context("lock statistics")?;
    Ok(row)
}

pub async fn save(
    conn: &mut PgConnection,
    stats: &MedicationStatistics,
) -> anyhow::Result<MedicationStatistics> {
    let row = sqlx::query_as::<_, MedicationStatistics>(
        r#"
        UPDATE medication_statistics
           SET total_doses_taken = $2,
               average_doses_per_day = $3,
               last_update = $4
         WHERE id = $1
        RETURNING id, medication_id, user_id, total_doses_taken, average_doses_per_day, last_update
        "#,
    )
    .bind(stats.id)
    .bind(stats.total_doses_taken)
    .bind(stats.average_doses_per_day)
    .bind(stats.last_update)
    .fetch_one(&mut *conn)
    .await
    .context("update statistics")?;
    Ok(row)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<StatisticsRow>> {
    let rows = sqlx::query_as::<_, StatisticsRow>(
        r#"
        SELECT s.medication_id,
               m.name AS medication_name,
               s.total_doses_taken,
               s.average_doses_per_day,
               m.last_taken,
               s.last_update
          FROM medication_statistics s
          JOIN medications m ON m.id = s.medication_id
         WHERE s.user_id = $1
         ORDER BY m.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list statistics")?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::repo_types::User,
        medications::{dto::NewMedication, repo::MedicationFields, services},
    };

    async fn create(db: &PgPool, user_id: Uuid, name: &str) -> Uuid {
        let new = NewMedication {
            fields: MedicationFields {
                name: name.into(),
                dosage: 1,
                notes: None,
                remaining_quantity: 2,
            },
            drug: None,
            schedule: None,
        };
        services::create_medication(db, user_id, new).await.unwrap().id
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn lists_only_the_callers_rows(pool: PgPool) {
        let alice = User::create(&pool, "alice@example.com", "x").await.unwrap().id;
        let bob = User::create(&pool, "bob@example.com", "x").await.unwrap().id;
        let warfarin = create(&pool, alice, "Warfarin").await;
        create(&pool, alice, "Aspirin").await;
        create(&pool, bob, "Ibalgin").await;

        services::mark_taken(&pool, alice, warfarin).await.unwrap().unwrap();

        let rows = list_by_user(&pool, alice).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.medication_name.as_str()).collect();
        assert_eq!(names, ["Aspirin", "Warfarin"]);
        assert_eq!(rows[0].total_doses_taken, 0);
        assert_eq!(rows[0].average_doses_per_day, 0.0);
        assert!(rows[0].last_taken.is_none());
        assert_eq!(rows[1].total_doses_taken, 1);
        assert_eq!(rows[1].average_doses_per_day, 1.0);
        assert!(rows[1].last_taken.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn get_or_create_keeps_one_row_per_pair(pool: PgPool) {
        let alice = User::create(&pool, "alice@example.com", "x").await.unwrap().id;
        let med = create(&pool, alice, "Warfarin").await;

        let mut conn = pool.acquire().await.unwrap();
        let first = get_or_create_for_update(&mut conn, alice, med).await.unwrap();
        let second = get_or_create_for_update(&mut conn, alice, med).await.unwrap();
        assert_eq!(first.id, second.id);

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM medication_statistics WHERE medication_id = $1")
                .bind(med)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }
}
