use anyhow::Context;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{
    dto::{PlannedDose, ScheduleInput},
    repo_types::{DayOfWeek, Schedule},
};

pub async fn insert(
    conn: &mut PgConnection,
    medication_id: Uuid,
    user_id: Uuid,
    input: &ScheduleInput,
) -> anyhow::Result<Schedule> {
    let row = sqlx::query_as::<_, Schedule>(
        r#"
        INSERT INTO schedules (medication_id, user_id, day_of_week, time_of_day)
        VALUES ($1, $2, $3, $4)
        RETURNING id, day_of_week, time_of_day
        "#,
    )
    .bind(medication_id)
    .bind(user_id)
    .bind(input.day_of_week.map(DayOfWeek::as_str))
    .bind(input.time)
    .fetch_one(&mut *conn)
    .await
    .context("insert schedule")?;
    Ok(row)
}

pub async fn list_by_medication(db: &PgPool, medication_id: Uuid) -> anyhow::Result<Vec<Schedule>> {
    let rows = sqlx::query_as::<_, Schedule>(
        r#"
        SELECT id, day_of_week, time_of_day
          FROM schedules
         WHERE medication_id = $1
         ORDER BY created_at ASC
        "#,
    )
    .bind(medication_id)
    .fetch_all(db)
    .await
    .context("list schedules by medication")?;
    Ok(rows)
}

/// Returns `false` when the schedule does not belong to the medication.
pub async fn delete(db: &PgPool, medication_id: Uuid, schedule_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(r#"DELETE FROM schedules WHERE id = $1 AND medication_id = $2"#)
        .bind(schedule_id)
        .bind(medication_id)
        .execute(db)
        .await
        .context("delete schedule")?;
    Ok(result.rows_affected() > 0)
}

/// Schedules of the user's medications that fall on `day`, or carry no day.
pub async fn list_for_day(
    db: &PgPool,
    user_id: Uuid,
    day: DayOfWeek,
) -> anyhow::Result<Vec<PlannedDose>> {
    let rows = sqlx::query_as::<_, PlannedDose>(
        r#"
        SELECT s.id AS schedule_id,
               m.id AS medication_id,
               m.name AS medication_name,
               m.dosage,
               s.time_of_day AS time
          FROM schedules s
          JOIN medications m ON m.id = s.medication_id
         WHERE m.user_id = $1
           AND (s.day_of_week = $2 OR s.day_of_week IS NULL)
         ORDER BY s.time_of_day ASC NULLS LAST, m.name ASC
        "#,
    )
    .bind(user_id)
    .bind(day.as_str())
    .fetch_all(db)
    .await
    .context("list schedules for day")?;
    Ok(rows)
}
