use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{ScheduleInput, TodayResponse},
    repo,
    repo_types::{DayOfWeek, ScheduleView},
};
use crate::{auth::AuthUser, error::AppError, medications, state::AppState};

pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/medications/:id/schedules",
            get(list_schedules).post(add_schedule),
        )
        .route(
            "/medications/:id/schedules/:schedule_id",
            delete(remove_schedule),
        )
        .route("/schedules/today", get(today))
}

async fn ensure_owned(state: &AppState, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    medications::repo::find_owned(&state.db, user_id, id)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotFound("Medication"))
}

#[instrument(skip(state))]
pub async fn list_schedules(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ScheduleView>>, AppError> {
    ensure_owned(&state, user_id, id).await?;
    let rows = repo::list_by_medication(&state.db, id).await?;
    Ok(Json(rows.into_iter().map(ScheduleView::from).collect()))
}

#[instrument(skip(state, input))]
pub async fn add_schedule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ScheduleInput>,
) -> Result<(StatusCode, Json<ScheduleView>), AppError> {
    input.validate()?;
    ensure_owned(&state, user_id, id).await?;

    let mut conn = state.db.acquire().await?;
    let schedule = repo::insert(&mut conn, id, user_id, &input).await?;
    info!(%user_id, medication_id = %id, schedule_id = %schedule.id, "schedule added");
    Ok((StatusCode::CREATED, Json(schedule.into())))
}

#[instrument(skip(state))]
pub async fn remove_schedule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, schedule_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    ensure_owned(&state, user_id, id).await?;
    if !repo::delete(&state.db, id, schedule_id).await? {
        return Err(AppError::NotFound("Schedule"));
    }
    info!(%user_id, medication_id = %id, %schedule_id, "schedule removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Doses planned for the current UTC weekday.
#[instrument(skip(state))]
pub async fn today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TodayResponse>, AppError> {
    let day = DayOfWeek::from(OffsetDateTime::now_utc().weekday());
    let doses = repo::list_for_day(&state.db, user_id, day).await?;
    Ok(Json(TodayResponse {
        day_of_week: day,
        doses,
    }))
}
