use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    repo,
    repo_types::{ChangeEntry, DoseLog},
};
use crate::{
    auth::AuthUser,
    error::AppError,
    medications::{self, dto::Pagination},
    state::AppState,
};

pub fn history_routes() -> Router<AppState> {
    Router::new().route("/medications/:id/history", get(list_history))
}

#[instrument(skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ChangeEntry>>, AppError> {
    medications::repo::find_owned(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Medication"))?;
    let (limit, offset) = p.clamped();
    let rows = repo::list_changes(&state.db, id, limit, offset).await?;
    Ok(Json(rows))
}

/// Mounted by the medications router next to the stock adjustment on the same path.
#[instrument(skip(state))]
pub async fn list_dose_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<DoseLog>>, AppError> {
    medications::repo::find_owned(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Medication"))?;
    let (limit, offset) = p.clamped();
    let rows = repo::list_dose_logs(&state.db, id, limit, offset).await?;
    Ok(Json(rows))
}
