use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::{repo, repo_types::StatisticsRow};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/statistics", get(list_statistics))
}

#[instrument(skip(state))]
pub async fn list_statistics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<StatisticsRow>>, AppError> {
    let rows = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(rows))
}
