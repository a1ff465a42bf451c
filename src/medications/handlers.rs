use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        CreateMedicationRequest, DoseAdjustRequest, DoseTakenResponse, MedicationDetails,
        MedicationView, Pagination, UpdateMedicationRequest,
    },
    repo,
    repo_types::Medication,
    services,
};
use crate::{
    auth::AuthUser,
    error::AppError,
    history,
    schedules::{self, repo_types::ScheduleView},
    state::AppState,
};

pub fn medication_routes() -> Router<AppState> {
    Router::new()
        .route("/medications", get(list_medications).post(create_medication))
        .route(
            "/medications/:id",
            get(get_medication)
                .put(update_medication)
                .delete(delete_medication),
        )
        .route("/medications/:id/taken", post(mark_taken))
        .route(
            "/medications/:id/doses",
            get(history::handlers::list_dose_logs).post(adjust_doses),
        )
}

async fn load_details(state: &AppState, medication: Medication) -> Result<MedicationDetails, AppError> {
    let drug = match medication.drug_id {
        Some(drug_id) => repo::find_drug(&state.db, drug_id).await?,
        None => None,
    };
    let schedules = schedules::repo::list_by_medication(&state.db, medication.id)
        .await?
        .into_iter()
        .map(ScheduleView::from)
        .collect();
    Ok(MedicationDetails {
        medication: medication.into(),
        drug,
        schedules,
    })
}

#[instrument(skip(state))]
pub async fn list_medications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MedicationView>>, AppError> {
    let (limit, offset) = p.clamped();
    let rows = repo::list_by_user(&state.db, user_id, limit, offset).await?;
    Ok(Json(rows.into_iter().map(MedicationView::from).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_medication(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateMedicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = body.validate()?;
    let medication = services::create_medication(&state.db, user_id, new).await?;
    let location = format!("/api/v1/medications/{}", medication.id);
    let details = load_details(&state, medication).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(details),
    ))
}

#[instrument(skip(state))]
pub async fn get_medication(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MedicationDetails>, AppError> {
    let medication = repo::find_owned(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Medication"))?;
    Ok(Json(load_details(&state, medication).await?))
}

#[instrument(skip(state, body))]
pub async fn update_medication(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMedicationRequest>,
) -> Result<Json<MedicationDetails>, AppError> {
    let fields = body.validate()?;
    let medication = services::update_medication(&state.db, user_id, id, fields)
        .await?
        .ok_or(AppError::NotFound("Medication"))?;
    Ok(Json(load_details(&state, medication).await?))
}

#[instrument(skip(state))]
pub async fn delete_medication(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete_owned(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Medication"));
    }
    info!(%user_id, medication_id = %id, "medication deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn mark_taken(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DoseTakenResponse>, AppError> {
    let outcome = services::mark_taken(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Medication"))?;
    Ok(Json(DoseTakenResponse {
        taken: outcome.taken,
        medication: outcome.medication.into(),
    }))
}

#[instrument(skip(state))]
pub async fn adjust_doses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<DoseAdjustRequest>,
) -> Result<Json<MedicationView>, AppError> {
    let medication = services::adjust_stock(&state.db, user_id, id, body.action)
        .await?
        .ok_or(AppError::NotFound("Medication"))?;
    Ok(Json(medication.into()))
}
