use axum::{
    extract::{FromRef, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, ProfileResponse, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        repo_types::User,
        services::{
            clear_session_cookie, hash_password, is_valid_email, session_cookie, verify_password,
            JwtKeys, MIN_PASSWORD_LEN,
        },
    },
    error::{is_unique_violation, AppError, FieldErrors},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Signs a token pair and attaches the access token as the session cookie.
fn issue_session(state: &AppState, user: User) -> Result<impl IntoResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    let cookie = session_cookie(&access_token, keys.access_ttl, state.config.cookie_secure);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            access_token,
            refresh_token,
            user: PublicUser {
                id: user.id,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut fields = FieldErrors::new();
    if !is_valid_email(&payload.email) {
        fields.insert("email", "Invalid email".into());
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        fields.insert(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
    if !fields.is_empty() {
        warn!(email = %payload.email, "registration rejected");
    }
    AppError::check(fields)?;

    // Ensure email is not taken
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = match User::create(&state.db, &payload.email, &hash).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "email registered concurrently");
            return Err(AppError::Conflict("Email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    let session = issue_session(&state, user)?;
    Ok((StatusCode::CREATED, session))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        let mut fields = FieldErrors::new();
        fields.insert("email", "Invalid email".into());
        return Err(AppError::Validation(fields));
    }

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    issue_session(&state, user)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    issue_session(&state, user)
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(state.config.cookie_secure))],
    )
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    let medication_count = User::count_medications(&state.db, user_id).await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
        medication_count,
    }))
}
