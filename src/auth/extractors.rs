use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use super::services::{token_from_cookie_header, JwtKeys};
use crate::error::AppError;

/// Authenticated caller, taken from a bearer token or the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let bearer = match parts.headers.get(header::AUTHORIZATION) {
            Some(value) => {
                let value = value
                    .to_str()
                    .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;
                let token = value
                    .strip_prefix("Bearer ")
                    .or_else(|| value.strip_prefix("bearer "))
                    .ok_or_else(|| AppError::Unauthorized("Invalid auth scheme".into()))?;
                Some(token)
            }
            None => None,
        };

        let token = bearer
            .or_else(|| {
                parts
                    .headers
                    .get_all(header::COOKIE)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .find_map(token_from_cookie_header)
            })
            .ok_or_else(|| AppError::Unauthorized("Missing credentials".into()))?;

        let claims = keys.verify_access(token).map_err(|e| {
            warn!(error = %e, "rejected token");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(AuthUser(claims.sub))
    }
}
