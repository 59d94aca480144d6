//! Authenticated principal extraction.
//!
//! The bearer token proves identity; the row is reloaded per request so
//! handlers always see current lifecycle flags, not the ones frozen into the
//! token at login.

use axum::http::HeaderMap;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::state::AuthState;
use super::storage::{self, PrincipalRow};
use super::tokens::{extract_bearer_token, verify_access_token};
use crate::api::error::ApiError;

pub(crate) async fn require_auth(
    headers: &HeaderMap,
    state: &Arc<AuthState>,
    pool: &PgPool,
) -> Result<PrincipalRow, ApiError> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(ApiError::Unauthenticated);
    };

    let Some(claims) = verify_access_token(state.jwt_secret(), token) else {
        return Err(ApiError::Unauthenticated);
    };

    let Ok(principal_id) = claims.sub.parse::<Uuid>() else {
        return Err(ApiError::Unauthenticated);
    };

    match storage::find_principal_by_id(pool, principal_id).await {
        Ok(Some(principal)) => Ok(principal),
        Ok(None) => Err(ApiError::Unauthenticated),
        Err(err) => Err(ApiError::Database(err)),
    }
}
