//! Temporary password rotation.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::credentials::{hash_password, CredentialCheck, CredentialValue};
use super::principal::require_auth;
use super::state::AuthState;
use super::storage;
use super::types::{ChangeTempPasswordRequest, MessageResponse};
use crate::api::error::ApiError;

const MIN_PASSWORD_CHARS: usize = 8;

#[utoipa::path(
    post,
    path = "/auth/change_temp_password",
    request_body = ChangeTempPasswordRequest,
    responses(
        (status = 200, description = "Password rotated", body = MessageResponse),
        (status = 400, description = "Missing fields or weak password"),
        (status = 401, description = "Not authenticated or wrong current password")
    ),
    tag = "auth"
)]
/// Rotates the credential after verifying the current one.
///
/// This is the only path that clears the temp-password flag, so a principal
/// provisioned with a temporary secret cannot keep it past first rotation.
pub async fn change_temp_password(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<ChangeTempPasswordRequest>,
) -> impl IntoResponse {
    let (Some(old_password), Some(new_password)) = (
        payload.old_password.as_deref(),
        payload.new_password.as_deref(),
    ) else {
        return ApiError::Validation("Old and new passwords are required").into_response();
    };
    if old_password.is_empty() || new_password.is_empty() {
        return ApiError::Validation("Old and new passwords are required").into_response();
    }
    if new_password.chars().count() < MIN_PASSWORD_CHARS {
        return ApiError::Validation("New password must be at least 8 characters").into_response();
    }

    let principal = match require_auth(&headers, &state, &pool).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };

    let check = match CredentialValue::parse(principal.credential()).verify(old_password) {
        Ok(check) => check,
        Err(err) => {
            return ApiError::Internal(format!("credential verification failed: {err}"))
                .into_response()
        }
    };
    if check == CredentialCheck::Mismatch {
        return ApiError::PasswordIncorrect("Current password is incorrect").into_response();
    }

    let password_hash = match hash_password(new_password) {
        Ok(hash) => hash,
        Err(err) => {
            return ApiError::Internal(format!("failed to hash credential: {err}")).into_response()
        }
    };

    if let Err(err) = storage::update_password(&pool, principal.id(), &password_hash).await {
        return ApiError::Database(err).into_response();
    }

    info!(login_email = %principal.login_email(), "temporary password rotated");

    (
        StatusCode::OK,
        Json(MessageResponse {
            success: true,
            message: "Password changed successfully".to_string(),
        }),
    )
        .into_response()
}
