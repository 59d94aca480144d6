//! Login and logout for the admin-tier surface.

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
use super::storage::{self, PrincipalRow};
use super::tokens::{issue_token_pair, TokenPair};
use super::types::{AdminLoginData, AdminLoginResponse, AdminUser, LoginRequest, MessageResponse};
use crate::api::error::ApiError;
use crate::api::handlers::normalize_email;

/// Verify a credential and issue a token pair.
///
/// Unknown email and wrong password collapse into one `InvalidCredentials`.
/// A matching legacy plaintext value is rehashed in place before tokens go
/// out, so the plaintext path is taken at most once per principal.
pub(crate) async fn authenticate(
    pool: &PgPool,
    state: &Arc<AuthState>,
    email: &str,
    password: &str,
) -> Result<(PrincipalRow, TokenPair), ApiError> {
    let email = normalize_email(email);

    let Some(principal) = storage::find_principal_by_login_email(pool, &email)
        .await
        .map_err(ApiError::Database)?
    else {
        return Err(ApiError::InvalidCredentials);
    };

    let check = CredentialValue::parse(principal.credential())
        .verify(password)
        .map_err(|err| ApiError::Internal(format!("credential verification failed: {err}")))?;

    match check {
        CredentialCheck::Match => {}
        CredentialCheck::MatchNeedsRehash => {
            let rehashed = hash_password(password)
                .map_err(|err| ApiError::Internal(format!("failed to hash credential: {err}")))?;
            storage::rehash_credential(pool, principal.id(), &rehashed)
                .await
                .map_err(ApiError::Database)?;
            info!(login_email = %principal.login_email(), "legacy credential upgraded to hash");
        }
        CredentialCheck::Mismatch => return Err(ApiError::InvalidCredentials),
    }

    let config = state.config();
    let pair = issue_token_pair(
        state.jwt_secret(),
        &principal.id().to_string(),
        &principal.company_id().to_string(),
        principal.role(),
        principal.login_email(),
        config.access_token_ttl_seconds(),
        config.refresh_token_ttl_seconds(),
    )
    .map_err(|err| ApiError::Internal(format!("failed to issue tokens: {err}")))?;

    storage::stamp_last_login(pool, principal.id())
        .await
        .map_err(ApiError::Database)?;

    Ok((principal, pair))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AdminLoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
/// Signs a principal in on the admin-tier surface.
///
/// The response carries `temp_password` and `company_setup_completed` so the
/// client can route through the setup wizard before normal use.
pub async fn login(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let (Some(email), Some(password)) = (payload.email.as_deref(), payload.password.as_deref())
    else {
        return ApiError::Validation("Email and password required").into_response();
    };
    if email.trim().is_empty() || password.is_empty() {
        return ApiError::Validation("Email and password required").into_response();
    }

    match authenticate(&pool, &state, email, password).await {
        Ok((principal, pair)) => {
            let role = payload.role.unwrap_or_else(|| "admin".to_string());
            (
                StatusCode::OK,
                Json(AdminLoginResponse {
                    success: true,
                    data: AdminLoginData {
                        access_token: pair.access_token,
                        refresh_token: pair.refresh_token,
                        user: AdminUser {
                            id: principal.id().to_string(),
                            email: principal.login_email().to_string(),
                            username: principal.login_email().to_string(),
                            full_name: principal.full_name().to_string(),
                            company_id: principal.company_id().to_string(),
                            company_name: principal.company_name().to_string(),
                            temp_password: principal.temp_password_set(),
                            company_setup_completed: principal.company_setup_completed(),
                            role,
                        },
                    },
                }),
            )
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth"
)]
/// Acknowledges sign-out. Tokens are stateless, the client discards them.
pub async fn logout(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(err) = require_auth(&headers, &state, &pool).await {
        return err.into_response();
    }

    (
        StatusCode::OK,
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
        .into_response()
}
