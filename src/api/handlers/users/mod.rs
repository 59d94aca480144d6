//! Employee-tier account endpoints.
//!
//! Managers, HR, and employees sign in here. The flows mirror the admin
//! surface but answer with this client's response shapes and messages.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) mod storage;
pub mod types;

use crate::api::error::ApiError;
use crate::api::handlers::auth::credentials::{hash_password, CredentialCheck, CredentialValue};
use crate::api::handlers::auth::login::authenticate;
use crate::api::handlers::auth::principal::require_auth;
use crate::api::handlers::auth::storage as auth_storage;
use crate::api::handlers::auth::AuthState;
use crate::api::handlers::companies::storage::find_department_id_by_name;
use storage::ProfileFields;
use types::{
    ChangedUser, CompleteProfileRequest, CompleteProfileResponse, ProfileData, ProfileUser,
    UserAccount, UserChangePasswordRequest, UserChangePasswordResponse, UserLoginData,
    UserLoginRequest, UserLoginResponse, UserPasswordData,
};

const MIN_PASSWORD_CHARS: usize = 8;

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = UserLoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = UserLoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "users"
)]
/// Signs an employee-tier principal in.
///
/// `temp_password` and `profile_completed` drive the client's setup wizard
/// routing after first login.
pub async fn login(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<UserLoginRequest>,
) -> impl IntoResponse {
    let (Some(email), Some(password)) = (payload.email.as_deref(), payload.password.as_deref())
    else {
        return ApiError::Validation("Email and password required").into_response();
    };
    if email.trim().is_empty() || password.is_empty() {
        return ApiError::Validation("Email and password required").into_response();
    }

    match authenticate(&pool, &state, email, password).await {
        Ok((principal, pair)) => (
            StatusCode::OK,
            Json(UserLoginResponse {
                success: true,
                data: UserLoginData {
                    token: pair.access_token,
                    refresh_token: pair.refresh_token,
                    user: UserAccount {
                        id: principal.id().to_string(),
                        email: principal.login_email().to_string(),
                        full_name: principal.full_name().to_string(),
                        phone: principal.phone().map(ToString::to_string),
                        role: principal.role().to_string(),
                        company_id: principal.company_id().to_string(),
                        department_id: principal.department_id().map(|id| id.to_string()),
                        designation: principal.designation().map(ToString::to_string),
                        temp_password: principal.temp_password_set(),
                        profile_completed: principal.profile_completed(),
                        is_active: principal.is_active(),
                    },
                },
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/users/change_password",
    request_body = UserChangePasswordRequest,
    responses(
        (status = 200, description = "Password rotated", body = UserChangePasswordResponse),
        (status = 400, description = "Missing fields or weak password"),
        (status = 401, description = "Not authenticated or wrong old password")
    ),
    tag = "users"
)]
/// Rotates an employee-tier credential and clears the temp-password flag.
pub async fn change_password(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<UserChangePasswordRequest>,
) -> impl IntoResponse {
    let (Some(old_password), Some(new_password)) = (
        payload.old_password.as_deref(),
        payload.new_password.as_deref(),
    ) else {
        return ApiError::Validation("Old and new passwords required").into_response();
    };
    if old_password.is_empty() || new_password.is_empty() {
        return ApiError::Validation("Old and new passwords required").into_response();
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
        return ApiError::PasswordIncorrect("Invalid old password").into_response();
    }

    let password_hash = match hash_password(new_password) {
        Ok(hash) => hash,
        Err(err) => {
            return ApiError::Internal(format!("failed to hash credential: {err}")).into_response()
        }
    };

    if let Err(err) = auth_storage::update_password(&pool, principal.id(), &password_hash).await {
        return ApiError::Database(err).into_response();
    }

    info!(login_email = %principal.login_email(), "password rotated");

    (
        StatusCode::OK,
        Json(UserChangePasswordResponse {
            success: true,
            data: UserPasswordData {
                user: ChangedUser {
                    id: principal.id().to_string(),
                    email: principal.login_email().to_string(),
                    full_name: principal.full_name().to_string(),
                    role: principal.role().to_string(),
                    temp_password: false,
                    profile_completed: principal.profile_completed(),
                },
            },
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/users/profile/complete",
    request_body = CompleteProfileRequest,
    responses(
        (status = 200, description = "Profile completed", body = CompleteProfileResponse),
        (status = 400, description = "Missing fields or already completed")
    ),
    tag = "users"
)]
/// Completes the one-time profile wizard.
///
/// The department is resolved by case-insensitive name within the caller's
/// company; a miss is tolerated and the profile completes unbound.
pub async fn complete_profile(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<CompleteProfileRequest>,
) -> impl IntoResponse {
    let (Some(full_name), Some(designation)) = (
        payload.full_name.as_deref().map(str::trim).filter(|name| !name.is_empty()),
        payload
            .designation
            .as_deref()
            .map(str::trim)
            .filter(|designation| !designation.is_empty()),
    ) else {
        return ApiError::Validation("Full name and designation are required").into_response();
    };

    let principal = match require_auth(&headers, &state, &pool).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };
    if principal.profile_completed() {
        return ApiError::AlreadyCompleted("Profile already completed").into_response();
    }

    let department_id = match payload
        .department
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        Some(department_name) => {
            match find_department_id_by_name(&pool, principal.company_id(), department_name).await
            {
                Ok(Some(id)) => Some(id),
                Ok(None) => {
                    warn!(
                        company_id = %principal.company_id(),
                        department = department_name,
                        "department not found, completing profile without binding"
                    );
                    None
                }
                Err(err) => return ApiError::Database(err).into_response(),
            }
        }
        None => None,
    };

    let fields = ProfileFields {
        full_name,
        designation,
        department_id,
        phone: payload.phone.as_deref(),
        gender: payload.gender.as_deref(),
        date_of_birth: payload.date_of_birth.as_deref(),
        address: payload.address.as_deref(),
        city: payload.city.as_deref(),
        state: payload.state.as_deref(),
        country: payload.country.as_deref(),
        pincode: payload.pincode.as_deref(),
        marital_status: payload.marital_status.as_deref(),
        bio: payload.bio.as_deref(),
    };

    if let Err(err) = storage::complete_profile(&pool, principal.id(), &fields).await {
        return err.into_response();
    }

    // The transactional write is committed; answer from the values just
    // written instead of re-reading the row.
    (
        StatusCode::OK,
        Json(CompleteProfileResponse {
            success: true,
            data: ProfileData {
                user: ProfileUser {
                    id: principal.id().to_string(),
                    email: principal.login_email().to_string(),
                    full_name: full_name.to_string(),
                    phone: payload
                        .phone
                        .clone()
                        .or_else(|| principal.phone().map(ToString::to_string)),
                    role: principal.role().to_string(),
                    company_id: principal.company_id().to_string(),
                    department_id: department_id.map(|id| id.to_string()),
                    designation: designation.to_string(),
                    profile_completed: true,
                    temp_password: principal.temp_password_set(),
                },
            },
        }),
    )
        .into_response()
}
