//! First-admin and HR onboarding endpoints.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::principal::require_auth;
use super::provision::{
    self, CompanyRef, ProvisionOutcome, HR_SPEC, ROLE_ADMIN, ROLE_HR,
};
use super::state::AuthState;
use super::storage;
use super::types::{
    AddHrRequest, CreateAdminRequest, HrListResponse, HrSummary, ProvisionResponse,
    ProvisionedAccount,
};
use crate::api::error::ApiError;
use crate::api::handlers::{normalize_email, valid_email};

fn provision_response(
    outcome: &ProvisionOutcome,
    personal_email: &str,
    created_message: &str,
    exists_message: &str,
) -> axum::response::Response {
    let (status, message) = if outcome.created {
        (StatusCode::CREATED, created_message)
    } else {
        (StatusCode::OK, exists_message)
    };

    let principal = &outcome.principal;
    (
        status,
        Json(ProvisionResponse {
            success: true,
            message: message.to_string(),
            data: ProvisionedAccount {
                id: principal.id().to_string(),
                login_email: principal.login_email().to_string(),
                personal_email: personal_email.to_string(),
                full_name: principal.full_name().to_string(),
                role: principal.role().to_string(),
                company_id: principal.company_id().to_string(),
                company_name: principal.company_name().to_string(),
                temp_password: principal.temp_password_set(),
            },
            warning: outcome.email_warning.map(ToString::to_string),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/auth/create_admin",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin provisioned, credentials emailed", body = ProvisionResponse),
        (status = 400, description = "Invalid token or missing fields")
    ),
    tag = "auth"
)]
/// Redeems a registration token into the company's first admin account.
///
/// Consuming the token also flips the company from `pending` to `active`.
pub async fn create_admin(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<CreateAdminRequest>,
) -> impl IntoResponse {
    let Some(token) = payload
        .registration_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
    else {
        return ApiError::Validation("Registration token is required").into_response();
    };

    let (Some(full_name), Some(personal_email)) = (
        payload.full_name.as_deref().map(str::trim).filter(|name| !name.is_empty()),
        payload.personal_email.as_deref(),
    ) else {
        return ApiError::Validation("Full name and personal email are required").into_response();
    };

    let personal_email = normalize_email(personal_email);
    if !valid_email(&personal_email) {
        return ApiError::Validation("A valid personal email is required").into_response();
    }

    match provision::create_first_admin(
        &pool,
        &state,
        token,
        full_name,
        &personal_email,
        payload.phone.as_deref(),
    )
    .await
    {
        Ok(outcome) => provision_response(
            &outcome,
            &personal_email,
            "Admin account created successfully",
            "Admin account already exists",
        ),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/auth/add_hr",
    request_body = AddHrRequest,
    responses(
        (status = 201, description = "HR account provisioned", body = ProvisionResponse),
        (status = 400, description = "Missing fields"),
        (status = 404, description = "Caller is not a company admin")
    ),
    tag = "auth"
)]
/// Provisions the company's HR account with a temporary credential.
pub async fn add_hr(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<AddHrRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &state, &pool).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };
    if principal.role() != ROLE_ADMIN {
        return ApiError::NotFound("Admin profile not found").into_response();
    }

    let (Some(full_name), Some(personal_email)) = (
        payload.full_name.as_deref().map(str::trim).filter(|name| !name.is_empty()),
        payload.personal_email.as_deref(),
    ) else {
        return ApiError::Validation("Full name and personal email are required").into_response();
    };

    let personal_email = normalize_email(personal_email);
    if !valid_email(&personal_email) {
        return ApiError::Validation("A valid personal email is required").into_response();
    }

    let company = CompanyRef {
        id: principal.company_id(),
        name: principal.company_name(),
        code: principal.company_code(),
    };

    match provision::provision_principal(
        &pool,
        &state,
        &company,
        HR_SPEC,
        full_name,
        &personal_email,
        payload.phone.as_deref(),
    )
    .await
    {
        Ok(outcome) => provision_response(
            &outcome,
            &personal_email,
            "HR account created successfully",
            "HR account already exists",
        ),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/auth/company_hrs",
    responses(
        (status = 200, description = "HR accounts for the caller's company", body = HrListResponse),
        (status = 404, description = "Caller is not a company admin")
    ),
    tag = "auth"
)]
/// Lists the HR accounts provisioned for the caller's company.
pub async fn company_hrs(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &state, &pool).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };
    if principal.role() != ROLE_ADMIN {
        return ApiError::NotFound("Admin profile not found").into_response();
    }

    match storage::list_role_principals(&pool, principal.company_id(), ROLE_HR).await {
        Ok(rows) => {
            let data = rows
                .iter()
                .map(|row| HrSummary {
                    id: row.id().to_string(),
                    full_name: row.full_name().to_string(),
                    personal_email: row.personal_email().to_string(),
                    login_email: row.login_email().to_string(),
                    phone: row.phone().map(ToString::to_string),
                    created_at: row.created_at().to_string(),
                })
                .collect();

            (StatusCode::OK, Json(HrListResponse { success: true, data })).into_response()
        }
        Err(err) => ApiError::Database(err).into_response(),
    }
}
