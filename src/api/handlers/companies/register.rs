use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::code::derive_code;
use super::storage::{self, NewCompany};
use super::types::{RegisterCompanyRequest, RegisterCompanyResponse};
use crate::api::error::ApiError;
use crate::api::handlers::auth::AuthState;
use crate::api::handlers::{normalize_email, valid_email};

#[utoipa::path(
    post,
    path = "/companies/register",
    request_body = RegisterCompanyRequest,
    responses(
        (status = 201, description = "Company registered, pending admin provisioning", body = RegisterCompanyResponse),
        (status = 400, description = "Missing or invalid fields")
    ),
    tag = "companies"
)]
/// Registers a company and mints its one-time admin registration token.
///
/// The company starts in `pending` status and stays there until the token is
/// redeemed by first-admin provisioning. The token itself never appears in
/// the response, it travels out of band.
pub async fn register(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<RegisterCompanyRequest>,
) -> impl IntoResponse {
    let Some(name) = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    else {
        return ApiError::Field("name", "This field is required.").into_response();
    };

    let Some(email) = payload.email.as_deref().filter(|email| !email.trim().is_empty()) else {
        return ApiError::Field("email", "This field is required.").into_response();
    };
    let email = normalize_email(email);
    if !valid_email(&email) {
        return ApiError::Field("email", "Enter a valid email address.").into_response();
    }

    let Some(code) = derive_code(name) else {
        return ApiError::Field("name", "Company name must contain letters or digits.")
            .into_response();
    };

    let new = NewCompany {
        name,
        code: &code,
        email: &email,
        phone: payload.phone.as_deref(),
        website: payload.website.as_deref(),
        address: payload.address.as_deref(),
        city: payload.city.as_deref(),
        state: payload.state.as_deref(),
        country: payload.country.as_deref(),
        pincode: payload.pincode.as_deref(),
        timezone: payload.timezone.as_deref().unwrap_or("Asia/Kolkata"),
        currency: payload.currency.as_deref().unwrap_or("INR"),
    };

    match storage::register_company(
        &pool,
        &new,
        state.config().registration_token_ttl_seconds(),
    )
    .await
    {
        Ok(company) => {
            info!(code = %company.code(), "company registered");
            (
                StatusCode::CREATED,
                Json(RegisterCompanyResponse {
                    success: true,
                    data: company.to_summary(),
                }),
            )
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}
