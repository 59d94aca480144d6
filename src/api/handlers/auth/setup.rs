//! One-time company setup wizard.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::principal::require_auth;
use super::provision::ROLE_ADMIN;
use super::state::AuthState;
use super::storage::{self, CompanySetupFields};
use super::types::{CompanySetupRequest, MessageResponse};
use crate::api::error::ApiError;

#[utoipa::path(
    post,
    path = "/auth/company_setup",
    request_body = CompanySetupRequest,
    responses(
        (status = 200, description = "Setup recorded", body = MessageResponse),
        (status = 400, description = "Setup already completed"),
        (status = 404, description = "Caller is not a company admin"),
        (status = 500, description = "Storage failure")
    ),
    tag = "auth"
)]
/// Applies the first-time company configuration.
///
/// Write-once: the completed flag has no override, replays get 400.
pub async fn company_setup(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<CompanySetupRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &state, &pool).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };

    if principal.role() != ROLE_ADMIN {
        return ApiError::NotFound("Company admin not found").into_response();
    }
    if principal.company_setup_completed() {
        return ApiError::AlreadyCompleted("Company setup already completed").into_response();
    }

    let fields = CompanySetupFields {
        company_name: payload
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty()),
        company_website: payload.company_website.as_deref(),
        industry: payload.industry.as_deref(),
        timezone: payload.timezone.as_deref().unwrap_or("IST"),
        currency: payload.currency.as_deref().unwrap_or("INR"),
        total_employees: payload.total_employees.unwrap_or(0),
        working_hours_start: payload.working_hours_start.as_deref().unwrap_or("09:00"),
        working_hours_end: payload.working_hours_end.as_deref().unwrap_or("18:00"),
        casual_leave_days: payload.casual_leave_days.unwrap_or(12),
        sick_leave_days: payload.sick_leave_days.unwrap_or(6),
        personal_leave_days: payload.personal_leave_days.unwrap_or(2),
    };

    match storage::complete_company_setup(&pool, principal.id(), principal.company_id(), &fields)
        .await
    {
        Ok(()) => {
            info!(company_id = %principal.company_id(), "company setup completed");
            (
                StatusCode::OK,
                Json(MessageResponse {
                    success: true,
                    message: "Company setup completed successfully".to_string(),
                }),
            )
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}
