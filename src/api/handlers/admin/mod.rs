//! Admin settings endpoints.
//!
//! Everything behind the settings page: profile, avatar, notification
//! preferences, password rotation, session listing, and appearance. Session
//! data is a placeholder until real session tracking lands.

use axum::{
    extract::{Extension, Multipart, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

pub(crate) mod storage;
pub mod types;

use crate::api::error::ApiError;
use crate::api::handlers::auth::credentials::{hash_password, CredentialCheck, CredentialValue};
use crate::api::handlers::auth::principal::require_auth;
use crate::api::handlers::auth::provision::ROLE_ADMIN;
use crate::api::handlers::auth::storage as auth_storage;
use crate::api::handlers::auth::types::MessageResponse;
use crate::api::handlers::auth::AuthState;
use types::{
    AdminChangePasswordRequest, AdminProfileData, AdminProfileResponse, AppearanceData,
    AppearanceRequest, AppearanceResponse, AvatarData, AvatarResponse, NotificationSettings,
    NotificationsResponse, SessionInfo, SessionsResponse, UpdateNotificationsRequest,
    UpdateProfileRequest, UpdateProfileResponse, UpdatedProfileData,
};

const MIN_PASSWORD_CHARS: usize = 8;
const FALLBACK_TIMEZONE: &str = "Asia/Kolkata";

#[utoipa::path(
    get,
    path = "/admin/profile",
    responses(
        (status = 200, description = "Admin profile", body = AdminProfileResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Caller is not a company admin")
    ),
    tag = "admin"
)]
pub async fn get_profile(
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

    (
        StatusCode::OK,
        Json(AdminProfileResponse {
            success: true,
            data: AdminProfileData {
                full_name: principal.full_name().to_string(),
                email: principal.login_email().to_string(),
                phone: principal.phone().unwrap_or("").to_string(),
                department: "Admin".to_string(),
                avatar: principal.avatar_url().map(ToString::to_string),
            },
        }),
    )
        .into_response()
}

#[utoipa::path(
    put,
    path = "/admin/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UpdateProfileResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Caller is not a company admin")
    ),
    tag = "admin"
)]
/// Updates the editable profile fields.
///
/// An omitted field keeps its stored value; a blank full name is treated
/// as omitted, but a blank phone clears the number.
pub async fn update_profile(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &state, &pool).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };
    if principal.role() != ROLE_ADMIN {
        return ApiError::NotFound("Admin profile not found").into_response();
    }

    let full_name = payload
        .full_name
        .as_deref()
        .filter(|name| !name.is_empty());
    let phone = payload.phone.as_deref();

    if let Err(err) =
        storage::update_admin_profile(&pool, principal.id(), full_name, phone).await
    {
        return ApiError::Database(err).into_response();
    }

    (
        StatusCode::OK,
        Json(UpdateProfileResponse {
            success: true,
            message: "Profile updated successfully".to_string(),
            data: UpdatedProfileData {
                full_name: full_name.unwrap_or(principal.full_name()).to_string(),
                email: principal.login_email().to_string(),
                phone: phone.unwrap_or(principal.phone().unwrap_or("")).to_string(),
            },
        }),
    )
        .into_response()
}

/// Maps an upload to the stored file extension, content type first, then
/// the client file name, falling back to an opaque one.
fn avatar_extension(content_type: Option<&str>, file_name: Option<&str>) -> &'static str {
    match content_type {
        Some("image/jpeg") => return "jpg",
        Some("image/png") => return "png",
        Some("image/gif") => return "gif",
        Some("image/webp") => return "webp",
        _ => {}
    }
    if let Some(ext) = file_name.and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext)) {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => return "jpg",
            "png" => return "png",
            "gif" => return "gif",
            "webp" => return "webp",
            _ => {}
        }
    }
    "bin"
}

#[utoipa::path(
    post,
    path = "/admin/avatar",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Missing or oversized file"),
        (status = 404, description = "Caller is not a company admin")
    ),
    tag = "admin"
)]
pub async fn upload_avatar(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &state, &pool).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };
    if principal.role() != ROLE_ADMIN {
        return ApiError::NotFound("Admin profile not found").into_response();
    }

    let mut upload = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return ApiError::Validation("No avatar file provided").into_response(),
        };
        if field.name() != Some("avatar") {
            continue;
        }
        // Metadata is borrowed from the field, take it before the body read
        // consumes it.
        let extension = avatar_extension(field.content_type(), field.file_name());
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                return ApiError::Internal(format!("failed to read avatar upload: {err}"))
                    .into_response()
            }
        };
        upload = Some((extension, bytes));
        break;
    }

    let Some((extension, bytes)) = upload else {
        return ApiError::Validation("No avatar file provided").into_response();
    };
    if bytes.len() > crate::api::MAX_AVATAR_BYTES {
        return ApiError::Validation("File size exceeds 5MB limit").into_response();
    }

    let avatar_dir = format!("{}/avatars", state.config().media_dir());
    if let Err(err) = tokio::fs::create_dir_all(&avatar_dir).await {
        return ApiError::Internal(format!("failed to create media directory: {err}"))
            .into_response();
    }
    let file_name = format!("{}.{extension}", principal.id());
    if let Err(err) = tokio::fs::write(format!("{avatar_dir}/{file_name}"), &bytes).await {
        return ApiError::Internal(format!("failed to store avatar: {err}")).into_response();
    }

    let avatar_url = format!("/media/avatars/{file_name}");
    if let Err(err) = storage::set_avatar_url(&pool, principal.id(), &avatar_url).await {
        return ApiError::Database(err).into_response();
    }

    info!(login_email = %principal.login_email(), size = bytes.len(), "avatar stored");

    (
        StatusCode::OK,
        Json(AvatarResponse {
            success: true,
            message: "Avatar uploaded successfully".to_string(),
            data: AvatarData { avatar_url },
        }),
    )
        .into_response()
}

fn default_notifications() -> NotificationSettings {
    NotificationSettings {
        email_notifications: true,
        push_notifications: true,
        sms_notifications: false,
        leave_approvals: true,
        task_assignments: true,
        payroll_updates: true,
    }
}

#[utoipa::path(
    get,
    path = "/admin/notifications",
    responses(
        (status = 200, description = "Notification settings", body = NotificationsResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "admin"
)]
pub async fn get_notifications(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(err) = require_auth(&headers, &state, &pool).await {
        return err.into_response();
    }

    (
        StatusCode::OK,
        Json(NotificationsResponse {
            success: true,
            message: None,
            data: default_notifications(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    put,
    path = "/admin/notifications",
    request_body = UpdateNotificationsRequest,
    responses(
        (status = 200, description = "Settings updated", body = NotificationsResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "admin"
)]
/// Echoes the merged settings. Nothing is persisted yet, the store for
/// per-principal preferences does not exist.
pub async fn update_notifications(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<UpdateNotificationsRequest>,
) -> impl IntoResponse {
    if let Err(err) = require_auth(&headers, &state, &pool).await {
        return err.into_response();
    }

    let defaults = default_notifications();
    let data = NotificationSettings {
        email_notifications: payload
            .email_notifications
            .unwrap_or(defaults.email_notifications),
        push_notifications: payload
            .push_notifications
            .unwrap_or(defaults.push_notifications),
        sms_notifications: payload
            .sms_notifications
            .unwrap_or(defaults.sms_notifications),
        leave_approvals: payload.leave_approvals.unwrap_or(defaults.leave_approvals),
        task_assignments: payload
            .task_assignments
            .unwrap_or(defaults.task_assignments),
        payroll_updates: payload.payroll_updates.unwrap_or(defaults.payroll_updates),
    };

    (
        StatusCode::OK,
        Json(NotificationsResponse {
            success: true,
            message: Some("Notification settings updated successfully".to_string()),
            data,
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/admin/change_password",
    request_body = AdminChangePasswordRequest,
    responses(
        (status = 200, description = "Password rotated", body = MessageResponse),
        (status = 400, description = "Missing, mismatched, or weak passwords"),
        (status = 401, description = "Wrong current password")
    ),
    tag = "admin"
)]
pub async fn change_password(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<AdminChangePasswordRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &state, &pool).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };

    let (Some(old_password), Some(new_password), Some(confirm_password)) = (
        payload.old_password.as_deref(),
        payload.new_password.as_deref(),
        payload.confirm_password.as_deref(),
    ) else {
        return ApiError::Validation("All fields are required").into_response();
    };
    if old_password.is_empty() || new_password.is_empty() || confirm_password.is_empty() {
        return ApiError::Validation("All fields are required").into_response();
    }
    if new_password != confirm_password {
        return ApiError::Validation("New passwords do not match").into_response();
    }
    if new_password.chars().count() < MIN_PASSWORD_CHARS {
        return ApiError::Validation("Password must be at least 8 characters").into_response();
    }

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
    if let Err(err) = auth_storage::update_password(&pool, principal.id(), &password_hash).await {
        return ApiError::Database(err).into_response();
    }

    info!(login_email = %principal.login_email(), "password rotated");

    (
        StatusCode::OK,
        Json(MessageResponse {
            success: true,
            message: "Password changed successfully".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/admin/sessions",
    responses(
        (status = 200, description = "Active sessions", body = SessionsResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "admin"
)]
/// Lists active sessions. Placeholder data, sessions are not tracked.
pub async fn sessions(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(err) = require_auth(&headers, &state, &pool).await {
        return err.into_response();
    }

    (
        StatusCode::OK,
        Json(SessionsResponse {
            success: true,
            data: vec![SessionInfo {
                id: "1".to_string(),
                browser: "Chrome".to_string(),
                device: "Windows".to_string(),
                location: "New York, US".to_string(),
                ip_address: "192.168.1.1".to_string(),
                last_active: "Just now".to_string(),
                is_current: true,
            }],
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/admin/sessions/{id}/logout",
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session logged out", body = MessageResponse),
        (status = 400, description = "Refusing to log out the current session"),
        (status = 401, description = "Not authenticated")
    ),
    tag = "admin"
)]
pub async fn logout_session(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    if let Err(err) = require_auth(&headers, &state, &pool).await {
        return err.into_response();
    }

    if session_id == "1" || session_id == "current" {
        return ApiError::Validation("Cannot logout current session").into_response();
    }

    (
        StatusCode::OK,
        Json(MessageResponse {
            success: true,
            message: "Session logged out successfully".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    put,
    path = "/admin/appearance",
    request_body = AppearanceRequest,
    responses(
        (status = 200, description = "Appearance updated", body = AppearanceResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Caller is not a company admin")
    ),
    tag = "admin"
)]
/// Persists the timezone choice. Theme and language are echoed back for the
/// client to store locally.
pub async fn update_appearance(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<AppearanceRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &state, &pool).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };
    if principal.role() != ROLE_ADMIN {
        return ApiError::NotFound("Admin profile not found").into_response();
    }

    let theme = payload.theme.as_deref().unwrap_or("system");
    let language = payload.language.as_deref().unwrap_or("en");
    let timezone = payload
        .timezone
        .as_deref()
        .or_else(|| principal.timezone())
        .unwrap_or(FALLBACK_TIMEZONE);

    if let Err(err) = storage::update_timezone(&pool, principal.id(), timezone).await {
        return ApiError::Database(err).into_response();
    }

    (
        StatusCode::OK,
        Json(AppearanceResponse {
            success: true,
            message: "Appearance settings updated successfully".to_string(),
            data: AppearanceData {
                theme: theme.to_string(),
                language: language.to_string(),
                timezone: timezone.to_string(),
            },
        }),
    )
        .into_response()
}
