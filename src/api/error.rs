//! Error taxonomy shared by every handler.
//!
//! Failures serialize as `{"success": false, "error": "..."}`, except field
//! validation which mirrors form errors as `{"success": false, "errors":
//! {field: [message]}}`. Database errors are logged and never leak SQL
//! details to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    /// Per-field validation failure, rendered as a field map.
    Field(&'static str, &'static str),
    /// Request-level validation failure.
    Validation(&'static str),
    /// Login failure. Unknown email and wrong password share one message.
    InvalidCredentials,
    /// Password re-verification failure on an authenticated mutation.
    PasswordIncorrect(&'static str),
    /// Missing, expired, or malformed bearer token.
    Unauthenticated,
    NotFound(&'static str),
    /// Write-once guard tripped.
    AlreadyCompleted(&'static str),
    Internal(String),
    Database(sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Field(field, message) => {
                let mut errors = serde_json::Map::new();
                errors.insert(field.to_string(), json!([message]));
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "success": false, "errors": errors })),
                )
                    .into_response()
            }
            Self::Validation(message) | Self::AlreadyCompleted(message) => {
                fail(StatusCode::BAD_REQUEST, message)
            }
            Self::InvalidCredentials => fail(StatusCode::UNAUTHORIZED, "Invalid email or password"),
            Self::PasswordIncorrect(message) => fail(StatusCode::UNAUTHORIZED, message),
            Self::Unauthenticated => fail(StatusCode::UNAUTHORIZED, "User not authenticated"),
            Self::NotFound(message) => fail(StatusCode::NOT_FOUND, message),
            Self::Internal(message) => fail(StatusCode::INTERNAL_SERVER_ERROR, &message),
            Self::Database(err) => {
                error!("Database error: {err}");
                fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

fn fail(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_validation_body() {
        let response = ApiError::Validation("Email and password required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Email and password required");
    }

    #[tokio::test]
    async fn test_field_body() {
        let response = ApiError::Field("email", "Enter a valid email address.").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["email"][0], "Enter a valid email address.");
    }

    #[tokio::test]
    async fn test_credential_failures_share_message() {
        let response = ApiError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_unauthenticated_distinct_from_invalid_credentials() {
        let body = body_json(ApiError::Unauthenticated.into_response()).await;
        assert_eq!(body["error"], "User not authenticated");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::NotFound("Admin profile not found")
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::AlreadyCompleted("Company setup already completed")
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
