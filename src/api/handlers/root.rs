use axum::response::IntoResponse;

/// Service banner for the bare root path.
pub async fn root() -> impl IntoResponse {
    crate::APP_USER_AGENT
}
