//! Service health endpoint.

use axum::{
    extract::Extension,
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use sqlx::{Connection, PgPool};
use tracing::{error, info_span, Instrument};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    commit: &'static str,
    name: &'static str,
    version: &'static str,
    database: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = Health),
        (status = 503, description = "Database unreachable", body = Health)
    ),
    tag = "health"
)]
/// Health probe. `GET` pings the database, `OPTIONS` answers without it.
pub async fn health(method: Method, Extension(pool): Extension<PgPool>) -> impl IntoResponse {
    let mut health = Health {
        commit: crate::GIT_COMMIT_HASH,
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        database: false,
    };

    if method == Method::OPTIONS {
        return (
            StatusCode::OK,
            [("x-app", crate::APP_USER_AGENT)],
            Json(health),
        )
            .into_response();
    }

    health.database = database_alive(&pool).await;

    let status = if health.database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, [("x-app", crate::APP_USER_AGENT)], Json(health)).into_response()
}

async fn database_alive(pool: &PgPool) -> bool {
    let acquire_span = info_span!(
        "db.acquire",
        db.system = "postgresql",
        db.operation = "ACQUIRE"
    );

    match pool.acquire().instrument(acquire_span).await {
        Ok(mut connection) => {
            let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
            match connection.ping().instrument(ping_span).await {
                Ok(()) => true,
                Err(err) => {
                    error!("Failed to ping database: {err}");
                    false
                }
            }
        }
        Err(err) => {
            error!("Failed to acquire database connection: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_db::TestDb;
    use anyhow::Result;

    #[tokio::test]
    async fn test_health_reports_database() -> Result<()> {
        let Ok(db) = TestDb::new().await else {
            return Ok(());
        };

        let response = health(Method::GET, Extension(db.pool)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-app").and_then(|v| v.to_str().ok()),
            Some(crate::APP_USER_AGENT)
        );
        Ok(())
    }
}
