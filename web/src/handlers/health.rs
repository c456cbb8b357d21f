//! Liveness endpoint, used by the compose/k8s probe for each service.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

/// `GET /health`: always 200 if the process is up. Does not check the
/// event bus or peer services; those are covered by the saga's own retry
/// and circuit-breaker behavior rather than a readiness probe.
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthBody>) {
    (StatusCode::OK, Json(HealthBody { status: "ok" }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_check_returns_ok_status_body() {
        let (status, Json(body)) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }
}
