//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

/// A dependency that must be reachable before the service takes traffic.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Name reported in the readiness body (e.g. `"database"`).
    fn component(&self) -> &'static str;

    /// Check the dependency.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the dependency is unavailable.
    async fn check(&self) -> Result<(), String>;
}

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check dependencies (database, etc.).
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness response body.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,
    /// Component that was checked
    pub component: &'static str,
    /// Failure reason, when not ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Readiness check endpoint.
///
/// # Status Codes
///
/// - 200 OK: the probe succeeded
/// - 503 Service Unavailable: the probe failed
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
pub async fn readiness_check(
    State(probe): State<Arc<dyn ReadinessProbe>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    match probe.check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                ready: true,
                component: probe.component(),
                error: None,
            }),
        ),
        Err(error) => {
            tracing::warn!(component = probe.component(), error = %error, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    ready: false,
                    component: probe.component(),
                    error: Some(error),
                }),
            )
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProbe(Result<(), String>);

    #[async_trait]
    impl ReadinessProbe for StaticProbe {
        fn component(&self) -> &'static str {
            "database"
        }

        async fn check(&self) -> Result<(), String> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_readiness_ok() {
        let probe: Arc<dyn ReadinessProbe> = Arc::new(StaticProbe(Ok(())));
        let (status, Json(body)) = readiness_check(State(probe)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.ready);
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_readiness_unavailable() {
        let probe: Arc<dyn ReadinessProbe> =
            Arc::new(StaticProbe(Err("connection refused".to_string())));
        let (status, Json(body)) = readiness_check(State(probe)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.ready);
        assert_eq!(body.error.as_deref(), Some("connection refused"));
    }
}
