//! Router configuration for the pull-tab engine.

use super::state::AppState;
use crate::api::{admin, designs, tickets, wallet, ADMIN_TOKEN_HEADER, PLAYER_ID_HEADER};
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use pulltab_web::{correlation_id_layer, health_check, readiness_check, AppError, CORRELATION_ID_HEADER};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Configures:
/// - Health, readiness and Prometheus endpoints
/// - Design catalogue and purchase
/// - Ticket play
/// - Wallet and ledger
/// - Admin design management and credits
///
/// Every request passes through the correlation ID layer.
pub fn build_router(state: AppState) -> Router {
    let player_routes = Router::new()
        .route("/designs", get(designs::list_designs))
        .route("/designs/:id", get(designs::get_design))
        .route("/designs/:id/purchase", post(designs::purchase_ticket))
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/:id", get(tickets::get_ticket))
        .route("/tickets/:id/reveal", post(tickets::reveal_tab))
        .route("/tickets/:id/reveal-all", post(tickets::reveal_all))
        .route("/tickets/:id/claim", post(tickets::claim_prize))
        .route("/wallet", get(wallet::get_wallet))
        .route("/wallet/ledger", get(wallet::get_ledger));

    let admin_routes = Router::new()
        .route(
            "/designs",
            get(admin::list_all_designs).post(admin::create_design),
        )
        .route("/designs/:id", put(admin::update_design))
        .route("/designs/:id/activate", post(admin::activate_design))
        .route("/designs/:id/deactivate", post(admin::deactivate_design))
        .route("/wallets/:player_id/credit", post(admin::credit_wallet));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api", player_routes.nest("/admin", admin_routes))
        .with_state(state)
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
}

/// CORS policy for browser clients.
///
/// An empty list rejects every cross-origin request; `*` allows any origin.
#[must_use]
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!(%origin, "Ignoring invalid CORS origin"))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-player-id"),
            HeaderName::from_static("x-admin-token"),
            HeaderName::from_static("x-correlation-id"),
        ])
        .expose_headers([HeaderName::from_static("x-correlation-id")])
}

/// Prometheus scrape endpoint.
///
/// # Endpoint
///
/// ```text
/// GET /metrics
/// ```
#[allow(clippy::unused_async)]
async fn metrics_handler(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .and_then(|recorder| recorder.render())
        .ok_or_else(|| AppError::unavailable("Metrics recorder not installed"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    async fn preflight(allowed: &[&str], origin: &str) -> Option<String> {
        let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        let app = Router::new()
            .route("/api/wallet", get(|| async {}))
            .layer(cors_layer(&allowed));

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/wallet")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-player-id")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|value| value.to_str().unwrap().to_string())
    }

    #[test]
    fn test_header_names_match_constants() {
        assert!(PLAYER_ID_HEADER.eq_ignore_ascii_case("x-player-id"));
        assert!(ADMIN_TOKEN_HEADER.eq_ignore_ascii_case("x-admin-token"));
        assert!(CORRELATION_ID_HEADER.eq_ignore_ascii_case("x-correlation-id"));
    }

    #[tokio::test]
    async fn test_cors_allows_listed_origin_only() {
        let allowed = ["https://play.example.com", "bad\norigin"];
        assert_eq!(
            preflight(&allowed, "https://play.example.com").await.as_deref(),
            Some("https://play.example.com")
        );
        assert_eq!(preflight(&allowed, "https://evil.example.com").await, None);
    }

    #[tokio::test]
    async fn test_cors_wildcard_allows_any_origin() {
        assert_eq!(
            preflight(&["*"], "https://anywhere.example.com").await.as_deref(),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_cors_empty_list_allows_nothing() {
        assert_eq!(preflight(&[], "https://play.example.com").await, None);
    }
}
