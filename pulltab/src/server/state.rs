//! Application state shared across all HTTP handlers.

use crate::api::AdminToken;
use crate::server::PgProbe;
use crate::service::PullTabService;
use axum::extract::FromRef;
use pulltab_runtime::metrics::MetricsRecorder;
use pulltab_web::ReadinessProbe;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cheap to clone: the service holds a pooled connection handle and
/// everything else sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Ticket, wallet and design operations
    pub service: PullTabService,
    /// Secret expected on admin routes
    pub admin_token: AdminToken,
    /// Dependency probe behind `/ready`
    pub probe: Arc<dyn ReadinessProbe>,
    /// Prometheus recorder behind `/metrics`, absent when not installed
    pub metrics: Option<Arc<MetricsRecorder>>,
}

impl AppState {
    /// Build state around a service, probing the service's own pool.
    #[must_use]
    pub fn new(service: PullTabService, admin_token: AdminToken) -> Self {
        let probe: Arc<dyn ReadinessProbe> = Arc::new(PgProbe::new(service.pool().clone()));
        Self {
            service,
            admin_token,
            probe,
            metrics: None,
        }
    }

    /// Expose the given recorder on `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, recorder: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(recorder);
        self
    }
}

impl FromRef<AppState> for AdminToken {
    fn from_ref(state: &AppState) -> Self {
        state.admin_token.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ReadinessProbe> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.probe)
    }
}
