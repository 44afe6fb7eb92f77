//! Database readiness probe for `GET /ready`.

use async_trait::async_trait;
use pulltab_web::ReadinessProbe;
use sqlx::PgPool;

/// Pings `PostgreSQL` through the service pool.
#[derive(Clone)]
pub struct PgProbe {
    pool: PgPool,
}

impl PgProbe {
    /// Probe the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadinessProbe for PgProbe {
    fn component(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), String> {
        pulltab_postgres::ping(&self.pool)
            .await
            .map_err(|e| e.to_string())
    }
}
