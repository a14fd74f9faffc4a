use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::evaluation::pipeline::Evaluator;
use crate::scoring::config::ScoringConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub evaluator: Evaluator,
    /// Active scoring config. Handlers copy it once per request; settings updates
    /// replace it wholesale and never affect evaluations already in flight.
    pub active_scoring: Arc<RwLock<ScoringConfig>>,
}

impl AppState {
    pub fn new(db: PgPool, evaluator: Evaluator, scoring: ScoringConfig) -> Self {
        Self {
            db,
            evaluator,
            active_scoring: Arc::new(RwLock::new(scoring)),
        }
    }

    pub async fn scoring_snapshot(&self) -> ScoringConfig {
        *self.active_scoring.read().await
    }
}
