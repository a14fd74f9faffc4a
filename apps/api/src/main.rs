mod config;
mod db;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod parsing;
mod routes;
mod scoring;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::evaluation::pipeline::Evaluator;
use crate::llm_client::{Embedder, EmbeddingClient, LanguageModel, LlmClient};
use crate::routes::build_router;
use crate::scoring::signals::ExternalSignalAdapter;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Relevance API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // External collaborators are optional; each missing one degrades to its local fallback
    let model: Option<Arc<dyn LanguageModel>> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), config.external_timeout)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(client))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; fit analysis and feedback use local fallbacks");
            None
        }
    };

    let embedder: Option<Arc<dyn Embedder>> = match &config.embedding_api_key {
        Some(key) => {
            let client = EmbeddingClient::new(
                config.embedding_api_url.clone(),
                key.clone(),
                config.embedding_model.clone(),
                config.external_timeout,
            )?;
            info!("Embedding client initialized (model: {})", config.embedding_model);
            Some(Arc::new(client))
        }
        None => {
            warn!("EMBEDDING_API_KEY not set; semantic similarity uses token overlap");
            None
        }
    };

    let signals = ExternalSignalAdapter::new(model, embedder, config.external_timeout);
    let evaluator = Evaluator::with_regex_parsers(signals);

    let scoring = config.startup_scoring();
    info!(
        "Scoring config: weights={:?} thresholds={:?}",
        scoring.weights, scoring.thresholds
    );

    // Build app state
    let state = AppState::new(db, evaluator, scoring);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
