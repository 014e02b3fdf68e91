mod analysis;
mod config;
mod curriculum;
mod db;
mod errors;
mod extraction;
mod generation;
mod llm_client;
mod resources;
mod routes;
mod skills;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::curriculum::{CurriculumOrchestrator, GenerationLocks};
use crate::db::create_pool;
use crate::extraction::Extractor;
use crate::generation::GenerationAgent;
use crate::llm_client::LlmClient;
use crate::resources::{ResourceLookup, SemanticScholarClient};
use crate::routes::build_router;
use crate::state::AppState;

/// Slack between the pipeline deadline and the HTTP timeout, so the pipeline reports first.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Upskill API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Generation agent: template-only when no API key is configured
    let agent = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.generation_timeout)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            GenerationAgent::new(Arc::new(llm), config.agent_settings())
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; curriculum content will be templated");
            GenerationAgent::disabled(config.agent_settings())
        }
    };

    // Resource lookup (optional)
    let lookup: Option<Arc<dyn ResourceLookup>> = if config.enable_resource_lookup {
        let client = SemanticScholarClient::new(
            config.semantic_scholar_api_key.clone(),
            config.lookup_timeout,
        )?
        .with_base_url(config.semantic_scholar_url.clone());
        info!("Resource lookup enabled ({})", config.semantic_scholar_url);
        Some(Arc::new(client))
    } else {
        info!("Resource lookup disabled");
        None
    };

    // Build app state
    let state = AppState {
        db,
        extractor: Extractor::new(agent.clone()),
        orchestrator: CurriculumOrchestrator::new(agent, lookup, config.orchestrator_settings()),
        locks: GenerationLocks::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(config.request_timeout + HTTP_TIMEOUT_SLACK)),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
