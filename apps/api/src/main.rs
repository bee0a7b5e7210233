mod config;
mod cv;
mod db;
mod embedding;
mod errors;
mod extract;
mod feedback;
mod jd;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod scoring;
mod search;
mod state;
mod vocab;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::sentence::HttpSentenceEncoder;
use crate::embedding::skill_space::SkillSpace;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::search::HttpVectorIndex;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Placements API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Load the offline-trained skill vectors (read-only shared state)
    let skill_space = Arc::new(SkillSpace::load(Path::new(&config.skill_vectors_path))?);
    info!(
        "Skill space loaded: {} tokens, {} dims",
        skill_space.len(),
        skill_space.dim()
    );

    // Sentence encoder (remote embeddings endpoint)
    let encoder = Arc::new(HttpSentenceEncoder::new(
        config.embeddings_url.clone(),
        config.embeddings_model.clone(),
        config.embeddings_api_key.clone(),
    ));
    info!("Sentence encoder initialized (model: {})", config.embeddings_model);

    // Vector index collaborator
    let index = Arc::new(HttpVectorIndex::new(
        config.vector_index_url.clone(),
        config.vector_index_api_key.clone(),
    ));
    info!("Vector index client initialized");

    // Narrative-feedback LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        db,
        llm,
        skill_space,
        encoder,
        index,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
