use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails with context if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    /// OpenAI-compatible embeddings endpoint used for sentence encoding.
    pub embeddings_url: String,
    pub embeddings_model: String,
    pub embeddings_api_key: String,
    /// Base URL of the vector index collaborator (Pinecone-style REST).
    pub vector_index_url: String,
    pub vector_index_api_key: String,
    /// Path to the offline-trained skill vectors (word2vec text format).
    pub skill_vectors_path: String,
    /// Concurrency bound for narrative-feedback LLM calls.
    pub llm_concurrency: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            embeddings_url: require_env("EMBEDDINGS_URL")?,
            embeddings_model: std::env::var("EMBEDDINGS_MODEL")
                .unwrap_or_else(|_| "all-MiniLM-L6-v2".to_string()),
            embeddings_api_key: require_env("EMBEDDINGS_API_KEY")?,
            vector_index_url: require_env("VECTOR_INDEX_URL")?,
            vector_index_api_key: require_env("VECTOR_INDEX_API_KEY")?,
            skill_vectors_path: std::env::var("SKILL_VECTORS_PATH")
                .unwrap_or_else(|_| "trained_skill2vec.txt".to_string()),
            llm_concurrency: std::env::var("LLM_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()
                .context("LLM_CONCURRENCY must be a positive integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
