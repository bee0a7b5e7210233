use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::embedding::sentence::SentenceEncoder;
use crate::embedding::skill_space::SkillSpace;
use crate::llm_client::LlmClient;
use crate::search::VectorIndex;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The skill space and sentence encoder are loaded once at startup and are
/// read-only thereafter, so they are shared without locking.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub skill_space: Arc<SkillSpace>,
    pub encoder: Arc<dyn SentenceEncoder>,
    pub index: Arc<dyn VectorIndex>,
    pub config: Config,
}
