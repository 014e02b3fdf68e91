use sqlx::PgPool;

use crate::config::Config;
use crate::curriculum::{CurriculumOrchestrator, GenerationLocks};
use crate::extraction::Extractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub extractor: Extractor,
    pub orchestrator: CurriculumOrchestrator,
    /// Serializes program generation per gap analysis.
    pub locks: GenerationLocks,
    pub config: Config,
}
