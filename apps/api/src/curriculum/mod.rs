// Curriculum generation: stages, generation shapes, enrichment and the orchestrator
// that ties them together.

pub mod drafts;
pub mod enrichment;
pub mod handlers;
pub mod locks;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod stage;

pub use locks::GenerationLocks;
pub use models::{ProjectBrief, TrainingProgram};
pub use orchestrator::{CurriculumOrchestrator, OrchestratorSettings};
pub use stage::{CurriculumError, FailureKind};
