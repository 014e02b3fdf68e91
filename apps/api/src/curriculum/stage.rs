//! Pipeline stages for curriculum generation and the checked transitions between them.
//!
//! START → FOUNDATION_GENERATED → (PROJECT_GENERATED →) ENRICHED → ASSEMBLED → DONE,
//! with FAILED reachable from every non-terminal stage.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Start,
    FoundationGenerated,
    ProjectGenerated,
    Enriched,
    Assembled,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    pub fn can_transition_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Start, FoundationGenerated)
            | (FoundationGenerated, ProjectGenerated)
            | (FoundationGenerated, Enriched)
            | (ProjectGenerated, Enriched)
            | (Enriched, Assembled)
            | (Assembled, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Start => "START",
            PipelineStage::FoundationGenerated => "FOUNDATION_GENERATED",
            PipelineStage::ProjectGenerated => "PROJECT_GENERATED",
            PipelineStage::Enriched => "ENRICHED",
            PipelineStage::Assembled => "ASSEMBLED",
            PipelineStage::Done => "DONE",
            PipelineStage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum FailureKind {
    #[error("generation exhausted: {0}")]
    GenerationExhausted(String),

    #[error("request deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("invalid project brief: {0}")]
    InvalidBrief(String),

    #[error("illegal stage transition {from} -> {to}")]
    InvalidTransition {
        from: PipelineStage,
        to: PipelineStage,
    },
}

/// A failed pipeline run: what went wrong and the stage it was in.
#[derive(Debug, Error)]
#[error("curriculum generation failed during {stage}: {kind}")]
pub struct CurriculumError {
    pub kind: FailureKind,
    pub stage: PipelineStage,
}

impl CurriculumError {
    /// Whether the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::GenerationExhausted(_) | FailureKind::DeadlineExceeded(_)
        )
    }
}

/// Current stage of one pipeline run.
///
/// Lives outside the pipeline future so the stage is still readable after a deadline
/// drops that future.
pub struct StageTracker {
    analysis_id: Uuid,
    stage: Mutex<PipelineStage>,
}

impl StageTracker {
    pub fn new(analysis_id: Uuid) -> Self {
        Self {
            analysis_id,
            stage: Mutex::new(PipelineStage::Start),
        }
    }

    pub fn current(&self) -> PipelineStage {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// An illegal transition fails the run.
    pub fn advance(&self, next: PipelineStage) -> Result<(), CurriculumError> {
        let mut stage = self.stage.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *stage;
        if !from.can_transition_to(next) {
            drop(stage);
            return Err(self.fail(FailureKind::InvalidTransition { from, to: next }));
        }
        *stage = next;
        info!("Curriculum for analysis {}: {} -> {}", self.analysis_id, from, next);
        Ok(())
    }

    /// Moves to FAILED and returns the error, tagged with the stage that failed.
    pub fn fail(&self, kind: FailureKind) -> CurriculumError {
        let mut stage = self.stage.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *stage;
        if from.can_transition_to(PipelineStage::Failed) {
            *stage = PipelineStage::Failed;
        }
        warn!(
            "Curriculum for analysis {} failed during {}: {}",
            self.analysis_id, from, kind
        );
        CurriculumError { kind, stage: from }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineStage::*;

    #[test]
    fn test_happy_paths_are_allowed() {
        let flat = [Start, FoundationGenerated, Enriched, Assembled, Done];
        let phased = [Start, FoundationGenerated, ProjectGenerated, Enriched, Assembled, Done];
        for path in [&flat[..], &phased[..]] {
            for pair in path.windows(2) {
                assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn test_skipping_stages_is_rejected() {
        assert!(!Start.can_transition_to(Enriched));
        assert!(!FoundationGenerated.can_transition_to(Assembled));
        assert!(!ProjectGenerated.can_transition_to(FoundationGenerated));
    }

    #[test]
    fn test_failed_reachable_only_from_non_terminal() {
        for stage in [Start, FoundationGenerated, ProjectGenerated, Enriched, Assembled] {
            assert!(stage.can_transition_to(Failed));
        }
        assert!(!Done.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn test_illegal_transition_fails_tracker() {
        let tracker = StageTracker::new(Uuid::new_v4());
        let err = tracker.advance(Assembled).unwrap_err();
        assert!(matches!(
            err.kind,
            FailureKind::InvalidTransition { from: Start, to: Assembled }
        ));
        assert_eq!(err.stage, Start);
        assert!(!err.is_retryable());
        assert_eq!(tracker.current(), Failed);
        assert!(tracker.advance(FoundationGenerated).is_err());
    }

    #[test]
    fn test_tracker_fail_records_stage() {
        let tracker = StageTracker::new(Uuid::new_v4());
        tracker.advance(FoundationGenerated).unwrap();
        let err = tracker.fail(FailureKind::DeadlineExceeded(Duration::from_secs(1)));
        assert_eq!(err.stage, FoundationGenerated);
        assert!(err.is_retryable());
        assert_eq!(tracker.current(), Failed);
    }
}
