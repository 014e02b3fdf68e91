//! Curriculum Orchestrator: turns a gap analysis into a training program.
//!
//! Runs an explicit sequence of stages (see `stage.rs`): foundation modules for every
//! gap, optional project phases and milestones, best-effort enrichment, then assembly.
//! The whole run sits under a request deadline; the stage tracker lives outside the
//! deadline so a timed-out run still reports where it stopped.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::info;
use uuid::Uuid;

use crate::analysis::GapAnalysis;
use crate::curriculum::drafts::{
    gap_summary, milestones_prompt, module_prompt, orientation_module, phases_prompt,
    MilestoneContext, MilestonesDraft, ModuleContext, ModuleDraft, PhasesDraft, ProjectContext,
};
use crate::curriculum::enrichment::{enrich, Enrichment, EnrichmentSettings};
use crate::curriculum::models::{
    duration_label, Module, Phase, ProgramLayout, ProjectBrief, TrainingProgram,
};
use crate::curriculum::stage::{CurriculumError, FailureKind, PipelineStage, StageTracker};
use crate::generation::{GenerationAgent, GenerationError};
use crate::resources::ResourceLookup;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Foundation modules generated, and resource lookups issued, at once.
    pub concurrency: usize,
    pub lookup_timeout: Duration,
    pub resources_per_skill: usize,
    /// Deadline for a whole pipeline run.
    pub request_timeout: Duration,
    pub hours_per_week: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            lookup_timeout: Duration::from_secs(30),
            resources_per_skill: 3,
            request_timeout: Duration::from_secs(300),
            hours_per_week: 10,
        }
    }
}

#[derive(Clone)]
pub struct CurriculumOrchestrator {
    agent: GenerationAgent,
    lookup: Option<Arc<dyn ResourceLookup>>,
    settings: OrchestratorSettings,
}

impl CurriculumOrchestrator {
    pub fn new(
        agent: GenerationAgent,
        lookup: Option<Arc<dyn ResourceLookup>>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            agent,
            lookup,
            settings,
        }
    }

    /// Gap-only program: a flat list of modules.
    pub async fn generate_foundation_program(
        &self,
        analysis: &GapAnalysis,
    ) -> Result<TrainingProgram, CurriculumError> {
        let tracker = StageTracker::new(analysis.id);
        self.execute(&tracker, analysis, None).await
    }

    /// Program for a specific project: foundation phase, project phases and milestones.
    pub async fn generate_project_program(
        &self,
        analysis: &GapAnalysis,
        brief: &ProjectBrief,
    ) -> Result<TrainingProgram, CurriculumError> {
        let tracker = StageTracker::new(analysis.id);
        self.execute(&tracker, analysis, Some(brief)).await
    }

    async fn execute(
        &self,
        tracker: &StageTracker,
        analysis: &GapAnalysis,
        brief: Option<&ProjectBrief>,
    ) -> Result<TrainingProgram, CurriculumError> {
        if let Some(Err(reason)) = brief.map(ProjectBrief::validate) {
            return Err(tracker.fail(FailureKind::InvalidBrief(reason)));
        }

        let deadline = self.settings.request_timeout;
        match tokio::time::timeout(deadline, self.run_stages(tracker, analysis, brief)).await {
            Ok(result) => result,
            Err(_) => Err(tracker.fail(FailureKind::DeadlineExceeded(deadline))),
        }
    }

    async fn run_stages(
        &self,
        tracker: &StageTracker,
        analysis: &GapAnalysis,
        brief: Option<&ProjectBrief>,
    ) -> Result<TrainingProgram, CurriculumError> {
        let exhausted =
            |e: GenerationError| tracker.fail(FailureKind::GenerationExhausted(e.to_string()));

        let modules = self.foundation(analysis).await.map_err(exhausted)?;
        tracker.advance(PipelineStage::FoundationGenerated)?;

        let layout = match brief {
            Some(brief) => {
                let layout = self.project(analysis, brief, modules).await.map_err(exhausted)?;
                tracker.advance(PipelineStage::ProjectGenerated)?;
                layout
            }
            None => ProgramLayout::Flat { modules },
        };

        let settings = EnrichmentSettings {
            resources_per_skill: self.settings.resources_per_skill,
            lookup_timeout: self.settings.lookup_timeout,
            concurrency: self.settings.concurrency,
        };
        let enrichment = enrich(self.lookup.clone(), analysis, brief, &settings).await;
        tracker.advance(PipelineStage::Enriched)?;

        let program = assemble(analysis, brief, layout, enrichment, self.settings.hours_per_week);
        tracker.advance(PipelineStage::Assembled)?;

        info!(
            "Training program {} for analysis {}: {} hours, {} templated module(s)",
            program.id,
            analysis.id,
            program.estimated_hours,
            program.templated_module_count()
        );
        tracker.advance(PipelineStage::Done)?;
        Ok(program)
    }

    /// One module per gap, in rank order.
    async fn foundation(&self, analysis: &GapAnalysis) -> Result<Vec<Module>, GenerationError> {
        if !analysis.has_gaps() {
            return Ok(vec![orientation_module(
                &analysis.job.title,
                analysis.job.domain.as_deref(),
            )]);
        }

        // Owned contexts keep each task free of borrows into the analysis.
        let contexts: Vec<(u32, ModuleContext)> = analysis
            .gaps
            .iter()
            .enumerate()
            .map(|(i, gap)| (gap.priority_rank, ModuleContext::for_gap(analysis, gap, i + 1)))
            .collect();

        let agent = self.agent.clone();
        let results: Vec<Result<(u32, Module), GenerationError>> = stream::iter(contexts)
            .map(move |(rank, ctx)| {
                let agent = agent.clone();
                async move {
                    let prompt = module_prompt(&ctx);
                    let module = agent.generate_or_template::<ModuleDraft>(&prompt, &ctx).await?;
                    Ok::<_, GenerationError>((rank, module.value))
                }
            })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let mut ranked = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        ranked.sort_by_key(|(rank, _)| *rank);
        Ok(ranked.into_iter().map(|(_, module)| module).collect())
    }

    async fn project(
        &self,
        analysis: &GapAnalysis,
        brief: &ProjectBrief,
        foundation: Vec<Module>,
    ) -> Result<ProgramLayout, GenerationError> {
        let mut phases = vec![Phase::new(
            1,
            "Foundations".to_string(),
            format!("Skill gaps to close for the {} role", analysis.job.title),
            foundation,
        )];

        let ctx = ProjectContext::new(analysis, brief);
        let project_phases = self
            .agent
            .generate_or_template::<PhasesDraft>(&phases_prompt(&ctx), &ctx)
            .await?;
        phases.extend(project_phases.value);

        let ctx = MilestoneContext::new(brief, &phases, self.settings.hours_per_week);
        let milestones = self
            .agent
            .generate_or_template::<MilestonesDraft>(&milestones_prompt(&ctx), &ctx)
            .await?
            .value;

        Ok(ProgramLayout::Phased { phases, milestones })
    }
}

fn assemble(
    analysis: &GapAnalysis,
    brief: Option<&ProjectBrief>,
    layout: ProgramLayout,
    enrichment: Enrichment,
    hours_per_week: u32,
) -> TrainingProgram {
    let job = &analysis.job;
    let in_domain = job
        .domain
        .as_deref()
        .map(|d| format!(" in {d}"))
        .unwrap_or_default();

    let mut title = if analysis.has_gaps() {
        format!("Training Program for {}{}", job.title, in_domain)
    } else {
        format!("Orientation Program for {}", job.title)
    };
    let mut description = if analysis.has_gaps() {
        format!(
            "Training program to bridge skill gaps for the {} role{}: {}.",
            job.title,
            in_domain,
            gap_summary(analysis)
        )
    } else {
        format!("No skill gaps were found; an introduction to the {} role{}.", job.title, in_domain)
    };
    if let (Some(brief), ProgramLayout::Phased { phases, .. }) = (brief, &layout) {
        title = format!("{title}: {}", brief.name.trim());
        description.push_str(&format!(
            " Followed by {} project phase(s) preparing for {} as {}.",
            phases.len().saturating_sub(1),
            brief.name.trim(),
            brief.role()
        ));
    }

    let mut seen = HashSet::new();
    let learning_objectives = layout
        .modules()
        .flat_map(|m| m.learning_objectives.iter())
        .filter(|objective| seen.insert(objective.as_str()))
        .cloned()
        .collect();

    let estimated_hours = layout.estimated_hours();
    TrainingProgram {
        id: Uuid::new_v4(),
        gap_analysis_id: analysis.id,
        title,
        description,
        estimated_hours,
        duration_label: duration_label(estimated_hours, hours_per_week),
        layout,
        learning_objectives,
        case_studies: enrichment.case_studies,
        resources: enrichment.resources,
        project: brief.cloned(),
        created_at: Utc::now(),
    }
}
