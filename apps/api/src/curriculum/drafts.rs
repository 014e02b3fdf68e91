//! Generation shapes for curriculum content, with their deterministic templates.
//!
//! Templates use only caller context (skill, role, project brief), so a program can
//! always be assembled even when generation is unavailable.

use serde::Deserialize;

use crate::analysis::{GapAnalysis, GapRecord, Importance};
use crate::curriculum::models::{
    duration_label, ContentSection, Difficulty, Exercise, Milestone, Module, Phase, ProjectBrief,
};
use crate::curriculum::prompts::{
    MILESTONES_PROMPT_TEMPLATE, MILESTONES_SYSTEM, MODULE_PROMPT_TEMPLATE, MODULE_SYSTEM,
    PHASES_PROMPT_TEMPLATE, PHASES_SYSTEM,
};
use crate::generation::shape::{clean_list, require_text};
use crate::generation::{ContentOrigin, ExpectedShape, PromptContext, ShapeViolation, Templated};
use crate::llm_client::prompts::{clip, CONTEXT_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::skills::{join_labels, normalize, Skill};

/// Upper bound on hours for a single generated module.
const MAX_MODULE_HOURS: u32 = 80;
const MAX_PROJECT_PHASES: usize = 6;
const MAX_STACK_MODULES: usize = 6;
/// Number of the first project phase; phase 1 holds the foundation modules.
pub const FIRST_PROJECT_PHASE: u32 = 2;

fn system_prompt(role: &str) -> String {
    format!("{role}\n{JSON_ONLY_SYSTEM}")
}

fn or_general(domain: Option<&str>) -> &str {
    domain.filter(|d| !d.trim().is_empty()).unwrap_or("general")
}

fn or_none(list: &[String]) -> String {
    if list.is_empty() {
        "none".to_string()
    } else {
        list.join(", ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Module drafts
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SectionDraft {
    #[serde(alias = "section")]
    heading: String,
    #[serde(alias = "content")]
    body: String,
}

#[derive(Debug, Deserialize)]
struct ExerciseDraft {
    title: String,
    #[serde(default)]
    description: String,
}

/// A module as the model writes it.
#[derive(Debug, Deserialize)]
pub struct ModuleDraft {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    learning_objectives: Vec<String>,
    #[serde(default, alias = "content")]
    content_sections: Vec<SectionDraft>,
    #[serde(default, alias = "practical_exercises")]
    exercises: Vec<ExerciseDraft>,
    #[serde(default)]
    estimated_hours: Option<f64>,
    #[serde(default)]
    difficulty: Option<String>,
}

impl ModuleDraft {
    fn into_module(
        self,
        shape: &'static str,
        skill: Option<Skill>,
        fallback: Difficulty,
    ) -> Result<Module, ShapeViolation> {
        let title = require_text(shape, "title", &self.title)?;
        let learning_objectives = clean_list(self.learning_objectives);
        if learning_objectives.is_empty() {
            return Err(ShapeViolation::new(
                shape,
                format!("module '{title}' has no learning objectives"),
            ));
        }

        let difficulty = self
            .difficulty
            .as_deref()
            .and_then(Difficulty::parse)
            .unwrap_or(fallback);
        let estimated_hours = self
            .estimated_hours
            .filter(|h| h.is_finite() && *h > 0.0)
            .map(|h| (h.round() as u32).clamp(1, MAX_MODULE_HOURS))
            .unwrap_or_else(|| difficulty.default_hours());
        let description = match self.description.trim() {
            "" => title.clone(),
            text => text.to_string(),
        };

        Ok(Module {
            title,
            description,
            learning_objectives,
            content_sections: self
                .content_sections
                .into_iter()
                .filter(|s| !s.heading.trim().is_empty() && !s.body.trim().is_empty())
                .map(|s| ContentSection {
                    heading: s.heading.trim().to_string(),
                    body: s.body.trim().to_string(),
                })
                .collect(),
            exercises: self
                .exercises
                .into_iter()
                .filter(|e| !e.title.trim().is_empty())
                .map(|e| Exercise {
                    title: e.title.trim().to_string(),
                    description: e.description.trim().to_string(),
                })
                .collect(),
            estimated_hours,
            difficulty,
            phase: None,
            skill,
            origin: ContentOrigin::Generated,
        })
    }
}

/// Everything a foundation module is built from.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    /// 1-based position in rank order.
    pub position: usize,
    pub skill: Skill,
    pub importance: Importance,
    pub reason: String,
    pub job_title: String,
    pub domain: Option<String>,
    pub existing_skills: Vec<String>,
}

impl ModuleContext {
    pub fn for_gap(analysis: &GapAnalysis, gap: &GapRecord, position: usize) -> Self {
        Self {
            position,
            skill: gap.skill.clone(),
            importance: gap.importance,
            reason: gap.reason.clone(),
            job_title: analysis.job.title.clone(),
            domain: analysis.job.domain.clone(),
            existing_skills: analysis.profile.skills.iter().map(|s| s.label.clone()).collect(),
        }
    }

    fn domain(&self) -> &str {
        or_general(self.domain.as_deref())
    }
}

pub fn module_prompt(ctx: &ModuleContext) -> PromptContext {
    let importance = match ctx.importance {
        Importance::Critical => "critical",
        Importance::Important => "important",
        Importance::Normal => "normal",
    };
    let prompt = MODULE_PROMPT_TEMPLATE
        .replace("{skill}", &ctx.skill.label)
        .replace("{importance}", importance)
        .replace("{reason}", &ctx.reason)
        .replace("{job_title}", &ctx.job_title)
        .replace("{domain}", ctx.domain())
        .replace("{existing_skills}", &or_none(&ctx.existing_skills))
        .replace("{context_instruction}", CONTEXT_INSTRUCTION);
    PromptContext::new(system_prompt(MODULE_SYSTEM), prompt)
}

impl ExpectedShape for ModuleDraft {
    const NAME: &'static str = "module";
    type Context = ModuleContext;
    type Output = Module;

    fn adapt(self, ctx: &ModuleContext) -> Result<Module, ShapeViolation> {
        self.into_module(
            Self::NAME,
            Some(ctx.skill.clone()),
            Difficulty::for_importance(ctx.importance),
        )
    }
}

impl Templated for ModuleDraft {
    fn template(ctx: &ModuleContext) -> Module {
        let skill = &ctx.skill.label;
        let domain = ctx.domain();
        let difficulty = Difficulty::for_importance(ctx.importance);
        Module {
            title: format!("Module {}: {}", ctx.position, skill),
            description: format!("Learn {skill} for the {} role in {domain}", ctx.job_title),
            learning_objectives: vec![
                format!("Understand the fundamentals of {skill}"),
                format!("Apply {skill} in {domain} contexts"),
                format!("Practice {skill} through hands-on exercises"),
            ],
            content_sections: vec![
                ContentSection {
                    heading: "Introduction".to_string(),
                    body: format!(
                        "Introduction to {skill} and its relevance to the {} role in {domain}",
                        ctx.job_title
                    ),
                },
                ContentSection {
                    heading: "Core Concepts".to_string(),
                    body: format!("Deep dive into {skill} concepts and methodologies"),
                },
                ContentSection {
                    heading: "Practical Application".to_string(),
                    body: format!("Applying {skill} to real-world {domain} scenarios"),
                },
            ],
            exercises: vec![
                Exercise {
                    title: format!("Exercise 1: {skill} Basics"),
                    description: format!("Hands-on exercise to practice {skill} fundamentals"),
                },
                Exercise {
                    title: format!("Exercise 2: {skill} in {domain}"),
                    description: format!("Apply {skill} to a {domain}-specific problem"),
                },
            ],
            estimated_hours: difficulty.default_hours(),
            difficulty,
            phase: None,
            skill: Some(ctx.skill.clone()),
            origin: ContentOrigin::Templated,
        }
    }
}

/// The single module used when an analysis has no gaps.
pub fn orientation_module(job_title: &str, domain: Option<&str>) -> Module {
    let domain = or_general(domain);
    Module {
        title: "Role Introduction".to_string(),
        description: format!("Introduction to {job_title} responsibilities in {domain}"),
        learning_objectives: vec![
            format!("Understand the expectations of the {job_title} role"),
            format!("Familiarize yourself with {domain} practices"),
        ],
        content_sections: vec![ContentSection {
            heading: "Overview".to_string(),
            body: format!("How the {job_title} role fits into day-to-day {domain} work"),
        }],
        exercises: vec![Exercise {
            title: "Meet the team".to_string(),
            description: "Shadow a colleague and write down the tools and processes they rely on"
                .to_string(),
        }],
        estimated_hours: Difficulty::Beginner.default_hours(),
        difficulty: Difficulty::Beginner,
        phase: None,
        skill: None,
        origin: ContentOrigin::Templated,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Project phases
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub brief: ProjectBrief,
    pub job_title: String,
    pub domain: Option<String>,
    /// Labels of the gaps the foundation phase covers.
    pub residual_gaps: Vec<String>,
}

impl ProjectContext {
    pub fn new(analysis: &GapAnalysis, brief: &ProjectBrief) -> Self {
        Self {
            brief: brief.clone(),
            job_title: analysis.job.title.clone(),
            domain: analysis.job.domain.clone(),
            residual_gaps: analysis.gap_skills().map(|s| s.label.clone()).collect(),
        }
    }
}

pub fn phases_prompt(ctx: &ProjectContext) -> PromptContext {
    let brief = &ctx.brief;
    let prompt = PHASES_PROMPT_TEMPLATE
        .replace("{project_name}", &brief.name)
        .replace("{project_description}", clip(&brief.description))
        .replace("{team_role}", brief.role())
        .replace("{organization}", brief.organization.as_deref().unwrap_or("not specified"))
        .replace("{tech_stack}", &or_none(&brief.tech_stack))
        .replace("{goals}", &or_none(&brief.goals))
        .replace("{timeline}", brief.timeline.as_deref().unwrap_or("not specified"))
        .replace("{job_title}", &ctx.job_title)
        .replace("{domain}", or_general(ctx.domain.as_deref()))
        .replace("{gaps}", &or_none(&ctx.residual_gaps))
        .replace("{context_instruction}", CONTEXT_INSTRUCTION);
    PromptContext::new(system_prompt(PHASES_SYSTEM), prompt)
}

#[derive(Debug, Deserialize)]
struct PhaseDraft {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    modules: Vec<ModuleDraft>,
}

#[derive(Debug, Deserialize)]
pub struct PhasesDraft {
    phases: Vec<PhaseDraft>,
}

impl ExpectedShape for PhasesDraft {
    const NAME: &'static str = "project_phases";
    type Context = ProjectContext;
    type Output = Vec<Phase>;

    fn adapt(self, _ctx: &ProjectContext) -> Result<Vec<Phase>, ShapeViolation> {
        if self.phases.is_empty() {
            return Err(ShapeViolation::new(Self::NAME, "no phases"));
        }
        self.phases
            .into_iter()
            .take(MAX_PROJECT_PHASES)
            .zip(FIRST_PROJECT_PHASE..)
            .map(|(draft, number)| {
                let name = require_text(Self::NAME, "phase name", &draft.name)?;
                if draft.modules.is_empty() {
                    return Err(ShapeViolation::new(
                        Self::NAME,
                        format!("phase '{name}' has no modules"),
                    ));
                }
                let modules = draft
                    .modules
                    .into_iter()
                    .map(|m| m.into_module(Self::NAME, None, Difficulty::Intermediate))
                    .collect::<Result<Vec<_>, _>>()?;
                let description = match draft.description.trim() {
                    "" => name.clone(),
                    text => text.to_string(),
                };
                Ok(Phase::new(number, name, description, modules))
            })
            .collect()
    }
}

impl Templated for PhasesDraft {
    fn template(ctx: &ProjectContext) -> Vec<Phase> {
        let brief = &ctx.brief;
        let project = brief.name.trim();
        let domain = or_general(ctx.domain.as_deref());

        let mut stack_modules: Vec<Module> = brief
            .tech_stack
            .iter()
            .filter(|t| !t.trim().is_empty())
            .take(MAX_STACK_MODULES)
            .map(|tech| stack_module(tech.trim(), project))
            .collect();
        if stack_modules.is_empty() {
            stack_modules.push(architecture_module(brief, domain));
        }

        vec![
            Phase::new(
                FIRST_PROJECT_PHASE,
                "Project Technology".to_string(),
                format!("Hands-on with the tools {project} is built on"),
                stack_modules,
            ),
            Phase::new(
                FIRST_PROJECT_PHASE + 1,
                "Project Delivery".to_string(),
                format!("Contributing to {project} as {}", brief.role()),
                vec![delivery_module(brief)],
            ),
        ]
    }
}

fn stack_module(tech: &str, project: &str) -> Module {
    let skill = normalize(tech);
    let label = skill.label.clone();
    Module {
        title: format!("{label} for {project}"),
        description: format!("How {project} uses {label}, and how to work with it day to day"),
        learning_objectives: vec![
            format!("Set up a working {label} environment for {project}"),
            format!("Understand how {label} fits into the {project} architecture"),
        ],
        content_sections: vec![
            ContentSection {
                heading: "Setup".to_string(),
                body: format!("Installing and configuring {label} the way {project} expects"),
            },
            ContentSection {
                heading: "In the Project".to_string(),
                body: format!("Walkthrough of where {project} depends on {label}"),
            },
        ],
        exercises: vec![Exercise {
            title: format!("Exercise: {label} in {project}"),
            description: format!("Reproduce one {project} workflow that relies on {label}"),
        }],
        estimated_hours: Difficulty::Intermediate.default_hours(),
        difficulty: Difficulty::Intermediate,
        phase: None,
        skill: Some(skill),
        origin: ContentOrigin::Templated,
    }
}

fn architecture_module(brief: &ProjectBrief, domain: &str) -> Module {
    let project = brief.name.trim();
    Module {
        title: format!("Project Architecture: {project}"),
        description: format!("The structure of {project} and the {domain} problem it solves"),
        learning_objectives: vec![
            format!("Describe the main components of {project}"),
            format!("Explain the {domain} problem {project} addresses"),
        ],
        content_sections: vec![ContentSection {
            heading: "Overview".to_string(),
            body: clip(brief.description.trim()).to_string(),
        }],
        exercises: vec![Exercise {
            title: "Map the system".to_string(),
            description: format!("Draw a component diagram of {project}"),
        }],
        estimated_hours: Difficulty::Beginner.default_hours(),
        difficulty: Difficulty::Beginner,
        phase: None,
        skill: None,
        origin: ContentOrigin::Templated,
    }
}

fn delivery_module(brief: &ProjectBrief) -> Module {
    let project = brief.name.trim();
    let role = brief.role();
    let mut objectives: Vec<String> = clean_list(brief.goals.clone())
        .into_iter()
        .take(5)
        .map(|goal| format!("Contribute to: {goal}"))
        .collect();
    if objectives.is_empty() {
        objectives.push(format!("Deliver a first contribution to {project}"));
    }
    objectives.push(format!("Work effectively as {role} within the {project} team"));

    Module {
        title: format!("Contributing as {role} on {project}"),
        description: format!("Putting the earlier phases to work on {project}"),
        learning_objectives: objectives,
        content_sections: vec![ContentSection {
            heading: "Ways of Working".to_string(),
            body: format!(
                "Review, release and communication practices on {project}{}",
                brief
                    .organization
                    .as_deref()
                    .map(|o| format!(" at {o}"))
                    .unwrap_or_default()
            ),
        }],
        exercises: vec![Exercise {
            title: "First contribution".to_string(),
            description: format!("Pick a small {project} task, ship it and get it reviewed"),
        }],
        estimated_hours: Difficulty::Intermediate.default_hours(),
        difficulty: Difficulty::Intermediate,
        phase: None,
        skill: None,
        origin: ContentOrigin::Templated,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Milestones
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PhaseSummary {
    pub number: u32,
    pub name: String,
    pub estimated_hours: u32,
}

#[derive(Debug, Clone)]
pub struct MilestoneContext {
    pub project_name: String,
    pub team_role: String,
    pub phases: Vec<PhaseSummary>,
    pub hours_per_week: u32,
}

impl MilestoneContext {
    pub fn new(brief: &ProjectBrief, phases: &[Phase], hours_per_week: u32) -> Self {
        Self {
            project_name: brief.name.trim().to_string(),
            team_role: brief.role().to_string(),
            phases: phases
                .iter()
                .map(|p| PhaseSummary {
                    number: p.number,
                    name: p.name.clone(),
                    estimated_hours: p.estimated_hours,
                })
                .collect(),
            hours_per_week: hours_per_week.max(1),
        }
    }

    fn weeks_for(&self, hours: u32) -> u32 {
        hours.div_ceil(self.hours_per_week).max(1)
    }

    pub fn total_weeks(&self) -> u32 {
        self.weeks_for(self.phases.iter().map(|p| p.estimated_hours).sum())
    }
}

pub fn milestones_prompt(ctx: &MilestoneContext) -> PromptContext {
    let phases = ctx
        .phases
        .iter()
        .map(|p| {
            format!(
                "- Phase {}: {} ({})",
                p.number,
                p.name,
                duration_label(p.estimated_hours, ctx.hours_per_week)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = MILESTONES_PROMPT_TEMPLATE
        .replace("{project_name}", &ctx.project_name)
        .replace("{total_weeks}", &ctx.total_weeks().to_string())
        .replace("{phases}", &phases);
    PromptContext::new(system_prompt(MILESTONES_SYSTEM), prompt)
}

#[derive(Debug, Deserialize)]
struct MilestoneDraft {
    week: u32,
    label: String,
    #[serde(default)]
    deliverable: String,
}

#[derive(Debug, Deserialize)]
pub struct MilestonesDraft {
    milestones: Vec<MilestoneDraft>,
}

impl ExpectedShape for MilestonesDraft {
    const NAME: &'static str = "milestones";
    type Context = MilestoneContext;
    type Output = Vec<Milestone>;

    fn adapt(self, ctx: &MilestoneContext) -> Result<Vec<Milestone>, ShapeViolation> {
        let total = ctx.total_weeks();
        let mut milestones: Vec<Milestone> = self
            .milestones
            .into_iter()
            .filter(|m| !m.label.trim().is_empty())
            .map(|m| Milestone {
                week: m.week.clamp(1, total),
                label: m.label.trim().to_string(),
                deliverable: m.deliverable.trim().to_string(),
            })
            .collect();
        if milestones.is_empty() {
            return Err(ShapeViolation::new(Self::NAME, "no usable milestones"));
        }
        milestones.sort_by_key(|m| m.week);
        Ok(milestones)
    }
}

impl Templated for MilestonesDraft {
    fn template(ctx: &MilestoneContext) -> Vec<Milestone> {
        let mut milestones = vec![Milestone {
            week: 1,
            label: "Kickoff".to_string(),
            deliverable: format!(
                "Learning plan agreed with the {} lead",
                ctx.project_name
            ),
        }];
        let mut elapsed = 0;
        for phase in &ctx.phases {
            elapsed += phase.estimated_hours;
            let deliverable = if phase.number == 1 {
                "Exercises for every foundation module completed".to_string()
            } else {
                format!(
                    "{} outcomes demonstrated to the team as {}",
                    phase.name, ctx.team_role
                )
            };
            milestones.push(Milestone {
                week: ctx.weeks_for(elapsed),
                label: format!("Phase {} complete: {}", phase.number, phase.name),
                deliverable,
            });
        }
        milestones
    }
}

/// Gap labels as a sentence fragment, for program descriptions.
pub fn gap_summary(analysis: &GapAnalysis) -> String {
    join_labels(analysis.gap_skills())
}
