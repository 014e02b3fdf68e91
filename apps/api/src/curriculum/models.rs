use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::Importance;
use crate::generation::ContentOrigin;
use crate::resources::PaperHit;
use crate::skills::Skill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Starting difficulty for a gap: critical gaps assume some prior exposure.
    pub fn for_importance(importance: Importance) -> Self {
        match importance {
            Importance::Critical => Difficulty::Intermediate,
            Importance::Important | Importance::Normal => Difficulty::Beginner,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" | "basic" | "introductory" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" | "expert" => Some(Difficulty::Advanced),
            _ => None,
        }
    }

    /// Hours a templated module at this level is expected to take.
    pub fn default_hours(self) -> u32 {
        match self {
            Difficulty::Beginner => 10,
            Difficulty::Intermediate => 15,
            Difficulty::Advanced => 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub title: String,
    pub description: String,
    pub learning_objectives: Vec<String>,
    pub content_sections: Vec<ContentSection>,
    pub exercises: Vec<Exercise>,
    pub estimated_hours: u32,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<Skill>,
    pub origin: ContentOrigin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    /// 1-based and sequential.
    pub number: u32,
    pub name: String,
    pub description: String,
    /// Sum of the module hours.
    pub estimated_hours: u32,
    pub modules: Vec<Module>,
}

impl Phase {
    pub fn new(number: u32, name: String, description: String, mut modules: Vec<Module>) -> Self {
        for module in &mut modules {
            module.phase = Some(number);
        }
        Self {
            number,
            name,
            description,
            estimated_hours: modules.iter().map(|m| m.estimated_hours).sum(),
            modules,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub week: u32,
    pub label: String,
    pub deliverable: String,
}

/// Either a flat module list (gap-only) or phases plus milestones (project mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProgramLayout {
    Flat {
        modules: Vec<Module>,
    },
    Phased {
        phases: Vec<Phase>,
        milestones: Vec<Milestone>,
    },
}

impl ProgramLayout {
    pub fn modules(&self) -> Box<dyn Iterator<Item = &Module> + '_> {
        match self {
            ProgramLayout::Flat { modules } => Box::new(modules.iter()),
            ProgramLayout::Phased { phases, .. } => {
                Box::new(phases.iter().flat_map(|p| p.modules.iter()))
            }
        }
    }

    pub fn estimated_hours(&self) -> u32 {
        match self {
            ProgramLayout::Flat { modules } => modules.iter().map(|m| m.estimated_hours).sum(),
            ProgramLayout::Phased { phases, .. } => phases.iter().map(|p| p.estimated_hours).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStudy {
    pub title: String,
    pub description: String,
    pub learning_outcomes: Vec<String>,
    pub links: Vec<String>,
    /// Label of the skill the case study illustrates.
    pub skill: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Paper,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub title: String,
    pub authors: String,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub citation_count: u32,
    pub url: String,
    pub pdf_url: Option<String>,
    /// Label of the skill or technology the resource supports.
    pub skill: String,
}

impl Resource {
    pub fn from_paper(hit: PaperHit, skill: &str) -> Self {
        Self {
            kind: ResourceKind::Paper,
            title: hit.title,
            authors: hit.authors,
            venue: hit.venue,
            year: hit.year,
            citation_count: hit.citation_count,
            url: hit.url,
            pdf_url: hit.pdf_url,
            skill: skill.to_string(),
        }
    }
}

/// A project the candidate is being prepared for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBrief {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub team_role: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub timeline: Option<String>,
}

impl ProjectBrief {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("project name is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("project description is required".to_string());
        }
        Ok(())
    }

    pub fn role(&self) -> &str {
        match self.team_role.trim() {
            "" => "team member",
            role => role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingProgram {
    pub id: Uuid,
    pub gap_analysis_id: Uuid,
    pub title: String,
    pub description: String,
    pub estimated_hours: u32,
    pub duration_label: String,
    pub layout: ProgramLayout,
    pub learning_objectives: Vec<String>,
    pub case_studies: Vec<CaseStudy>,
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectBrief>,
    pub created_at: DateTime<Utc>,
}

impl TrainingProgram {
    pub fn templated_module_count(&self) -> usize {
        self.layout
            .modules()
            .filter(|m| m.origin == ContentOrigin::Templated)
            .count()
    }
}

/// "6 weeks (~55 hours at 10 h/week)".
pub fn duration_label(hours: u32, hours_per_week: u32) -> String {
    if hours == 0 {
        return "Under a week".to_string();
    }
    let per_week = hours_per_week.max(1);
    let weeks = hours.div_ceil(per_week);
    let unit = if weeks == 1 { "week" } else { "weeks" };
    format!("{weeks} {unit} (~{hours} hours at {per_week} h/week)")
}
