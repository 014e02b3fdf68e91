use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::skills::SkillSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

/// A candidate's resume after extraction. Never mutated; re-uploads create a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub id: Uuid,
    /// Paragraphs of the source text, in order.
    pub segments: Vec<String>,
    pub skills: SkillSet,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub created_at: DateTime<Utc>,
}

/// A job description with its skills split into required and preferred.
///
/// The two sets are disjoint: a skill cued both ways is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequirement {
    pub id: Uuid,
    pub title: String,
    pub company: Option<String>,
    pub domain: Option<String>,
    pub text: String,
    pub required: SkillSet,
    pub preferred: SkillSet,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied job metadata plus the raw description.
#[derive(Debug, Clone, Deserialize)]
pub struct JobPosting {
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(alias = "description")]
    pub text: String,
}

/// Required and preferred skills found in job text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobSkills {
    pub required: SkillSet,
    pub preferred: SkillSet,
}

impl JobSkills {
    /// Makes the sets disjoint, keeping contested skills as required.
    pub fn settle(mut self) -> Self {
        let required = &self.required;
        self.preferred.retain(|s| !required.contains(s));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    Job,
}

/// Result of a bare extraction call, shaped by the document kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    Resume {
        skills: SkillSet,
        experience: Vec<ExperienceEntry>,
        education: Vec<EducationEntry>,
    },
    Job {
        required: SkillSet,
        preferred: SkillSet,
    },
}
