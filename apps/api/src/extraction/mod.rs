//! Entity Extractor: turns resume and job text into structured records.
//!
//! Tier 1 (pattern rules + taxonomy scanning) always runs and cannot fail. Tier 2 asks
//! the generation agent for additional skills; if it is unavailable or gives up, the
//! tier-1 result stands and an `ExtractionDegraded` warning is logged.

pub mod drafts;
pub mod handlers;
pub mod models;
pub mod rules;
pub mod scanner;
pub mod upload;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::generation::GenerationAgent;
use crate::skills::{try_normalize, Skill, SkillSet};
use drafts::{JobSkillsDraft, SkillListDraft};
use models::{DocumentKind, Extraction, JobPosting, JobRequirement, JobSkills, ResumeProfile};
use rules::Cue;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0} text is empty")]
    EmptyInput(&'static str),

    #[error("unsupported file type: {0} (expected .pdf or .txt)")]
    UnsupportedFormat(String),

    #[error("could not read document: {0}")]
    Unreadable(String),
}

fn require_text(text: &str, what: &'static str) -> Result<(), ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyInput(what));
    }
    Ok(())
}

#[derive(Clone)]
pub struct Extractor {
    agent: GenerationAgent,
}

impl Extractor {
    pub fn new(agent: GenerationAgent) -> Self {
        Self { agent }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Skills
    // ────────────────────────────────────────────────────────────────────────

    pub async fn extract_resume_skills(&self, text: &str) -> Result<SkillSet, ExtractError> {
        require_text(text, "resume")?;

        let mut skills = resume_skills_tier1(text);
        let tier1_count = skills.len();

        if let Some(extra) = self.tier2_resume(text).await {
            skills.extend(extra.iter().filter_map(|s| try_normalize(s)));
        }

        info!(
            "Resume extraction: {} skills ({} from pattern rules)",
            skills.len(),
            tier1_count
        );
        Ok(skills)
    }

    pub async fn extract_job_skills(&self, text: &str) -> Result<JobSkills, ExtractError> {
        require_text(text, "job description")?;

        let mut skills = job_skills_tier1(text);

        if let Some((required, preferred)) = self.tier2_job(text).await {
            skills
                .required
                .extend(required.iter().filter_map(|s| try_normalize(s)));
            skills
                .preferred
                .extend(preferred.iter().filter_map(|s| try_normalize(s)));
        }

        let skills = skills.settle();
        info!(
            "Job extraction: {} required, {} preferred",
            skills.required.len(),
            skills.preferred.len()
        );
        Ok(skills)
    }

    /// Skills (and for resumes, experience and education) from a bare document.
    pub async fn extract(&self, text: &str, kind: DocumentKind) -> Result<Extraction, ExtractError> {
        match kind {
            DocumentKind::Resume => {
                let skills = self.extract_resume_skills(text).await?;
                Ok(Extraction::Resume {
                    skills,
                    experience: rules::experience(text),
                    education: rules::education(text),
                })
            }
            DocumentKind::Job => {
                let JobSkills {
                    required,
                    preferred,
                } = self.extract_job_skills(text).await?;
                Ok(Extraction::Job {
                    required,
                    preferred,
                })
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Records
    // ────────────────────────────────────────────────────────────────────────

    pub async fn resume_profile(&self, text: &str) -> Result<ResumeProfile, ExtractError> {
        let skills = self.extract_resume_skills(text).await?;
        Ok(ResumeProfile {
            id: Uuid::new_v4(),
            segments: rules::paragraphs(text),
            skills,
            experience: rules::experience(text),
            education: rules::education(text),
            created_at: Utc::now(),
        })
    }

    pub async fn job_requirement(&self, posting: JobPosting) -> Result<JobRequirement, ExtractError> {
        let title = posting.title.trim();
        if title.is_empty() {
            return Err(ExtractError::EmptyInput("job title"));
        }
        let JobSkills {
            required,
            preferred,
        } = self.extract_job_skills(&posting.text).await?;

        Ok(JobRequirement {
            id: Uuid::new_v4(),
            title: title.to_string(),
            company: non_blank(posting.company),
            domain: non_blank(posting.domain),
            text: posting.text,
            required,
            preferred,
            created_at: Utc::now(),
        })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Tier 2
    // ────────────────────────────────────────────────────────────────────────

    async fn tier2_resume(&self, text: &str) -> Option<Vec<String>> {
        if !self.agent.is_enabled() {
            warn!("ExtractionDegraded: generation disabled, resume skills from pattern rules only");
            return None;
        }
        match self
            .agent
            .generate::<SkillListDraft>(&drafts::resume_prompt(text), &())
            .await
        {
            Ok(skills) => Some(skills),
            Err(e) => {
                warn!("ExtractionDegraded: resume tier-2 extraction failed: {}", e);
                None
            }
        }
    }

    async fn tier2_job(&self, text: &str) -> Option<(Vec<String>, Vec<String>)> {
        if !self.agent.is_enabled() {
            warn!("ExtractionDegraded: generation disabled, job skills from pattern rules only");
            return None;
        }
        match self
            .agent
            .generate::<JobSkillsDraft>(&drafts::job_prompt(text), &())
            .await
        {
            Ok(lists) => Some(lists),
            Err(e) => {
                warn!("ExtractionDegraded: job tier-2 extraction failed: {}", e);
                None
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Tier 1
// ────────────────────────────────────────────────────────────────────────────

/// Taxonomy mentions plus list-line items.
pub fn resume_skills_tier1(text: &str) -> SkillSet {
    let scanned = scanner::scan(text).into_iter().map(|m| m.skill);
    let listed = rules::list_items(text)
        .into_iter()
        .filter_map(|item| try_normalize(&item.text));
    scanned.chain(listed).collect()
}

/// Classifies every mention by the cue of its line. Neutral counts as required.
pub fn job_skills_tier1(text: &str) -> JobSkills {
    let lines = rules::classify_lines(text);
    let line_cue = |offset: usize| {
        rules::line_at(&lines, offset)
            .map(|l| l.cue)
            .unwrap_or(Cue::Neutral)
    };

    let mut skills = JobSkills::default();
    let mut place = |skill: Skill, cue: Cue| match cue {
        Cue::Preferred => {
            skills.preferred.insert(skill);
        }
        Cue::Required | Cue::Neutral => {
            skills.required.insert(skill);
        }
    };

    for mention in scanner::scan(text) {
        place(mention.skill, line_cue(mention.offset));
    }
    for item in rules::list_items(text) {
        let Some(skill) = try_normalize(&item.text) else {
            continue;
        };
        // An explicit list label beats the surrounding line's cue.
        let cue = match item.cue {
            Cue::Neutral => line_cue(item.offset),
            labelled => labelled,
        };
        place(skill, cue);
    }
    skills.settle()
}
