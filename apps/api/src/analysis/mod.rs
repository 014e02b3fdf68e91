// Gap analysis: which required skills a candidate has, which they lack, and in what
// order the missing ones should be learned.

pub mod gap_analyzer;
pub mod handlers;

#[cfg(test)]
pub mod fixtures;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extraction::models::{JobRequirement, ResumeProfile};
use crate::skills::{Skill, SkillSet};

pub use gap_analyzer::analyze;

/// How strongly the job text insists on a skill. Ordered most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Critical,
    Important,
    Normal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapRecord {
    pub skill: Skill,
    pub importance: Importance,
    /// 1 is the highest priority. Unique within an analysis.
    pub priority_rank: u32,
    /// Byte offset of the first literal mention in the job text.
    pub first_mention: Option<usize>,
    pub reason: String,
    /// Candidate skills in the same taxonomy category.
    pub related_skills: Vec<Skill>,
}

/// The comparison of one resume against one job.
///
/// `matched` and the gap skills partition `job.required` exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub id: Uuid,
    pub profile: ResumeProfile,
    pub job: JobRequirement,
    pub matched: SkillSet,
    /// Sorted by `priority_rank`.
    pub gaps: Vec<GapRecord>,
    pub confidence_score: u8,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl GapAnalysis {
    pub fn gap_skills(&self) -> impl Iterator<Item = &Skill> {
        self.gaps.iter().map(|g| &g.skill)
    }

    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }
}
