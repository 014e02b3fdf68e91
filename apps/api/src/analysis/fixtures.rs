// Hand-built profiles, jobs and analyses for tests.

use chrono::Utc;
use uuid::Uuid;

use crate::analysis::{analyze, GapAnalysis};
use crate::extraction::models::{JobRequirement, ResumeProfile};
use crate::skills::normalize_all;

pub fn profile(skills: &[&str]) -> ResumeProfile {
    ResumeProfile {
        id: Uuid::new_v4(),
        segments: vec![format!("Skills: {}", skills.join(", "))],
        skills: normalize_all(skills.iter().copied()),
        experience: Vec::new(),
        education: Vec::new(),
        created_at: Utc::now(),
    }
}

pub fn job(title: &str, text: &str, required: &[&str]) -> JobRequirement {
    JobRequirement {
        id: Uuid::new_v4(),
        title: title.to_string(),
        company: None,
        domain: Some("biotech".to_string()),
        text: text.to_string(),
        required: normalize_all(required.iter().copied()),
        preferred: Default::default(),
        created_at: Utc::now(),
    }
}

/// Scenario A: nothing the job asks for is on the resume.
pub fn all_gap_analysis() -> GapAnalysis {
    analyze(
        profile(&["Python", "Machine Learning"]),
        job(
            "Health Data Scientist",
            "Requirements:\n\
             - Must have causal inference experience\n\
             - Health data analysis\n\
             - Designing RCTs\n",
            &["Causal Inference", "Health Data Analysis", "RCTs"],
        ),
    )
}

/// An analysis with no gaps at all.
pub fn no_gap_analysis() -> GapAnalysis {
    analyze(
        profile(&["Python", "SQL"]),
        job("Analyst", "We need Python and SQL.", &["Python", "SQL"]),
    )
}
