//! Gap Analyzer: set comparison of candidate skills against required job skills.
//!
//! Pure and deterministic apart from the analysis id and timestamp. Importance comes
//! from a keyword-proximity heuristic over the job text:
//!
//! - **critical**: a line mentioning the skill uses intensifying language, or the
//!   first mention sits in the first third of the requirements section
//! - **important**: mentioned inside the requirements section or on a required-cued line
//! - **normal**: everything else, including skills that never appear literally
//!
//! Gaps are ranked by (severity, first-mention offset, canonical name).

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tracing::info;
use uuid::Uuid;

use crate::analysis::{GapAnalysis, GapRecord, Importance};
use crate::extraction::models::{JobRequirement, ResumeProfile};
use crate::extraction::rules::{self, ClassifiedLine, Cue};
use crate::extraction::scanner;
use crate::skills::{Skill, SkillSet};

static INTENSIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:must|required|essential|mandatory|critical|needs?|strong|expert)\b")
        .expect("intensifier pattern must compile")
});

/// Compares `profile` against `job`. An empty requirement set is not an error.
pub fn analyze(profile: ResumeProfile, job: JobRequirement) -> GapAnalysis {
    let matched: SkillSet = job
        .required
        .intersection(&profile.skills)
        .cloned()
        .collect();

    let lines = rules::classify_lines(&job.text);
    let span = rules::requirements_span(&lines, job.text.len());

    let mut gaps: Vec<GapRecord> = job
        .required
        .difference(&profile.skills)
        .map(|skill| {
            let offsets = scanner::mentions_of(&job.text, skill);
            let importance = classify(&lines, span, &offsets);
            GapRecord {
                skill: skill.clone(),
                importance,
                priority_rank: 0,
                first_mention: offsets.first().copied(),
                reason: reason(skill, importance, &offsets, &job),
                related_skills: related_skills(skill, &profile.skills),
            }
        })
        .collect();

    let text_len = job.text.len();
    gaps.sort_by(|a, b| {
        a.importance
            .cmp(&b.importance)
            .then(a.first_mention.unwrap_or(text_len).cmp(&b.first_mention.unwrap_or(text_len)))
            .then(a.skill.name.cmp(&b.skill.name))
    });
    for (i, gap) in gaps.iter_mut().enumerate() {
        gap.priority_rank = i as u32 + 1;
    }

    let confidence_score = confidence(matched.len(), job.required.len());
    let notes = notes(&matched, &gaps, job.required.len());

    info!(
        "Gap analysis for '{}': {} matched, {} gaps, confidence {}",
        job.title,
        matched.len(),
        gaps.len(),
        confidence_score
    );

    GapAnalysis {
        id: Uuid::new_v4(),
        profile,
        job,
        matched,
        gaps,
        confidence_score,
        notes,
        created_at: Utc::now(),
    }
}

/// `round(100 * matched / required)`, or 100 when nothing is required.
pub fn confidence(matched: usize, required: usize) -> u8 {
    if required == 0 {
        return 100;
    }
    let ratio = matched.min(required) as f64 / required as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

fn classify(lines: &[ClassifiedLine<'_>], span: (usize, usize), offsets: &[usize]) -> Importance {
    let Some(&first) = offsets.first() else {
        return Importance::Normal;
    };
    let mention_lines: Vec<&ClassifiedLine<'_>> = offsets
        .iter()
        .filter_map(|&o| rules::line_at(lines, o))
        .collect();

    let (start, end) = span;
    let in_span = |o: usize| start <= o && o < end;

    if mention_lines.iter().any(|l| INTENSIFIER.is_match(l.text)) {
        return Importance::Critical;
    }
    if in_span(first) && (first - start) * 3 < end - start {
        return Importance::Critical;
    }
    if offsets.iter().any(|&o| in_span(o)) || mention_lines.iter().any(|l| l.cue == Cue::Required) {
        return Importance::Important;
    }
    Importance::Normal
}

fn reason(skill: &Skill, importance: Importance, offsets: &[usize], job: &JobRequirement) -> String {
    let role = match &job.domain {
        Some(domain) => format!("the {} role in {}", job.title, domain),
        None => format!("the {} role", job.title),
    };
    match importance {
        Importance::Critical => format!("{} is called out as essential for {}", skill.label, role),
        Importance::Important => format!("{} is listed among the requirements for {}", skill.label, role),
        Importance::Normal if offsets.is_empty() => {
            format!("{} was identified as a requirement for {}", skill.label, role)
        }
        Importance::Normal => format!("{} is mentioned in the description for {}", skill.label, role),
    }
}

fn related_skills(gap: &Skill, candidate: &SkillSet) -> Vec<Skill> {
    let Some(category) = gap.category() else {
        return Vec::new();
    };
    candidate
        .iter()
        .filter(|s| s.category() == Some(category))
        .cloned()
        .collect()
}

fn notes(matched: &SkillSet, gaps: &[GapRecord], required: usize) -> String {
    let critical = gaps
        .iter()
        .filter(|g| g.importance == Importance::Critical)
        .count();
    format!(
        "Found {} matching skills out of {} required. Identified {} skill gaps to address ({} critical).",
        matched.len(),
        required,
        gaps.len(),
        critical
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{all_gap_analysis, job, profile};
    use crate::skills::normalize;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_scenario_all_gaps() {
        let analysis = all_gap_analysis();
        assert!(analysis.matched.is_empty());
        assert_eq!(analysis.gaps.len(), 3);
        assert_eq!(analysis.confidence_score, 0);
        let gap_names: BTreeSet<&str> = analysis.gap_skills().map(|s| s.name.as_str()).collect();
        assert_eq!(
            gap_names,
            BTreeSet::from(["causal inference", "health data analysis", "randomized controlled trials"])
        );
    }

    #[test]
    fn test_scenario_case_insensitive_full_match() {
        let analysis = analyze(
            profile(&["python", "SQL", "Docker"]),
            job("Analyst", "Python and SQL", &["Python", "SQL"]),
        );
        assert_eq!(analysis.matched.len(), 2);
        assert!(analysis.gaps.is_empty());
        assert_eq!(analysis.confidence_score, 100);
    }

    #[test]
    fn test_empty_requirements_is_full_confidence() {
        let analysis = analyze(profile(&["Python"]), job("Intern", "Curious people welcome", &[]));
        assert!(analysis.gaps.is_empty());
        assert_eq!(analysis.confidence_score, 100);
    }

    #[test]
    fn test_confidence_rounding() {
        assert_eq!(confidence(1, 3), 33);
        assert_eq!(confidence(2, 3), 67);
        assert_eq!(confidence(0, 5), 0);
        assert_eq!(confidence(0, 0), 100);
    }

    #[test]
    fn test_importance_heuristic() {
        let text = "About the team\n\
            We ship Docker images daily and care about reliability and observability.\n\
            Requirements:\n\
            - Must know SQL\n\
            - Tableau dashboards\n\
            - Some experience with Kubernetes clusters in production settings\n\
            Benefits:\n\
            - Terraform budget\n";
        let analysis = analyze(
            profile(&[]),
            job(
                "Analyst",
                text,
                &["SQL", "Tableau", "Kubernetes", "Docker", "Terraform", "Spark"],
            ),
        );
        let importance_of = |name: &str| {
            analysis
                .gaps
                .iter()
                .find(|g| g.skill.name == name)
                .map(|g| g.importance)
                .unwrap()
        };
        assert_eq!(importance_of("sql"), Importance::Critical);
        assert_eq!(importance_of("tableau"), Importance::Critical);
        assert_eq!(importance_of("kubernetes"), Importance::Important);
        assert_eq!(importance_of("docker"), Importance::Normal);
        assert_eq!(importance_of("terraform"), Importance::Normal);
        assert_eq!(importance_of("spark"), Importance::Normal);
    }

    #[test]
    fn test_unknown_skills_with_separators_are_located() {
        let text = "Overview\nRequired: Real-time systems, Ökonometrie\n";
        let analysis = analyze(
            profile(&[]),
            job("Quant", text, &["Real-time systems", "Ökonometrie"]),
        );
        let gap = |name: &str| analysis.gaps.iter().find(|g| g.skill.name == name).unwrap();

        let realtime = gap("real time systems");
        assert_eq!(realtime.importance, Importance::Critical);
        assert_eq!(realtime.first_mention, text.find("Real-time"));

        let econometrics = gap("ökonometrie");
        assert_eq!(econometrics.importance, Importance::Critical);
        assert_eq!(econometrics.first_mention, text.find("Ökonometrie"));
        assert_eq!(analysis.gaps[0].skill.name, "real time systems");
    }

    #[test]
    fn test_rank_order_severity_then_offset_then_name() {
        let text = "Requirements:\nWe need Spark and SQL\nNice words about Git, Linux and Docker here\n\n\n\n";
        let analysis = analyze(
            profile(&[]),
            job("Engineer", text, &["SQL", "Spark", "Docker", "Git", "AWS", "Azure"]),
        );
        let order: Vec<&str> = analysis.gaps.iter().map(|g| g.skill.name.as_str()).collect();
        // Spark and SQL sit on a "need" line; Git and Docker are plain requirements;
        // AWS and Azure never appear, so they trail in name order.
        assert_eq!(order, vec!["spark", "sql", "git", "docker", "aws", "azure"]);
        let ranks: Vec<u32> = analysis.gaps.iter().map(|g| g.priority_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(analysis.gaps[5].reason, "Azure was identified as a requirement for the Engineer role in biotech");
    }

    #[test]
    fn test_related_skills_share_category() {
        let analysis = analyze(
            profile(&["Python", "PyTorch", "SQL"]),
            job("ML Engineer", "Deep learning required", &["Deep Learning"]),
        );
        let related: Vec<&str> = analysis.gaps[0]
            .related_skills
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(related, vec!["pytorch"]);
    }

    #[test]
    fn test_notes_summarise_counts() {
        let analysis = all_gap_analysis();
        assert!(analysis.notes.starts_with("Found 0 matching skills out of 3 required."));
    }

    #[test]
    fn test_inputs_are_held_by_value() {
        let p = profile(&["Python"]);
        let j = job("Analyst", "Python", &["Python"]);
        let (pid, jid) = (p.id, j.id);
        let analysis = analyze(p, j);
        assert_eq!(analysis.profile.id, pid);
        assert_eq!(analysis.job.id, jid);
        assert!(analysis.matched.contains(&normalize("python")));
    }

    const POOL: &[&str] = &[
        "python", "sql", "docker", "kubernetes", "tableau", "spark", "causal inference",
        "statistics", "react", "rust", "git", "aws", "health economics", "survey design",
    ];

    proptest! {
        #[test]
        fn prop_matched_and_gaps_partition_required(
            have in proptest::sample::subsequence(POOL, 0..POOL.len()),
            need in proptest::sample::subsequence(POOL, 0..POOL.len()),
        ) {
            let text = need.join(", ");
            let analysis = analyze(profile(&have), job("Role", &text, &need));

            let gaps: SkillSet = analysis.gap_skills().cloned().collect();
            prop_assert_eq!(gaps.len(), analysis.gaps.len());
            prop_assert!(analysis.matched.is_disjoint(&gaps));
            let union: SkillSet = analysis.matched.union(&gaps).cloned().collect();
            prop_assert_eq!(&union, &analysis.job.required);
        }

        #[test]
        fn prop_ranks_are_a_permutation(
            need in proptest::sample::subsequence(POOL, 0..POOL.len()),
        ) {
            let analysis = analyze(profile(&[]), job("Role", "No literal mentions here", &need));
            let mut ranks: Vec<u32> = analysis.gaps.iter().map(|g| g.priority_rank).collect();
            ranks.sort_unstable();
            let expected: Vec<u32> = (1..=analysis.gaps.len() as u32).collect();
            prop_assert_eq!(ranks, expected);
        }

        #[test]
        fn prop_confidence_in_range(matched in 0usize..50, required in 0usize..50) {
            let score = confidence(matched.min(required), required);
            prop_assert!(score <= 100);
            if required > 0 && matched == 0 {
                prop_assert_eq!(score, 0);
            }
        }
    }
}
