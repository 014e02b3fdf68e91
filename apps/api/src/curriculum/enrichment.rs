// Best-effort enrichment: papers as resources and case studies.
// Every lookup failure is logged and dropped; nothing here fails a pipeline.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::analysis::GapAnalysis;
use crate::curriculum::models::{CaseStudy, ProjectBrief, Resource};
use crate::resources::{
    case_study_queries, clip_abstract, skill_query, LookupError, PaperHit, ResourceLookup,
};
use crate::skills::normalize;

/// Gaps, by rank, that also get case studies.
const CASE_STUDY_SKILLS: usize = 3;
const CASE_STUDIES_PER_SKILL: usize = 3;
const CASE_STUDY_QUERY_LIMIT: usize = 2;

#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub resources_per_skill: usize,
    pub lookup_timeout: Duration,
    /// Lookups in flight at once.
    pub concurrency: usize,
}

#[derive(Debug, Default)]
pub struct Enrichment {
    pub resources: Vec<Resource>,
    pub case_studies: Vec<CaseStudy>,
}

/// Every topic is searched; `settings.concurrency` bounds how many lookups run at once.
/// Results keep topic order.
pub async fn enrich(
    lookup: Option<Arc<dyn ResourceLookup>>,
    analysis: &GapAnalysis,
    brief: Option<&ProjectBrief>,
    settings: &EnrichmentSettings,
) -> Enrichment {
    let Some(lookup) = lookup else {
        debug!("Resource lookup disabled, skipping enrichment for {}", analysis.id);
        return Enrichment::default();
    };
    let limit = settings.concurrency.max(1);
    let per_skill = settings.resources_per_skill;
    let timeout = settings.lookup_timeout;
    let domain = analysis.job.domain.clone();
    let job_title = analysis.job.title.clone();

    let resources: Vec<Resource> = stream::iter(topics(analysis, brief))
        .map(|topic| {
            let lookup = lookup.clone();
            let query = skill_query(&topic, domain.as_deref());
            async move {
                match search(lookup.as_ref(), &query, per_skill, timeout).await {
                    Ok(hits) => hits
                        .into_iter()
                        .take(per_skill)
                        .map(|hit| Resource::from_paper(hit, &topic))
                        .collect(),
                    Err(e) => {
                        warn!("EnrichmentFailure: resources for '{}' dropped: {}", topic, e);
                        Vec::new()
                    }
                }
            }
        })
        .buffered(limit)
        .collect::<Vec<Vec<Resource>>>()
        .await
        .into_iter()
        .flatten()
        .collect();

    let case_skills: Vec<String> = analysis
        .gaps
        .iter()
        .take(CASE_STUDY_SKILLS)
        .map(|gap| gap.skill.label.clone())
        .collect();
    let case_studies: Vec<CaseStudy> = stream::iter(case_skills)
        .map(|skill| {
            let lookup = lookup.clone();
            let domain = domain.clone();
            let job_title = job_title.clone();
            async move {
                case_studies_for(lookup.as_ref(), &skill, domain.as_deref(), &job_title, timeout).await
            }
        })
        .buffered(limit)
        .collect::<Vec<Vec<CaseStudy>>>()
        .await
        .into_iter()
        .flatten()
        .collect();

    debug!(
        "Enriched analysis {} with {} resources and {} case studies",
        analysis.id,
        resources.len(),
        case_studies.len()
    );
    Enrichment {
        resources,
        case_studies,
    }
}

/// Distinct gap labels in rank order, then tech-stack entries not already covered.
fn topics(analysis: &GapAnalysis, brief: Option<&ProjectBrief>) -> Vec<String> {
    let mut seen = HashSet::new();
    let stack = brief
        .map(|b| b.tech_stack.iter().map(|t| normalize(t)).collect::<Vec<_>>())
        .unwrap_or_default();

    analysis
        .gap_skills()
        .cloned()
        .chain(stack)
        .filter(|skill| !skill.name.is_empty() && seen.insert(skill.name.clone()))
        .map(|skill| skill.label)
        .collect()
}

async fn search(
    lookup: &dyn ResourceLookup,
    query: &str,
    limit: usize,
    timeout: Duration,
) -> Result<Vec<PaperHit>, LookupError> {
    tokio::time::timeout(timeout, lookup.search(query, limit))
        .await
        .map_err(|_| LookupError::Timeout(timeout))?
}

async fn case_studies_for(
    lookup: &dyn ResourceLookup,
    skill: &str,
    domain: Option<&str>,
    job_title: &str,
    timeout: Duration,
) -> Vec<CaseStudy> {
    let mut seen = HashSet::new();
    let mut studies = Vec::new();

    for query in case_study_queries(skill, domain) {
        if studies.len() >= CASE_STUDIES_PER_SKILL {
            break;
        }
        let hits = match search(lookup, &query, CASE_STUDY_QUERY_LIMIT, timeout)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!("EnrichmentFailure: case study query '{}' dropped: {}", query, e);
                continue;
            }
        };
        for hit in hits {
            if studies.len() >= CASE_STUDIES_PER_SKILL {
                break;
            }
            if seen.insert(hit.paper_id.clone()) {
                studies.push(case_study(hit, skill, job_title));
            }
        }
    }
    studies
}

fn case_study(hit: PaperHit, skill: &str, job_title: &str) -> CaseStudy {
    let description = match hit.abstract_text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => clip_abstract(text),
        _ => format!("A published application of {skill}"),
    };
    let links = std::iter::once(hit.url).chain(hit.pdf_url).collect();
    CaseStudy {
        learning_outcomes: vec![
            format!("See how {skill} is applied outside the classroom"),
            format!("Relate the findings of \"{}\" to the {job_title} role", hit.title),
        ],
        title: hit.title,
        description,
        links,
        skill: skill.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::analysis::fixtures::{all_gap_analysis, no_gap_analysis};
    use crate::resources::testing::{paper, EchoLookup};

    fn settings() -> EnrichmentSettings {
        EnrichmentSettings {
            resources_per_skill: 3,
            lookup_timeout: Duration::from_secs(5),
            concurrency: 4,
        }
    }

    fn echo(lookup: EchoLookup) -> Option<Arc<dyn ResourceLookup>> {
        Some(Arc::new(lookup))
    }

    /// Holds every search open for a while and records the peak number in flight.
    #[derive(Default)]
    struct SlowLookup {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ResourceLookup for SlowLookup {
        async fn search(&self, query: &str, _limit: usize) -> Result<Vec<PaperHit>, LookupError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![paper(&query.replace(' ', "-"), query)])
        }
    }

    fn brief(stack: &[&str]) -> ProjectBrief {
        ProjectBrief {
            name: "Trial Insights".to_string(),
            description: "Dashboard".to_string(),
            team_role: String::new(),
            organization: None,
            tech_stack: stack.iter().map(|s| s.to_string()).collect(),
            goals: Vec::new(),
            timeline: None,
        }
    }

    #[tokio::test]
    async fn test_absent_lookup_gives_empty_lists() {
        let result = enrich(None, &all_gap_analysis(), None, &settings()).await;
        assert!(result.resources.is_empty());
        assert!(result.case_studies.is_empty());
    }

    #[tokio::test]
    async fn test_resources_per_gap_and_stack() {
        let analysis = all_gap_analysis();
        let docker = brief(&["Docker"]);
        let result = enrich(echo(EchoLookup::new()), &analysis, Some(&docker), &settings()).await;

        let skills: Vec<&str> = result.resources.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(skills.len(), 4);
        assert_eq!(skills[3], "Docker");
        assert!(result.resources[0].title.contains("biotech"));
        assert!(!result.case_studies.is_empty());
        assert!(result.case_studies.iter().all(|c| !c.links.is_empty()));
    }

    #[tokio::test]
    async fn test_one_failure_drops_only_that_skill() {
        let lookup = echo(EchoLookup::failing_on("Causal Inference"));
        let analysis = all_gap_analysis();
        let result = enrich(lookup, &analysis, None, &settings()).await;

        assert_eq!(result.resources.len(), 2);
        assert!(result.resources.iter().all(|r| r.skill != "Causal Inference"));
        assert!(result.case_studies.iter().all(|c| c.skill != "Causal Inference"));
    }

    #[tokio::test]
    async fn test_case_studies_are_capped_per_skill() {
        let result = enrich(echo(EchoLookup::new()), &all_gap_analysis(), None, &settings()).await;
        for skill in ["Causal Inference", "Health Data Analysis"] {
            let count = result.case_studies.iter().filter(|c| c.skill == skill).count();
            assert!(count >= 1 && count <= CASE_STUDIES_PER_SKILL);
        }
    }

    #[tokio::test]
    async fn test_every_topic_is_searched() {
        let stack = [
            "Docker", "Kubernetes", "Terraform", "Kafka", "Redis", "GraphQL", "Airflow",
        ];
        let analysis = all_gap_analysis();
        let brief = brief(&stack);
        let result = enrich(echo(EchoLookup::new()), &analysis, Some(&brief), &settings()).await;

        let skills: Vec<&str> = result.resources.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(skills.len(), analysis.gaps.len() + stack.len());
        assert_eq!(skills.len(), 10);
        let labels: Vec<String> = stack.iter().map(|s| normalize(s).label).collect();
        assert_eq!(&skills[analysis.gaps.len()..], labels.as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookups_respect_concurrency_limit() {
        let lookup = Arc::new(SlowLookup::default());
        let stack = ["Docker", "Kubernetes", "Terraform", "Kafka", "Redis", "GraphQL"];
        let settings = EnrichmentSettings {
            concurrency: 2,
            ..settings()
        };

        let result = enrich(
            Some(lookup.clone() as Arc<dyn ResourceLookup>),
            &no_gap_analysis(),
            Some(&brief(&stack)),
            &settings,
        )
        .await;

        assert_eq!(result.resources.len(), stack.len());
        assert_eq!(lookup.peak.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_topics_dedup_stack_against_gaps() {
        let analysis = no_gap_analysis();
        let topics = topics(&analysis, Some(&brief(&["docker", "Docker", "Kubernetes"])));
        assert_eq!(topics, vec!["Docker".to_string(), "Kubernetes".to_string()]);
    }
}
