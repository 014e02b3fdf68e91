// External resource lookup: academic papers that back up a curriculum.
// Lookup is best effort; callers treat every error as "no results".

pub mod semantic_scholar;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use semantic_scholar::SemanticScholarClient;

/// Abstracts longer than this are cut, in characters.
pub const MAX_ABSTRACT_CHARS: usize = 500;
/// Authors listed before "et al.".
const MAX_LISTED_AUTHORS: usize = 3;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("lookup timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// One search result, already trimmed for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperHit {
    pub paper_id: String,
    pub title: String,
    pub abstract_text: Option<String>,
    /// "A, B, C, et al." or "Unknown".
    pub authors: String,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub citation_count: u32,
    pub url: String,
    pub pdf_url: Option<String>,
}

/// The external resource lookup capability.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PaperHit>, LookupError>;
}

/// "A, B, C, et al." for long author lists; "Unknown" for none.
pub fn format_authors(names: &[String]) -> String {
    let mut listed: Vec<&str> = names
        .iter()
        .take(MAX_LISTED_AUTHORS)
        .map(String::as_str)
        .filter(|n| !n.is_empty())
        .collect();
    if listed.is_empty() {
        return "Unknown".to_string();
    }
    if names.len() > MAX_LISTED_AUTHORS {
        listed.push("et al.");
    }
    listed.join(", ")
}

/// Truncates an abstract to `MAX_ABSTRACT_CHARS` characters.
pub fn clip_abstract(text: &str) -> String {
    text.chars().take(MAX_ABSTRACT_CHARS).collect()
}

/// Query used to find papers for one skill.
pub fn skill_query(skill: &str, domain: Option<&str>) -> String {
    match domain {
        Some(d) if !d.trim().is_empty() => format!("{skill} {}", d.trim()),
        _ => skill.to_string(),
    }
}

/// Queries tried, in order, when looking for case studies on a topic.
pub fn case_study_queries(topic: &str, domain: Option<&str>) -> Vec<String> {
    let domain = domain.map(str::trim).unwrap_or("");
    vec![
        format!("{topic} case study {domain}").trim().to_string(),
        format!("{topic} industry application {domain}").trim().to_string(),
        format!("{topic} practical implementation"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_format_authors() {
        assert_eq!(format_authors(&[]), "Unknown");
        assert_eq!(format_authors(&names(&["Ada", "Alan"])), "Ada, Alan");
        assert_eq!(
            format_authors(&names(&["A", "B", "C", "D"])),
            "A, B, C, et al."
        );
    }

    #[test]
    fn test_clip_abstract() {
        let long = "a".repeat(900);
        assert_eq!(clip_abstract(&long).len(), MAX_ABSTRACT_CHARS);
        assert_eq!(clip_abstract("short"), "short");
    }

    #[test]
    fn test_queries() {
        assert_eq!(skill_query("causal inference", Some("biotech")), "causal inference biotech");
        assert_eq!(skill_query("sql", None), "sql");
        let queries = case_study_queries("docker", None);
        assert_eq!(queries[0], "docker case study");
        assert_eq!(queries[2], "docker practical implementation");
    }
}
