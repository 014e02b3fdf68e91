// In-memory resource lookups for pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::resources::{LookupError, PaperHit, ResourceLookup};

pub fn paper(id: &str, title: &str) -> PaperHit {
    PaperHit {
        paper_id: id.to_string(),
        title: title.to_string(),
        abstract_text: Some(format!("About {title}")),
        authors: "A. Author".to_string(),
        venue: Some("Journal".to_string()),
        year: Some(2022),
        citation_count: 10,
        url: format!("https://example.org/{id}"),
        pdf_url: None,
    }
}

/// Returns one paper per query, derived from the query text. Queries containing
/// `fail_on` fail instead.
pub struct EchoLookup {
    pub fail_on: Option<String>,
    calls: AtomicUsize,
}

impl EchoLookup {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceLookup for EchoLookup {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PaperHit>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(needle) = &self.fail_on {
            if query.contains(needle.as_str()) {
                return Err(LookupError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
        }
        let id = query.replace(' ', "-");
        Ok(vec![paper(&id, &format!("Paper on {query}"))]
            .into_iter()
            .take(limit)
            .collect())
    }
}
