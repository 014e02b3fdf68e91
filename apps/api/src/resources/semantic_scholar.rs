//! Semantic Scholar paper search client.
//!
//! One GET per query against `/graph/v1/paper/search`. An API key is optional and only
//! raises rate limits. Retries are not attempted here; enrichment is best effort.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::resources::{clip_abstract, format_authors, LookupError, PaperHit, ResourceLookup};

pub const SEMANTIC_SCHOLAR_URL: &str = "https://api.semanticscholar.org";
const SEARCH_PATH: &str = "/graph/v1/paper/search";
const SEARCH_FIELDS: &str =
    "paperId,title,abstract,year,citationCount,url,authors,venue,openAccessPdf";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<RawPaper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPaper {
    paper_id: String,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    year: Option<i32>,
    citation_count: Option<u32>,
    url: Option<String>,
    #[serde(default)]
    authors: Vec<RawAuthor>,
    venue: Option<String>,
    open_access_pdf: Option<RawPdf>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPdf {
    url: Option<String>,
}

impl From<RawPaper> for PaperHit {
    fn from(raw: RawPaper) -> Self {
        let authors: Vec<String> = raw.authors.into_iter().filter_map(|a| a.name).collect();
        PaperHit {
            url: raw
                .url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| format!("https://www.semanticscholar.org/paper/{}", raw.paper_id)),
            title: raw
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            abstract_text: raw.abstract_text.as_deref().map(clip_abstract),
            authors: format_authors(&authors),
            venue: raw.venue.filter(|v| !v.is_empty()),
            year: raw.year,
            citation_count: raw.citation_count.unwrap_or(0),
            pdf_url: raw.open_access_pdf.and_then(|p| p.url),
            paper_id: raw.paper_id,
        }
    }
}

#[derive(Clone)]
pub struct SemanticScholarClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, LookupError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: SEMANTIC_SCHOLAR_URL.to_string(),
            api_key,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ResourceLookup for SemanticScholarClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PaperHit>, LookupError> {
        let limit = limit.to_string();
        let mut request = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("fields", SEARCH_FIELDS),
            ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        debug!("Semantic Scholar '{}' returned {} papers", query, body.data.len());
        Ok(body.data.into_iter().map(PaperHit::from).collect())
    }
}
