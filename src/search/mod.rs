//! Search resolution: Instant Answer first, results-page scrape when that is too thin.

pub(crate) mod duckduckgo;
pub(crate) mod instant;
pub(crate) mod lite;

pub use duckduckgo::DuckDuckGo;

use tracing::{debug, warn};

use instant::{InstantAnswer, hits_from_instant};

/// One search result. Fields the provider omits are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("search failed: status {0}")]
    Status(u16),

    #[error("malformed instant answer: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unparseable results page: {0}")]
    Parse(String),
}

/// The two provider endpoints the resolver chooses between.
pub trait SearchProvider {
    async fn instant_answer(&self, query: &str) -> Result<InstantAnswer, SearchError>;

    async fn html_results(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError>;
}

/// Which tier produced the hits.
#[derive(Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Structured(Vec<SearchHit>),
    Scraped(Vec<SearchHit>),
    Empty,
}

impl SearchOutcome {
    pub fn tier(&self) -> &'static str {
        match self {
            SearchOutcome::Structured(_) => "instant-answer",
            SearchOutcome::Scraped(_) => "results-page",
            SearchOutcome::Empty => "none",
        }
    }

    pub fn into_hits(self) -> Vec<SearchHit> {
        match self {
            SearchOutcome::Structured(hits) | SearchOutcome::Scraped(hits) => hits,
            SearchOutcome::Empty => Vec::new(),
        }
    }
}

/// Minimum structured hit count accepted without falling back to the scrape.
pub fn thinness_threshold(max_results: usize) -> usize {
    (max_results / 2).max(2)
}

/// Resolves `query` to at most `max_results` hits. Never fails: provider
/// errors are logged and degrade to the next tier, then to `Empty`.
pub async fn resolve(
    provider: &impl SearchProvider,
    query: &str,
    max_results: usize,
) -> SearchOutcome {
    match structured_tier(provider, query, max_results).await {
        Some(hits) => SearchOutcome::Structured(hits),
        None => scraped_tier(provider, query, max_results).await,
    }
}

async fn structured_tier(
    provider: &impl SearchProvider,
    query: &str,
    max_results: usize,
) -> Option<Vec<SearchHit>> {
    let answer = provider
        .instant_answer(query)
        .await
        .inspect_err(|e| warn!(error = %e, "instant answer unavailable, falling back"))
        .ok()?;

    let mut hits = hits_from_instant(&answer, max_results);
    let threshold = thinness_threshold(max_results);
    if hits.len() < threshold {
        debug!(hits = hits.len(), threshold, "instant answer too thin");
        return None;
    }
    hits.truncate(max_results);
    Some(hits)
}

async fn scraped_tier(
    provider: &impl SearchProvider,
    query: &str,
    max_results: usize,
) -> SearchOutcome {
    match provider.html_results(query, max_results).await {
        Ok(hits) if !hits.is_empty() => SearchOutcome::Scraped(hits),
        Ok(_) => SearchOutcome::Empty,
        Err(e) => {
            warn!(error = %e, "results page unavailable");
            SearchOutcome::Empty
        }
    }
}
