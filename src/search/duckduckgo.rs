use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::instant::InstantAnswer;
use super::lite::parse_lite_html;
use super::{SearchError, SearchHit, SearchProvider};

const INSTANT_ANSWER_URL: &str = "https://api.duckduckgo.com/";
const LITE_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Keyless DuckDuckGo access: the Instant Answer API and the HTML results page.
#[derive(Clone)]
pub struct DuckDuckGo {
    http: Client,
    instant_url: String,
    lite_url: String,
}

impl DuckDuckGo {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            instant_url: INSTANT_ANSWER_URL.to_string(),
            lite_url: LITE_HTML_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            http,
            instant_url: format!("{base}/"),
            lite_url: format!("{base}/html/"),
        }
    }
}

impl SearchProvider for DuckDuckGo {
    async fn instant_answer(&self, query: &str) -> Result<InstantAnswer, SearchError> {
        let response = self
            .http
            .get(&self.instant_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("no_redirect", "1"),
            ])
            .header("User-Agent", crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        // Served as application/x-javascript, so decode the text ourselves.
        let text = response.text().await?;
        let answer: InstantAnswer = serde_json::from_str(&text)?;
        debug!(bytes = text.len(), "instant answer received");
        Ok(answer)
    }

    async fn html_results(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .http
            .post(&self.lite_url)
            .form(&[("q", query)])
            .header("User-Agent", crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        debug!(bytes = html.len(), "results page received");
        parse_lite_html(&html, max_results)
    }
}
