use serde::Deserialize;

use super::SearchHit;

const ABSTRACT_FALLBACK_TITLE: &str = "Instant Answer";

/// DuckDuckGo Instant Answer payload. Every field is optional; the API omits
/// or blanks them freely depending on the query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstantAnswer {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub abstract_text: Option<String>,
    #[serde(default, rename = "AbstractURL")]
    pub abstract_url: Option<String>,
    #[serde(default)]
    pub related_topics: Option<Vec<RelatedTopic>>,
}

/// A related topic, or a named group of them (groups carry no `Text`).
#[derive(Debug, Default, Deserialize)]
pub struct RelatedTopic {
    #[serde(default, rename = "Text")]
    pub text: Option<String>,
    #[serde(default, rename = "FirstURL")]
    pub first_url: Option<String>,
}

/// Builds candidate hits: the abstract first (if any), then related topics
/// drawn from the first `max_results` entries that have both text and a URL.
pub fn hits_from_instant(answer: &InstantAnswer, max_results: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if let Some(text) = non_empty(&answer.abstract_text) {
        hits.push(SearchHit {
            title: non_empty(&answer.heading)
                .unwrap_or(ABSTRACT_FALLBACK_TITLE)
                .to_string(),
            url: answer.abstract_url.clone().unwrap_or_default(),
            snippet: text.to_string(),
        });
    }

    let topics = answer.related_topics.as_deref().unwrap_or_default();
    for topic in topics.iter().take(max_results) {
        let (Some(text), Some(url)) = (non_empty(&topic.text), non_empty(&topic.first_url)) else {
            continue;
        };
        let title = text.split_once(" - ").map_or(text, |(head, _)| head);
        hits.push(SearchHit {
            title: title.to_string(),
            url: url.to_string(),
            snippet: text.to_string(),
        });
    }

    hits
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
