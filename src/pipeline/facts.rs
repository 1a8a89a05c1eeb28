use std::fmt;

use tracing::info;

use crate::ollama::{GenerateOptions, GenerateRequest, ModelClient, OllamaError};

pub const BULLET: &str = "• ";
pub const UNKNOWN_FACT: &str = "• unknown in source";

/// Leading characters stripped from each model line before re-bulleting.
const BULLET_JUNK: &[char] = &['•', '-', '*', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ' '];

/// Terse, low-temperature sampling for fact extraction.
pub const EXTRACTION_OPTIONS: GenerateOptions = GenerateOptions {
    num_predict: Some(140),
    temperature: Some(0.2),
    top_p: Some(0.3),
    num_ctx: Some(2048),
    num_thread: Some(0),
    num_batch: Some(64),
};

/// Bulleted facts, one per line, each starting with `"• "`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactSheet(String);

impl FactSheet {
    /// Canonicalizes raw model output. Blank lines are dropped; leading
    /// bullets, numbering, dots, and spaces are replaced by a single `"• "`.
    pub fn normalize(raw: &str) -> Self {
        let lines: Vec<String> = raw
            .lines()
            .filter_map(|line| {
                let fact = line
                    .trim_start_matches(|c: char| BULLET_JUNK.contains(&c) || c.is_whitespace())
                    .trim_end();
                (!fact.is_empty()).then(|| format!("{BULLET}{fact}"))
            })
            .collect();

        if lines.is_empty() {
            Self(UNKNOWN_FACT.to_string())
        } else {
            Self(lines.join("\n"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn fact_count(&self) -> usize {
        self.0.lines().count()
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_FACT
    }
}

impl fmt::Display for FactSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn prompt(material: &str, query: &str) -> String {
    format!(
        "Summarize **verifiable facts only** from the MATERIAL to answer the QUESTION.\n\
         Output **only bullet points**, each starting with \"• \". No headings, no intro, no outro.\n\
         - Keep bullets short and factual.\n\
         - If a needed fact is absent, include exactly one bullet: \"• unknown in source\".\n\
         \n\
         MATERIAL:\n\
         {material}\n\
         \n\
         QUESTION:\n\
         {query}\n"
    )
}

/// Asks `model` for verifiable facts from `material` that answer `query`.
pub async fn extract(
    client: &impl ModelClient,
    model: &str,
    material: &str,
    query: &str,
    keep_alive: Option<&str>,
) -> Result<FactSheet, OllamaError> {
    info!(model, keep_alive = keep_alive.unwrap_or("none"), "extracting facts");

    let request = GenerateRequest {
        model: model.to_string(),
        prompt: prompt(material, query),
        stream: false,
        keep_alive: keep_alive.map(str::to_string),
        options: EXTRACTION_OPTIONS,
    };
    let response = client.generate(&request).await?;
    let facts = FactSheet::normalize(response.text());

    info!(facts = facts.fact_count(), unknown = facts.is_unknown(), "facts extracted");
    Ok(facts)
}
