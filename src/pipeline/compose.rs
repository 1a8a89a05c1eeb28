use tracing::info;

use super::facts::FactSheet;
use crate::ollama::{GenerateOptions, GenerateRequest, ModelClient, OllamaError};

/// Plain, concise prose. Same bounds as extraction with a wider nucleus.
pub const COMPOSITION_OPTIONS: GenerateOptions = GenerateOptions {
    num_predict: Some(120),
    temperature: Some(0.2),
    top_p: Some(0.5),
    num_ctx: Some(2048),
    num_thread: Some(0),
    num_batch: Some(64),
};

pub fn prompt(facts: &FactSheet, query: &str) -> String {
    format!(
        "Based **only** on the FACTS below, answer the QUESTION concisely and plainly.\n\
         If the question asks \"who owns X\" and FACTS indicate a public company, say it is\n\
         owned by shareholders and optionally mention the largest holders if included.\n\
         \n\
         FACTS:\n\
         {facts}\n\
         \n\
         QUESTION:\n\
         {query}\n\
         \n\
         Final answer:\n"
    )
}

/// Answers `query` from `facts` alone. Returns the trimmed model text.
pub async fn compose(
    client: &impl ModelClient,
    model: &str,
    facts: &FactSheet,
    query: &str,
    keep_alive: Option<&str>,
) -> Result<String, OllamaError> {
    info!(model, keep_alive = keep_alive.unwrap_or("none"), "composing answer");

    let request = GenerateRequest {
        model: model.to_string(),
        prompt: prompt(facts, query),
        stream: false,
        keep_alive: keep_alive.map(str::to_string),
        options: COMPOSITION_OPTIONS,
    };
    let response = client.generate(&request).await?;
    let answer = response.text().trim().to_string();

    info!(chars = answer.len(), "answer composed");
    Ok(answer)
}

/// Returns `text` ending in exactly one newline.
pub fn finish_line(text: &str) -> String {
    let mut out = text.trim_end_matches(['\n', '\r']).to_string();
    out.push('\n');
    out
}
