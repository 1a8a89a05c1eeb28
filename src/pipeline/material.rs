use crate::search::SearchHit;

/// Flattens hits into model input: title, snippet, and `(url)` lines per hit,
/// in order, skipping empty fields.
pub fn assemble(hits: &[SearchHit]) -> String {
    let mut lines = Vec::with_capacity(hits.len() * 3);
    for hit in hits {
        if !hit.title.is_empty() {
            lines.push(hit.title.clone());
        }
        if !hit.snippet.is_empty() {
            lines.push(hit.snippet.clone());
        }
        if !hit.url.is_empty() {
            lines.push(format!("({})", hit.url));
        }
    }
    lines.join("\n")
}
