//! Parser for DuckDuckGo's JavaScript-free HTML results page.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{SearchError, SearchHit};

/// Extracts up to `max_results` organic results (ads excluded) in page order.
pub fn parse_lite_html(html: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector(".result:not(.result--ad)")?;
    let title_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut hits = Vec::new();

    for block in document.select(&result_sel) {
        if hits.len() >= max_results {
            break;
        }

        let Some(anchor) = block.select(&title_sel).next() else {
            continue;
        };
        let title = collapsed_text(anchor);
        if title.is_empty() {
            continue;
        }
        let Some(url) = anchor.value().attr("href").and_then(unwrap_redirect) else {
            continue;
        };

        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(collapsed_text)
            .unwrap_or_default();

        hits.push(SearchHit {
            title,
            url,
            snippet,
        });
    }

    tracing::debug!(count = hits.len(), "lite results parsed");
    Ok(hits)
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("invalid selector {css}: {e:?}")))
}

/// Tag-stripped, entity-decoded text with whitespace runs collapsed.
fn collapsed_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves `//duckduckgo.com/l/?uddg=<target>` links to their target and
/// makes protocol-relative links absolute.
fn unwrap_redirect(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let full = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&full).ok()?;
    let is_redirect = parsed
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"))
        && parsed.path().starts_with("/l/");
    if is_redirect {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full)
    }
}
