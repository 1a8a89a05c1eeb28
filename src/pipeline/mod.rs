//! Three-stage research pipeline: search, fact extraction, composition.

pub(crate) mod compose;
pub(crate) mod facts;
pub(crate) mod material;

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::ollama::{ModelClient, OllamaError};
use crate::search::{self, SearchProvider};
use facts::FactSheet;

pub use compose::finish_line;

#[derive(Debug)]
pub struct PipelineRequest<'a> {
    pub query: &'a str,
    pub keep_alive: Option<&'a str>,
    pub model_researcher: &'a str,
    pub model_final: &'a str,
    pub max_results: usize,
}

/// Per-stage wall-clock seconds, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timings {
    pub t_search: f64,
    pub t_facts: f64,
    pub t_compose: f64,
    pub t_total: f64,
}

#[derive(Debug)]
pub struct PipelineResult {
    pub body: String,
    pub meta: Timings,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("fact extraction failed: {0}")]
    Facts(#[source] OllamaError),

    #[error("answer composition failed: {0}")]
    Compose(#[source] OllamaError),
}

/// Runs search → extract → compose strictly in sequence. Search never fails;
/// either model call failing aborts the run with no partial body.
pub async fn run(
    client: &impl ModelClient,
    provider: &impl SearchProvider,
    req: &PipelineRequest<'_>,
) -> Result<PipelineResult, PipelineError> {
    let start = Instant::now();

    info!("step 1/3: finding sources");
    let outcome = search::resolve(provider, req.query, req.max_results).await;
    let tier = outcome.tier();
    let hits = outcome.into_hits();
    let material = material::assemble(&hits);
    let searched = Instant::now();
    info!(hits = hits.len(), tier, "step 1/3: done");

    info!(model = req.model_researcher, "step 2/3: extracting facts");
    let facts = facts::extract(
        client,
        req.model_researcher,
        &material,
        req.query,
        req.keep_alive,
    )
    .await
    .map_err(PipelineError::Facts)?;
    let extracted = Instant::now();
    info!("step 2/3: done");

    info!(model = req.model_final, "step 3/3: composing answer");
    let answer = compose::compose(client, req.model_final, &facts, req.query, req.keep_alive)
        .await
        .map_err(PipelineError::Compose)?;
    let composed = Instant::now();
    info!("step 3/3: done");

    let meta = Timings {
        t_search: round_tenths((searched - start).as_secs_f64()),
        t_facts: round_tenths((extracted - searched).as_secs_f64()),
        t_compose: round_tenths((composed - extracted).as_secs_f64()),
        t_total: round_tenths((composed - start).as_secs_f64()),
    };

    Ok(PipelineResult {
        body: render_body(&facts, &answer),
        meta,
    })
}

pub fn render_body(facts: &FactSheet, answer: &str) -> String {
    format!("**Facts**\n{facts}\n\n**Answer**\n{answer}")
}

fn round_tenths(secs: f64) -> f64 {
    (secs * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ollama::{GenerateRequest, GenerateResponse};
    use crate::search::instant::InstantAnswer;
    use crate::search::{SearchError, SearchHit};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockModel {
        responses: Mutex<VecDeque<Result<GenerateResponse, OllamaError>>>,
        requests: Mutex<Vec<GenerateRequest>>,
        delay: Duration,
    }

    impl MockModel {
        fn replying(texts: &[&str]) -> Self {
            Self::with_results(
                texts
                    .iter()
                    .map(|t| {
                        Ok(GenerateResponse {
                            response: Some(t.to_string()),
                        })
                    })
                    .collect(),
            )
        }

        fn with_results(results: Vec<Result<GenerateResponse, OllamaError>>) -> Self {
            Self {
                responses: Mutex::new(results.into()),
                requests: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            }
        }

        fn captured(&self) -> Vec<GenerateRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ModelClient for MockModel {
        async fn generate(
            &self,
            request: &GenerateRequest,
        ) -> Result<GenerateResponse, OllamaError> {
            self.requests.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.responses.lock().unwrap().pop_front().unwrap_or(Err(
                OllamaError::Api {
                    code: 500,
                    message: "no canned response".into(),
                },
            ))
        }
    }

    struct StaticSearch {
        hits: Vec<SearchHit>,
        scrape_calls: Mutex<usize>,
    }

    impl StaticSearch {
        fn scraping(hits: Vec<SearchHit>) -> Self {
            Self {
                hits,
                scrape_calls: Mutex::new(0),
            }
        }
    }

    impl SearchProvider for StaticSearch {
        async fn instant_answer(&self, _query: &str) -> Result<InstantAnswer, SearchError> {
            Ok(InstantAnswer::default())
        }

        async fn html_results(
            &self,
            _query: &str,
            max_results: usize,
        ) -> Result<Vec<SearchHit>, SearchError> {
            *self.scrape_calls.lock().unwrap() += 1;
            Ok(self.hits.iter().take(max_results).cloned().collect())
        }
    }

    fn france_hit() -> SearchHit {
        SearchHit {
            title: "France".into(),
            url: "https://example.test/france".into(),
            snippet: "Paris is the capital of France.".into(),
        }
    }

    fn request<'a>(query: &'a str) -> PipelineRequest<'a> {
        PipelineRequest {
            query,
            keep_alive: Some("20m"),
            model_researcher: "researcher",
            model_final: "writer",
            max_results: 6,
        }
    }

    #[tokio::test]
    async fn capital_of_france_end_to_end() {
        let model = MockModel::replying(&["Paris is the capital.", "The capital of France is Paris."]);
        let search = StaticSearch::scraping(vec![france_hit()]);

        let result = run(&model, &search, &request("what is the capital of France"))
            .await
            .unwrap();

        assert_eq!(
            result.body,
            "**Facts**\n• Paris is the capital.\n\n**Answer**\nThe capital of France is Paris."
        );

        let calls = model.captured();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].model, "researcher");
        assert!(calls[0].prompt.contains(
            "France\nParis is the capital of France.\n(https://example.test/france)"
        ));
        assert_eq!(calls[0].options, facts::EXTRACTION_OPTIONS);
        assert_eq!(calls[1].model, "writer");
        assert!(calls[1].prompt.contains("FACTS:\n• Paris is the capital.\n"));
        assert_eq!(calls[1].options, compose::COMPOSITION_OPTIONS);
        assert!(calls.iter().all(|c| !c.stream));
        assert!(calls.iter().all(|c| c.keep_alive.as_deref() == Some("20m")));
    }

    #[tokio::test]
    async fn no_hits_still_runs_both_stages() {
        let model = MockModel::replying(&["", "I could not find that."]);
        let search = StaticSearch::scraping(vec![]);

        let result = run(&model, &search, &request("obscure")).await.unwrap();

        assert_eq!(
            result.body,
            "**Facts**\n• unknown in source\n\n**Answer**\nI could not find that."
        );
        assert_eq!(*search.scrape_calls.lock().unwrap(), 1);
        assert!(model.captured()[0].prompt.contains("MATERIAL:\n\n"));
    }

    #[tokio::test]
    async fn answer_is_trimmed() {
        let model = MockModel::replying(&["- fact", "\n\n  Answer text.  \n"]);
        let search = StaticSearch::scraping(vec![france_hit()]);

        let result = run(&model, &search, &request("q")).await.unwrap();

        assert!(result.body.ends_with("**Answer**\nAnswer text."));
    }

    #[tokio::test]
    async fn extraction_failure_aborts_before_composition() {
        let model = MockModel::with_results(vec![Err(OllamaError::Api {
            code: 404,
            message: "model not found".into(),
        })]);
        let search = StaticSearch::scraping(vec![france_hit()]);

        let err = run(&model, &search, &request("q")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Facts(_)));
        assert!(err.to_string().contains("model not found"));
        assert_eq!(model.captured().len(), 1);
    }

    #[tokio::test]
    async fn composition_failure_is_reported() {
        let model = MockModel::with_results(vec![
            Ok(GenerateResponse {
                response: Some("fact".into()),
            }),
            Err(OllamaError::Decode("truncated".into())),
        ]);
        let search = StaticSearch::scraping(vec![france_hit()]);

        let err = run(&model, &search, &request("q")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Compose(_)));
    }

    #[tokio::test]
    async fn timings_are_non_negative_and_total_covers_stages() {
        let mut model = MockModel::replying(&["fact", "answer"]);
        model.delay = Duration::from_millis(120);
        let search = StaticSearch::scraping(vec![france_hit()]);

        let meta = run(&model, &search, &request("q")).await.unwrap().meta;

        for t in [meta.t_search, meta.t_facts, meta.t_compose, meta.t_total] {
            assert!(t >= 0.0, "negative timing: {meta:?}");
        }
        // Four independently rounded values, each off by at most 0.05s.
        assert!(meta.t_total + 0.2 >= meta.t_search + meta.t_facts + meta.t_compose);
        assert!(meta.t_facts >= 0.1, "{meta:?}");
        assert!(meta.t_compose >= 0.1, "{meta:?}");
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round_tenths(0.0), 0.0);
        assert_eq!(round_tenths(1.26), 1.3);
        assert_eq!(round_tenths(1.24), 1.2);
    }

    #[test]
    fn timings_serialize_with_field_names() {
        let json = serde_json::to_value(Timings {
            t_search: 0.4,
            t_facts: 1.2,
            t_compose: 0.9,
            t_total: 2.5,
        })
        .unwrap();
        assert_eq!(json["t_total"], 2.5);
        assert_eq!(json["t_search"], 0.4);
    }
}
