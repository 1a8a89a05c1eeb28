mod cli;
mod logging;
mod ollama;
mod pipeline;
mod search;

pub const USER_AGENT: &str = concat!("ferret/", env!("CARGO_PKG_VERSION"));

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::{debug, info};

use cli::{Args, Settings};
use ollama::OllamaClient;
use pipeline::{PipelineRequest, finish_line};
use search::DuckDuckGo;

/// TCP connection establishment timeout for every outbound request.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const USAGE_EXIT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Args::parse().into_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(USAGE_EXIT);
        }
    };

    if let Err(e) = logging::init(settings.mode) {
        eprintln!("error: failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match answer(&settings).await {
        Ok(body) => {
            print!("{}", finish_line(&body));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn answer(settings: &Settings) -> Result<String, Box<dyn std::error::Error>> {
    let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let model_client = OllamaClient::from_env(http.clone(), settings.timeout);
    let provider = DuckDuckGo::new(http);

    info!(
        host = model_client.host(),
        timeout_secs = settings.timeout.as_secs_f64(),
        keep_alive = settings.keep_alive.as_deref().unwrap_or("none"),
        "setup"
    );
    info!(query = %settings.query, "pipeline start");

    let request = PipelineRequest {
        query: &settings.query,
        keep_alive: settings.keep_alive.as_deref(),
        model_researcher: &settings.model,
        model_final: &settings.final_model,
        max_results: settings.max_results,
    };
    let result = pipeline::run(&model_client, &provider, &request).await?;

    debug!(timings = %serde_json::to_string(&result.meta)?, "stage timings");
    info!(t_total = result.meta.t_total, "pipeline complete");

    Ok(result.body)
}
