use std::time::Duration;

use clap::Parser;

use crate::logging::OutputMode;

pub const DEFAULT_MODEL: &str = "internet_anarchist";

/// Research a question: web search, fact extraction, then a composed answer.
#[derive(Debug, Parser)]
#[command(name = "ferret", version, about)]
pub struct Args {
    /// Question to research
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Model used for both fact extraction and composition
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Different model for composing the final answer (default: --model)
    #[arg(long = "final_model")]
    pub final_model: Option<String>,

    /// HTTP timeout for model calls, in seconds
    #[arg(long, default_value_t = 110.0)]
    pub timeout: f64,

    /// Keep models warm on the daemon, e.g. "20m" or "1h"; "0" disables
    #[arg(long, default_value = "20m")]
    pub keepalive: String,

    /// Number of search results to fetch
    #[arg(long = "max_results", default_value_t = 6)]
    pub max_results: usize,

    /// Print only the final markdown (no logs)
    #[arg(long)]
    pub machine: bool,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UsageError {
    #[error("empty query")]
    EmptyQuery,

    #[error("invalid --timeout {0}: must be a positive number of seconds")]
    InvalidTimeout(f64),
}

/// Validated run configuration derived from `Args`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub query: String,
    pub model: String,
    pub final_model: String,
    pub timeout: Duration,
    pub keep_alive: Option<String>,
    pub max_results: usize,
    pub mode: OutputMode,
}

impl Args {
    pub fn into_settings(self) -> Result<Settings, UsageError> {
        let query = self.query.join(" ").trim().to_string();
        if query.is_empty() {
            return Err(UsageError::EmptyQuery);
        }

        let timeout = Duration::try_from_secs_f64(self.timeout)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or(UsageError::InvalidTimeout(self.timeout))?;

        let final_model = self
            .final_model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.model.clone());

        Ok(Settings {
            query,
            model: self.model,
            final_model,
            timeout,
            keep_alive: normalize_keep_alive(&self.keepalive),
            max_results: self.max_results,
            mode: if self.machine {
                OutputMode::Machine
            } else {
                OutputMode::Human
            },
        })
    }
}

/// `"0"`, `"false"`, `"False"`, and `""` mean "do not keep the model resident".
pub fn normalize_keep_alive(value: &str) -> Option<String> {
    match value {
        "0" | "false" | "False" | "" => None,
        other => Some(other.to_string()),
    }
}
