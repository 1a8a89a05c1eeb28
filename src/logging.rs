use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{Directive, ParseError};

const DEFAULT_DIRECTIVE: &str = "ferret=info";

/// Who reads the output. `Machine` keeps stderr silent so stdout carries
/// only the answer body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Human,
    Machine,
}

/// Builds the stderr subscriber for `mode`. `RUST_LOG` refines the filter in
/// human mode and is ignored in machine mode.
pub fn subscriber(mode: OutputMode) -> Result<impl Subscriber + Send + Sync, ParseError> {
    let filter = match mode {
        OutputMode::Human => {
            EnvFilter::from_default_env().add_directive(DEFAULT_DIRECTIVE.parse::<Directive>()?)
        }
        OutputMode::Machine => EnvFilter::new("off"),
    };
    Ok(tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .finish())
}

pub fn init(mode: OutputMode) -> Result<(), Box<dyn std::error::Error>> {
    tracing::subscriber::set_global_default(subscriber(mode)?)?;
    Ok(())
}
