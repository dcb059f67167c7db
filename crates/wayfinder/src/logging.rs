#![forbid(unsafe_code)]

//! Subscriber setup for hosts that do not install their own.
//!
//! Filter precedence: a valid `RUST_LOG`, then [`LogConfig::filter`], then
//! [`DEFAULT_LOG_FILTER`]. Output goes to stderr.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub const DEFAULT_LOG_FILTER: &str = "wayfinder=info,wayfinder_tour=info,wayfinder_diff=info";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Directive string in `EnvFilter` syntax.
    pub filter: Option<String>,
    /// One JSON object per line instead of human-readable output.
    pub json: bool,
}

impl LogConfig {
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback_directives(config))?,
    };

    let fmt: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt.with_filter(filter))
        .try_init()?;
    Ok(())
}

/// Directives used when `RUST_LOG` is unset or unparsable.
fn fallback_directives(config: &LogConfig) -> &str {
    config
        .filter
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER)
}
