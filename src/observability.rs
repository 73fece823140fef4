//! Tracing subscriber setup for the binary.

use std::str::FromStr;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::errors::ScanError;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ScanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ScanError::Configuration(format!(
                "unknown log format {other:?} (expected pretty or json)"
            ))),
        }
    }
}

/// Install the global subscriber. Filtering follows `RUST_LOG`, default `info`.
/// Logs go to stderr so stdout carries only scan documents.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))
}
