use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Serialization format for the output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per line.
    Jsonl,
    /// Tabular rows with a fixed header, nested fields flattened.
    Csv,
}

impl OutputFormat {
    /// File extension used for output file naming.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error)]
#[error("unknown output format {0:?} (expected \"jsonl\" or \"csv\")")]
pub struct ParseFormatError(String);

impl FromStr for OutputFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// Runtime configuration for a collection run.
///
/// Loaded from environment variables by [`crate::config::load_app_config`];
/// individual values may then be overridden by CLI flags.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Minimum wall-clock gap between the completion of one request and the
    /// start of the next, across the whole run.
    pub request_delay_ms: u64,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Identifying client string sent with every request.
    pub user_agent: String,
    /// Additional attempts after the first failure of a transient request.
    pub max_retries: u32,
    /// Base delay for exponential retry backoff.
    pub retry_backoff_base_secs: u64,
    pub output_format: OutputFormat,
    /// Directory that receives the timestamped output file.
    pub output_dir: PathBuf,
    /// Base URL for the international product pages.
    pub world_base_url: String,
    /// Base URL for the French mirror, tried when the international page does
    /// not resolve to a product.
    pub french_base_url: String,
}
