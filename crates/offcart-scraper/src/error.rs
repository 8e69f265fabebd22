use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid input line {line:?}: {reason}")]
    InvalidInput { line: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("product not found: {url}")]
    NotFound { url: String },

    #[error("rate limited at {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("unexpected content-type {content_type:?} from {url}")]
    UnexpectedContentType { url: String, content_type: String },

    #[error("failed to write output to {path}: {source}")]
    Sink {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
