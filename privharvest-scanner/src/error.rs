use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
