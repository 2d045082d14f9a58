use privharvest_scanner::ScanError;
use std::path::PathBuf;
use thiserror::Error;

/// Bad user input to the registration tool. Reported and re-prompted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Phone number must be exactly 10 digits (got {digits})")]
    PhoneLength { digits: usize },

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Both phone number(s) and email are required")]
    Incomplete,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("console I/O failed: {0}")]
    Console(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tool '{tool}' references unknown category '{slug}'")]
    UnknownCategory { tool: String, slug: String },

    #[error("missing store credential: set {0}")]
    MissingCredential(&'static str),

    #[error("Invalid store URL {url}: {reason}")]
    InvalidStoreUrl { url: String, reason: String },

    #[error("request to {table} failed: {source}")]
    StoreRequest {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{table} rejected request with HTTP {status}: {body}")]
    StoreStatus {
        table: String,
        status: u16,
        body: String,
    },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
