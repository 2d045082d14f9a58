use crate::error::{Result, ScanError};
use reqwest::Client;
use std::future::Future;
use std::time::Instant;
use tracing::debug;

pub const USER_AGENT: &str = concat!("privharvest/", env!("CARGO_PKG_VERSION"));

/// Retrieves one document as text. Implementations perform a single attempt
/// and report non-success statuses as errors.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScanError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ScanError::Fetch {
            url: url.to_string(),
            source,
        })?;

        debug!(
            "Fetched {} ({} bytes in {:?})",
            url,
            body.len(),
            start.elapsed()
        );
        Ok(body)
    }
}
