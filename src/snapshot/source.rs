use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};

/// Where fresh copies of the snapshot come from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Short label for logs.
    fn describe(&self) -> String;

    /// Fetch the complete database file. One attempt, no retries.
    async fn fetch(&self) -> Result<Vec<u8>>;
}

pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| AppError::Config(format!("invalid snapshot url: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!("news-snapshot-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self.client.get(self.url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let bytes = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), self.url);
        Ok(bytes.to_vec())
    }
}
