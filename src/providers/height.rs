use crate::core::error::{Error, Result};
use crate::core::height::HeightOracle;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Asks a block explorer for the chain tip, falling back to the last value
/// it saw (or the configured one) when the explorer is unreachable.
pub struct ExplorerHeightOracle {
    client: reqwest::Client,
    url: Option<String>,
    // 0 means no fallback is known yet.
    fallback: AtomicU64,
}

impl ExplorerHeightOracle {
    pub fn new(url: Option<&str>, fallback: Option<u64>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("chaindata/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Height(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.map(str::to_string),
            fallback: AtomicU64::new(fallback.unwrap_or(0)),
        })
    }

    async fn fetch(&self, url: &str) -> Result<u64> {
        debug!("Requesting chain height from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Height(format!("request to {url} failed: {e}")))?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::Height(format!("failed to read response from {url}: {e}")))?;

        parse_height(&text)
            .ok_or_else(|| Error::Height(format!("unrecognized height response from {url}: '{text}'")))
    }

    fn stored(&self) -> Option<u64> {
        match self.fallback.load(Ordering::Relaxed) {
            0 => None,
            height => Some(height),
        }
    }
}

/// Accepts a bare integer or a JSON object with a `height` or `blocks` field.
fn parse_height(body: &str) -> Option<u64> {
    let body = body.trim();
    if let Ok(height) = body.parse::<u64>() {
        return Some(height);
    }
    let value: Value = serde_json::from_str(body).ok()?;
    ["height", "blocks"]
        .iter()
        .find_map(|field| value.get(field).and_then(Value::as_u64))
}

#[async_trait]
impl HeightOracle for ExplorerHeightOracle {
    async fn current(&self) -> Result<u64> {
        let failure = match &self.url {
            Some(url) => match self.fetch(url).await {
                Ok(height) => {
                    self.fallback.fetch_max(height, Ordering::Relaxed);
                    return Ok(height);
                }
                Err(e) => e,
            },
            None => Error::Height("no height source configured".to_string()),
        };

        match self.stored() {
            Some(height) => {
                warn!(error = %failure, height, "Using stored fallback chain height");
                Ok(height)
            }
            None => Err(failure),
        }
    }
}
