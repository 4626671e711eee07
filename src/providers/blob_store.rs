use crate::core::error::{Error, RecordKind, Result};
use crate::core::store::RecordStore;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Requester-pays buckets refuse reads without this parameter. It is part of
/// the query so the signature covers it.
const REQUEST_PAYER_PARAM: &str = "x-amz-request-payer";

/// Lifetime of each presigned URL.
const SIGNATURE_TTL: Duration = Duration::from_secs(60);

/// Reads chain records from an S3-compatible bucket, one JSON document per
/// key at `{base_url}/{bucket}/{key}`. Requests are presigned with SigV4 when
/// credentials are set and sent anonymously otherwise.
pub struct BlobRecordStore {
    client: reqwest::Client,
    bucket: Bucket,
    credentials: Option<Credentials>,
}

impl BlobRecordStore {
    pub fn new(base_url: &str, bucket: &str, region: &str) -> Result<Self> {
        let endpoint = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            Error::InvalidInput(format!("record store url {base_url}: {e}"))
        })?;
        let bucket = Bucket::new(
            endpoint,
            UrlStyle::Path,
            bucket.trim_matches('/').to_string(),
            region.to_string(),
        )
        .map_err(|e| Error::InvalidInput(format!("record store bucket {bucket}: {e}")))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("chaindata/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Transport {
                key: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            bucket,
            credentials: None,
        })
    }

    pub fn with_credentials(mut self, access_key_id: &str, secret_access_key: &str) -> Self {
        self.credentials = Some(Credentials::new(access_key_id, secret_access_key));
        self
    }

    /// Uses `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// `AWS_SESSION_TOKEN` when they are set.
    pub fn with_env_credentials(mut self) -> Self {
        if let Some(credentials) = Credentials::from_env() {
            debug!("Using record store credentials from the environment");
            self.credentials = Some(credentials);
        }
        self
    }

    pub fn is_signed(&self) -> bool {
        self.credentials.is_some()
    }

    fn url_for(&self, key: &str) -> Url {
        let mut action = self.bucket.get_object(self.credentials.as_ref(), key);
        action.query_mut().insert(REQUEST_PAYER_PARAM, "requester");
        action.sign(SIGNATURE_TTL)
    }
}

#[async_trait]
impl RecordStore for BlobRecordStore {
    #[instrument(name = "BlobRecordFetch", skip(self), fields(key = %key, signed = self.is_signed()))]
    async fn get(&self, key: &str) -> Result<Value> {
        let url = self.url_for(key);
        debug!("Requesting record from {}", url.path());

        let transport = |source| Error::Transport {
            key: key.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("Record not found");
                return Err(Error::not_found(RecordKind::Record, key));
            }
            // Signed callers without list permission see 403 for absent keys.
            StatusCode::FORBIDDEN if self.is_signed() => {
                debug!(status = %response.status(), "Record not found");
                return Err(Error::not_found(RecordKind::Record, key));
            }
            StatusCode::FORBIDDEN => {
                return Err(Error::AccessDenied {
                    key: key.to_string(),
                });
            }
            _ => {}
        }

        let response = response.error_for_status().map_err(transport)?;
        let text = response.text().await.map_err(transport)?;

        serde_json::from_str(&text).map_err(|source| Error::Decode {
            key: key.to_string(),
            source,
        })
    }
}
