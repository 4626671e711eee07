//! Storage collaborators the lookups read from

use crate::core::error::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Key-value blob store holding one JSON document per address, asset or txid.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Value>;
}

/// Content-addressed store holding vote annotations.
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn get(&self, cid: &str, timeout: Duration) -> Result<Value>;
}

/// Deserializes a fetched document, keeping the key in the error.
pub fn parse_document<T: DeserializeOwned>(key: &str, document: Value) -> Result<T> {
    serde_json::from_value(document).map_err(|source| Error::Decode {
        key: key.to_string(),
        source,
    })
}
