use crate::core::error::{Error, RecordKind, Result};
use crate::core::store::{RecordStore, VoteStore};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// In-memory document store, keyed like the blob store.
#[derive(Default)]
pub struct MemoryRecordStore {
    documents: RwLock<HashMap<String, Value>>,
    reads: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, document: Value) {
        let key = key.into();
        debug!("Memory store PUT for key: {}", key);
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, document);
    }

    /// Number of `get` calls served so far, hits and misses alike.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn lookup(&self, key: &str) -> Result<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        match documents.get(key) {
            Some(document) => {
                debug!("Memory store HIT for key: {}", key);
                Ok(document.clone())
            }
            None => {
                debug!("Memory store MISS for key: {}", key);
                Err(Error::not_found(RecordKind::Record, key))
            }
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for MemoryRecordStore {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let store = Self::new();
        for (key, document) in iter {
            store.insert(key, document);
        }
        store
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, key: &str) -> Result<Value> {
        self.lookup(key)
    }
}

#[async_trait]
impl VoteStore for MemoryRecordStore {
    async fn get(&self, cid: &str, _timeout: Duration) -> Result<Value> {
        self.lookup(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_hit_and_miss() {
        let store = MemoryRecordStore::from_iter([("key1", json!({"a": 1}))]);

        let document = RecordStore::get(&store, "key1").await.unwrap();
        assert_eq!(document["a"], 1);

        let err = RecordStore::get(&store, "key2").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "record does not exist: key2");
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_insert_replaces_document() {
        let store = MemoryRecordStore::new();
        store.insert("key1", json!(1));
        store.insert("key1", json!(2));
        assert_eq!(RecordStore::get(&store, "key1").await.unwrap(), json!(2));
    }

    #[tokio::test]
    async fn test_serves_votes_by_cid() {
        let store = MemoryRecordStore::from_iter([("bafycid", json!({"votes": []}))]);
        let document = VoteStore::get(&store, "bafycid", Duration::from_millis(10))
            .await
            .unwrap();
        assert!(document["votes"].as_array().unwrap().is_empty());
    }
}
