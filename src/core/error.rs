//! Error taxonomy shared by every lookup

use std::fmt::Display;
use thiserror::Error;

/// What kind of record a missing key was looked up as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Record,
    Address,
    Asset,
    Transaction,
    Utxo,
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RecordKind::Record => "record",
                RecordKind::Address => "address",
                RecordKind::Asset => "asset",
                RecordKind::Transaction => "transaction",
                RecordKind::Utxo => "utxo",
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} does not exist: {key}")]
    NotFound { kind: RecordKind, key: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no valid exchange rate found on {address}")]
    NoDataAvailable { address: String },

    #[error("record store not initialized")]
    Uninitialized,

    #[error("access denied for {key}: the bucket requires signed requests")]
    AccessDenied { key: String },

    #[error("request failed for {key}: {source}")]
    Transport {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse record {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode price payload: {0}")]
    PriceDecode(String),

    #[error("chain height unavailable: {0}")]
    Height(String),
}

impl Error {
    pub fn not_found(kind: RecordKind, key: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Re-labels a store level `NotFound` with the kind the caller asked for.
    pub fn as_missing(self, kind: RecordKind, key: &str) -> Self {
        match self {
            Error::NotFound { .. } => Error::not_found(kind, key),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_embeds_key() {
        let err = Error::not_found(RecordKind::Address, "dgb1qxyz");
        assert_eq!(err.to_string(), "address does not exist: dgb1qxyz");
    }

    #[test]
    fn test_as_missing_relabels_only_not_found() {
        let err = Error::not_found(RecordKind::Record, "abc").as_missing(RecordKind::Asset, "abc");
        assert_eq!(err.to_string(), "asset does not exist: abc");

        let err = Error::Uninitialized.as_missing(RecordKind::Asset, "abc");
        assert!(matches!(err, Error::Uninitialized));
    }
}
