//! Lookup abstractions, record shapes and the validity logic over them

pub mod config;
pub mod error;
pub mod exchange;
pub mod height;
pub mod log;
pub mod price;
pub mod records;
pub mod resolver;
pub mod store;
pub mod validate;

// Re-export main types for cleaner imports
pub use error::{Error, RecordKind, Result};
pub use exchange::ExchangeRateAggregator;
pub use height::HeightOracle;
pub use price::{ExchangeType, PriceDecoder};
pub use resolver::{OVERLAP, SortedEntries, Versioned, Window};
pub use store::{RecordStore, VoteStore};
