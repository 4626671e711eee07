//! Exchange rate publications and their decoding

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Address publishing the DigiByte exchange rates.
pub const EXCHANGE_RATE_ADDRESS: &str = "dgb1qunxh378eltj2jrwza5sj9grvu5xud43vqvudwh";

/// Slot labels carried by every rate publication, in payload order.
pub const CURRENCY_LABELS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// A published exchange rate series: the publishing address and the slot
/// within each publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeType {
    pub address: String,
    pub index: usize,
    pub name: String,
}

impl ExchangeType {
    pub fn new(address: &str, index: usize, name: &str) -> Self {
        Self {
            address: address.to_string(),
            index,
            name: name.to_string(),
        }
    }

    pub fn label(&self) -> String {
        self.index.to_string()
    }

    /// Canadian dollar series, slot 0 on [`EXCHANGE_RATE_ADDRESS`].
    pub fn cad() -> Self {
        Self::new(EXCHANGE_RATE_ADDRESS, 0, "CAD")
    }
}

/// Turns a publication payload into rates per label. A currency the
/// publisher could not source decodes to NaN.
pub trait PriceDecoder: Send + Sync {
    fn decode(&self, labels: &[&str], hex_payload: &str) -> Result<HashMap<String, f64>>;
}

impl<F> PriceDecoder for F
where
    F: Fn(&[&str], &str) -> Result<HashMap<String, f64>> + Send + Sync,
{
    fn decode(&self, labels: &[&str], hex_payload: &str) -> Result<HashMap<String, f64>> {
        self(labels, hex_payload)
    }
}
