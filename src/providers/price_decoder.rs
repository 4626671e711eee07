use crate::core::error::{Error, Result};
use crate::core::price::PriceDecoder;
use std::collections::HashMap;
use tracing::debug;

const SLOT_BYTES: usize = 8;

/// Decodes publications laid out as one big-endian `f64` per label, in label
/// order. Slots that are missing, non-finite or not positive mean the
/// publisher had no price for that currency.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotPriceDecoder;

impl SlotPriceDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Builds the payload `decode` expects. Used by fixtures and tests.
    pub fn encode(rates: &[f64]) -> String {
        let bytes: Vec<u8> = rates.iter().flat_map(|rate| rate.to_be_bytes()).collect();
        hex::encode(bytes)
    }
}

impl PriceDecoder for SlotPriceDecoder {
    fn decode(&self, labels: &[&str], hex_payload: &str) -> Result<HashMap<String, f64>> {
        let bytes = hex::decode(hex_payload.trim())
            .map_err(|e| Error::PriceDecode(format!("invalid hex payload: {e}")))?;
        if bytes.len() % SLOT_BYTES != 0 {
            return Err(Error::PriceDecode(format!(
                "payload of {} bytes is not a whole number of rate slots",
                bytes.len()
            )));
        }

        let slots: Vec<f64> = bytes
            .chunks_exact(SLOT_BYTES)
            .map(|chunk| {
                let mut raw = [0u8; SLOT_BYTES];
                raw.copy_from_slice(chunk);
                f64::from_be_bytes(raw)
            })
            .collect();
        debug!("Decoded {} rate slots for {} labels", slots.len(), labels.len());

        Ok(labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let rate = slots
                    .get(i)
                    .copied()
                    .filter(|r| r.is_finite() && *r > 0.0)
                    .unwrap_or(f64::NAN);
                (label.to_string(), rate)
            })
            .collect())
    }
}
