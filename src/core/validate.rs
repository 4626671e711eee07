//! Format checks on identifiers supplied by callers

use crate::core::error::{Error, Result};

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// DigiAsset ids: `L` or `U`, then `a`, `h` or `d`, then 36 base58 characters.
pub fn asset_id(asset_id: &str) -> Result<()> {
    let bytes = asset_id.as_bytes();
    let valid = bytes.len() == 38
        && matches!(bytes[0], b'L' | b'U')
        && matches!(bytes[1], b'a' | b'h' | b'd')
        && asset_id[2..].chars().all(|c| BASE58_ALPHABET.contains(c));

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid asset id: {asset_id}")))
    }
}

pub fn txid(txid: &str) -> Result<()> {
    if txid.len() == 64 && txid.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid txid: {txid}")))
    }
}
