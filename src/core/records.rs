//! Record shapes read from the indexing service
//!
//! Only the fields lookups actually read are typed; everything else in a
//! document is kept in an `extra` map so records pass through untouched.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::core::resolver::Versioned;

/// Marker on the `change` field of an exchange rate publishing transaction.
pub const RATE_PUBLICATION_MARKER: &str = "-1000";

/// Unbounded on-chain quantity. Documents carry these as decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(pub u128);

impl Amount {
    pub fn get(self) -> u128 {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s
                .trim()
                .parse::<u128>()
                .map(Amount)
                .map_err(|e| de::Error::custom(format!("invalid amount '{s}': {e}"))),
            Raw::Number(n) => Ok(Amount(u128::from(n))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycState {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One transaction touching an address. Unconfirmed entries have no height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressTx {
    #[serde(default)]
    pub txid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AddressTx {
    /// Only the exact string marker counts; numeric or other changes never do.
    pub fn is_rate_publication(&self) -> bool {
        matches!(&self.change, Some(Value::String(change)) if change == RATE_PUBLICATION_MARKER)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kyc: Option<KycState>,
    #[serde(default)]
    pub txs: Vec<AddressTx>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One revision of an asset's usage rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRules {
    pub effective: u64,
    #[serde(default)]
    pub rewritable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub royalties: Option<BTreeMap<String, Amount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deflate: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Versioned for AssetRules {
    fn effective_height(&self) -> u64 {
        self.effective
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<AssetRules>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    pub hex: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAmount {
    #[serde(rename = "assetId")]
    pub asset_id: String,
    pub amount: Amount,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Amount,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<AssetAmount>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxRecord {
    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    #[serde(flatten)]
    pub output: TxOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub address: String,
    pub label: String,
}
