//! Read-only lookups over the indexed chain data.

use crate::core::error::{Error, RecordKind, Result};
use crate::core::exchange::ExchangeRateAggregator;
use crate::core::height::HeightOracle;
use crate::core::price::{ExchangeType, PriceDecoder};
use crate::core::records::{AddressRecord, AssetRecord, AssetRules, KycState, TxRecord, Utxo, Vote};
use crate::core::resolver::{OVERLAP, SortedEntries};
use crate::core::store::{RecordStore, VoteStore, parse_document};
use crate::core::validate;
use crate::providers::height::ExplorerHeightOracle;
use crate::providers::ipfs_votes::{DEFAULT_IPFS_API, IpfsVoteStore};
use crate::providers::price_decoder::SlotPriceDecoder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_VOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Entry point for every lookup. Collaborators are injected through
/// [`ChainDataBuilder`]; without a record store every record lookup fails
/// with [`Error::Uninitialized`].
pub struct ChainData {
    records: Option<Arc<dyn RecordStore>>,
    votes: Arc<dyn VoteStore>,
    decoder: Arc<dyn PriceDecoder>,
    height: Arc<dyn HeightOracle>,
    vote_timeout: Duration,
}

#[derive(Default)]
pub struct ChainDataBuilder {
    records: Option<Arc<dyn RecordStore>>,
    votes: Option<Arc<dyn VoteStore>>,
    decoder: Option<Arc<dyn PriceDecoder>>,
    height: Option<Arc<dyn HeightOracle>>,
    vote_timeout: Option<Duration>,
}

impl ChainDataBuilder {
    pub fn record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.records = Some(store);
        self
    }

    pub fn vote_store(mut self, store: Arc<dyn VoteStore>) -> Self {
        self.votes = Some(store);
        self
    }

    pub fn price_decoder(mut self, decoder: Arc<dyn PriceDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn height_oracle(mut self, oracle: Arc<dyn HeightOracle>) -> Self {
        self.height = Some(oracle);
        self
    }

    pub fn vote_timeout(mut self, timeout: Duration) -> Self {
        self.vote_timeout = Some(timeout);
        self
    }

    /// Fills unset collaborators with a local IPFS node, the slot decoder and
    /// a height oracle without a network source.
    pub fn build(self) -> Result<ChainData> {
        let votes = match self.votes {
            Some(votes) => votes,
            None => Arc::new(IpfsVoteStore::new(DEFAULT_IPFS_API)?),
        };
        let height = match self.height {
            Some(height) => height,
            None => Arc::new(ExplorerHeightOracle::new(None, None)?),
        };
        Ok(ChainData {
            records: self.records,
            votes,
            decoder: self
                .decoder
                .unwrap_or_else(|| Arc::new(SlotPriceDecoder::new())),
            height,
            vote_timeout: self.vote_timeout.unwrap_or(DEFAULT_VOTE_TIMEOUT),
        })
    }
}

#[derive(Deserialize)]
struct VoteDocument {
    #[serde(default)]
    votes: Vec<Vote>,
}

impl ChainData {
    pub fn builder() -> ChainDataBuilder {
        ChainDataBuilder::default()
    }

    fn records(&self) -> Result<&dyn RecordStore> {
        self.records.as_deref().ok_or(Error::Uninitialized)
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &str, kind: RecordKind) -> Result<T> {
        let document = self
            .records()?
            .get(key)
            .await
            .map_err(|e| e.as_missing(kind, key))?;
        parse_document(key, document)
    }

    #[instrument(skip(self))]
    pub async fn get_address(&self, address: &str) -> Result<AddressRecord> {
        self.fetch(address, RecordKind::Address).await
    }

    #[instrument(skip(self))]
    pub async fn get_asset(&self, asset_id: &str) -> Result<AssetRecord> {
        validate::asset_id(asset_id)?;
        self.fetch(asset_id, RecordKind::Asset).await
    }

    /// KYC state of an address; `None` when the address never verified.
    #[instrument(skip(self))]
    pub async fn get_kyc(&self, address: &str) -> Result<Option<KycState>> {
        Ok(self.get_address(address).await?.kyc)
    }

    /// Rule revisions of an asset in force at `height` (zero for the latest).
    /// `None` when the asset has no rules at all.
    #[instrument(skip(self))]
    pub async fn get_rules(
        &self,
        asset_id: &str,
        height: u64,
    ) -> Result<Option<Vec<AssetRules>>> {
        let Some(rules) = self.get_asset(asset_id).await?.rules else {
            debug!("Asset has no rules");
            return Ok(None);
        };
        if rules.is_empty() {
            return Ok(Some(rules));
        }

        let rules = SortedEntries::new(rules)?;
        let window = rules.resolve(height, OVERLAP);
        debug!(
            first = window.first,
            valid = window.entries.len(),
            "Resolved rule revisions"
        );
        Ok(Some(window.entries.to_vec()))
    }

    /// Votes attached to an asset's metadata. Votes are informational only,
    /// so any failure yields an empty list.
    #[instrument(skip(self))]
    pub async fn get_votes(&self, cid: &str) -> Vec<Vote> {
        let document = match self.votes.get(cid, self.vote_timeout).await {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Vote lookup failed");
                return Vec::new();
            }
        };
        match serde_json::from_value::<VoteDocument>(document) {
            Ok(document) => document.votes,
            Err(e) => {
                warn!(error = %e, "Vote document malformed");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_utxo(&self, txid: &str, vout: u32) -> Result<Utxo> {
        validate::txid(txid)?;
        let key = format!("{txid}:{vout}");

        let tx: TxRecord = self
            .fetch(txid, RecordKind::Utxo)
            .await
            .map_err(|e| e.as_missing(RecordKind::Utxo, &key))?;
        let output = tx
            .vout
            .into_iter()
            .nth(vout as usize)
            .ok_or_else(|| Error::not_found(RecordKind::Utxo, &key))?;

        Ok(Utxo {
            txid: txid.to_string(),
            vout,
            output,
        })
    }

    /// Lowest rate for `exchange` valid at `height`, or the most recent one
    /// when `height` is zero.
    pub async fn get_exchange_rate(&self, exchange: &ExchangeType, height: u64) -> Result<f64> {
        ExchangeRateAggregator::new(self.records()?, self.decoder.as_ref())
            .aggregate(exchange, height)
            .await
    }

    pub async fn current_height(&self) -> Result<u64> {
        self.height.current().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryRecordStore;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    const ASSET_ID: &str = "La5fMQh1m8tbaBNDmyvh8Ug3f2Bd85nVbcrDvb";
    const ADDRESS: &str = "dgb1qexampleaddress";

    fn txid() -> String {
        "cd".repeat(32)
    }

    fn chain_data(store: MemoryRecordStore) -> ChainData {
        let store = Arc::new(store);
        ChainData::builder()
            .record_store(store.clone())
            .vote_store(store)
            .build()
            .unwrap()
    }

    fn fixture_store() -> MemoryRecordStore {
        MemoryRecordStore::from_iter([
            (
                ADDRESS.to_string(),
                json!({
                    "kyc": {"country": "CAN", "name": "Jane Doe", "hash": "abc"},
                    "txs": [],
                    "balance": "10"
                }),
            ),
            (
                ASSET_ID.to_string(),
                json!({
                    "cid": "bafyasset",
                    "rules": [
                        {"effective": 12000000, "rewritable": true, "deflate": "10"},
                        {"effective": 12626881, "rewritable": false,
                         "royalties": {"dgb1qroyalty": "100000000"}}
                    ]
                }),
            ),
            (
                txid(),
                json!({"vout": [
                    {"value": "1000", "scriptPubKey": {"hex": "0014aa"}},
                    {"value": "18446744073709551616", "scriptPubKey": {"hex": "0014bb"},
                     "assets": [{"assetId": ASSET_ID, "amount": "5"}]}
                ]}),
            ),
            (
                "bafyvotes".to_string(),
                json!({"votes": [{"address": "dgb1qyes", "label": "Yes"}]}),
            ),
        ])
    }

    #[tokio::test]
    async fn test_unconfigured_record_store() {
        let data = ChainData::builder().build().unwrap();
        assert!(matches!(
            data.get_address(ADDRESS).await,
            Err(Error::Uninitialized)
        ));
        assert!(matches!(
            data.get_exchange_rate(&ExchangeType::cad(), 0).await,
            Err(Error::Uninitialized)
        ));
        // Identifier validation still happens first.
        assert!(matches!(
            data.get_asset("bad").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_address_and_kyc() {
        let data = chain_data(fixture_store());

        let record = data.get_address(ADDRESS).await.unwrap();
        assert_eq!(record.extra["balance"], "10");

        let kyc = data.get_kyc(ADDRESS).await.unwrap().unwrap();
        assert_eq!(kyc.country.as_deref(), Some("CAN"));

        let err = data.get_kyc("dgb1qmissing").await.unwrap_err();
        assert_eq!(err.to_string(), "address does not exist: dgb1qmissing");
    }

    #[tokio::test]
    async fn test_address_with_unconfirmed_and_numeric_txs() {
        let store = MemoryRecordStore::from_iter([(
            ADDRESS,
            json!({
                "kyc": {"country": "CAN", "revoked": 12650000},
                "txs": [
                    {"txid": "mempool", "change": "5"},
                    {"txid": "aa", "height": 120, "change": 2500}
                ]
            }),
        )]);
        let data = chain_data(store);

        let record = data.get_address(ADDRESS).await.unwrap();
        assert_eq!(record.txs.len(), 2);
        let kyc = data.get_kyc(ADDRESS).await.unwrap().unwrap();
        assert_eq!(kyc.revoked, Some(json!(12650000)));
    }

    #[tokio::test]
    async fn test_address_without_kyc() {
        let store = MemoryRecordStore::from_iter([(ADDRESS, json!({"txs": []}))]);
        let data = chain_data(store);
        assert!(data.get_kyc(ADDRESS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_asset_lookup() {
        let data = chain_data(fixture_store());

        let asset = data.get_asset(ASSET_ID).await.unwrap();
        assert_eq!(asset.cid.as_deref(), Some("bafyasset"));

        let other = "Ua5fMQh1m8tbaBNDmyvh8Ug3f2Bd85nVbcrDvb";
        let err = data.get_asset(other).await.unwrap_err();
        assert_eq!(err.to_string(), format!("asset does not exist: {other}"));
    }

    #[tokio::test]
    async fn test_latest_rules() {
        let data = chain_data(fixture_store());

        let rules = data.get_rules(ASSET_ID, 0).await.unwrap().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].effective, 12626881);
        assert!(!rules[0].rewritable);
    }

    #[tokio::test]
    async fn test_rules_at_height() {
        let data = chain_data(fixture_store());

        let rules = data.get_rules(ASSET_ID, 12100000).await.unwrap().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].deflate.map(|d| d.get()), Some(10));

        // Inside the overlap both revisions are in force.
        let rules = data.get_rules(ASSET_ID, 12626881 + 100).await.unwrap().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[1].royalties.as_ref().unwrap()["dgb1qroyalty"].get(),
            100_000_000
        );

        let rules = data.get_rules(ASSET_ID, 11000000).await.unwrap().unwrap();
        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn test_asset_without_rules() {
        let store = MemoryRecordStore::from_iter([(ASSET_ID, json!({"cid": "x"}))]);
        let data = chain_data(store);
        assert!(data.get_rules(ASSET_ID, 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_utxo_lookup() {
        let data = chain_data(fixture_store());

        let utxo = data.get_utxo(&txid(), 1).await.unwrap();
        assert_eq!(utxo.vout, 1);
        assert_eq!(utxo.txid, txid());
        assert_eq!(utxo.output.value.get(), 18_446_744_073_709_551_616);
        assert_eq!(utxo.output.assets.unwrap()[0].amount.get(), 5);

        let err = data.get_utxo(&txid(), 2).await.unwrap_err();
        assert_eq!(err.to_string(), format!("utxo does not exist: {}:2", txid()));

        let missing = "ef".repeat(32);
        let err = data.get_utxo(&missing, 0).await.unwrap_err();
        assert_eq!(err.to_string(), format!("utxo does not exist: {missing}:0"));

        assert!(matches!(
            data.get_utxo("xyz", 0).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_votes() {
        let data = chain_data(fixture_store());

        let votes = data.get_votes("bafyvotes").await;
        assert_eq!(
            votes,
            vec![Vote {
                address: "dgb1qyes".to_string(),
                label: "Yes".to_string()
            }]
        );

        assert!(data.get_votes("bafymissing").await.is_empty());
    }

    struct MalformedVotes;

    #[async_trait]
    impl VoteStore for MalformedVotes {
        async fn get(&self, _cid: &str, _timeout: Duration) -> Result<Value> {
            Ok(json!({"votes": "not a list"}))
        }
    }

    #[tokio::test]
    async fn test_malformed_votes_are_ignored() {
        let data = ChainData::builder()
            .vote_store(Arc::new(MalformedVotes))
            .build()
            .unwrap();
        assert!(data.get_votes("bafy").await.is_empty());
    }

    struct FixedHeight(u64);

    #[async_trait]
    impl HeightOracle for FixedHeight {
        async fn current(&self) -> Result<u64> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_current_height() {
        let data = ChainData::builder()
            .height_oracle(Arc::new(FixedHeight(12648500)))
            .build()
            .unwrap();
        assert_eq!(data.current_height().await.unwrap(), 12648500);
    }
}
