//! Reduces the exchange rate publications valid at a height to one rate.
use crate::core::error::{Error, RecordKind, Result};
use crate::core::price::{CURRENCY_LABELS, ExchangeType, PriceDecoder};
use crate::core::records::{AddressRecord, AddressTx, TxRecord};
use crate::core::resolver::{OVERLAP, SortedEntries, Versioned};
use crate::core::store::{RecordStore, parse_document};
use futures::future::try_join_all;
use tracing::{debug, instrument};

/// Hex characters preceding the rate payload in an output script: OP_RETURN,
/// the push opcode and the push length.
const SCRIPT_PREFIX_LEN: usize = 6;

/// A confirmed rate publishing transaction.
#[derive(Debug, Clone, PartialEq)]
struct Publication {
    txid: String,
    height: u64,
}

impl Publication {
    fn from_tx(tx: AddressTx) -> Option<Self> {
        if !tx.is_rate_publication() {
            return None;
        }
        Some(Self {
            height: tx.height?,
            txid: tx.txid,
        })
    }
}

impl Versioned for Publication {
    fn effective_height(&self) -> u64 {
        self.height
    }
}

pub struct ExchangeRateAggregator<'a> {
    records: &'a dyn RecordStore,
    decoder: &'a dyn PriceDecoder,
}

impl<'a> ExchangeRateAggregator<'a> {
    pub fn new(records: &'a dyn RecordStore, decoder: &'a dyn PriceDecoder) -> Self {
        Self { records, decoder }
    }

    /// Returns the lowest rate published for `target` that was valid at
    /// `height`, or the most recent usable rate when `height` is zero.
    ///
    /// When every publication in the window fails to decode, earlier
    /// publications are tried one at a time, newest first.
    #[instrument(
        name = "ExchangeRateAggregate",
        skip(self),
        fields(address = %target.address, index = target.index)
    )]
    pub async fn aggregate(&self, target: &ExchangeType, height: u64) -> Result<f64> {
        let address = &target.address;
        let document = self
            .records
            .get(address)
            .await
            .map_err(|e| e.as_missing(RecordKind::Address, address))?;
        let record: AddressRecord = parse_document(address, document)?;

        let publications: Vec<Publication> = record
            .txs
            .into_iter()
            .filter_map(Publication::from_tx)
            .collect();
        debug!("Found {} rate publications", publications.len());

        let no_data = || Error::NoDataAvailable {
            address: address.clone(),
        };
        if publications.is_empty() {
            return Err(no_data());
        }

        if height == 0 {
            return self
                .first_usable(publications.iter().rev(), target)
                .await?
                .ok_or_else(no_data);
        }

        let publications = SortedEntries::new(publications)?;
        let window = publications.resolve(height, OVERLAP);
        debug!(
            first = window.first,
            candidates = window.entries.len(),
            "Resolved publication window"
        );

        let rates = try_join_all(
            window
                .entries
                .iter()
                .map(|tx| self.decode_rate(&tx.txid, target)),
        )
        .await?;

        if let Some(rate) = lowest(&rates) {
            return Ok(rate);
        }

        debug!("No usable rate inside the window, scanning earlier publications");
        let earlier = publications.as_slice()[..window.first].iter().rev();
        self.first_usable(earlier, target).await?.ok_or_else(no_data)
    }

    /// Decodes `target`'s rate from the publication in transaction `txid`.
    /// NaN when the publication carries no value for that currency.
    pub async fn decode_rate(&self, txid: &str, target: &ExchangeType) -> Result<f64> {
        let document = self
            .records
            .get(txid)
            .await
            .map_err(|e| e.as_missing(RecordKind::Transaction, txid))?;
        let tx: TxRecord = parse_document(txid, document)?;

        let script = &tx
            .vout
            .first()
            .ok_or_else(|| Error::PriceDecode(format!("transaction {txid} has no outputs")))?
            .script_pub_key
            .hex;
        let payload = script.get(SCRIPT_PREFIX_LEN..).ok_or_else(|| {
            Error::PriceDecode(format!("output script of {txid} is too short"))
        })?;

        let rates = self.decoder.decode(&CURRENCY_LABELS, payload)?;
        let rate = rates.get(&target.label()).copied().unwrap_or(f64::NAN);
        debug!(txid, rate, "Decoded publication");
        Ok(rate)
    }

    async fn first_usable<'t>(
        &self,
        publications: impl Iterator<Item = &'t Publication>,
        target: &ExchangeType,
    ) -> Result<Option<f64>> {
        for tx in publications {
            let rate = self.decode_rate(&tx.txid, target).await?;
            if !rate.is_nan() {
                return Ok(Some(rate));
            }
            debug!(txid = %tx.txid, "Skipping publication without a usable rate");
        }
        Ok(None)
    }
}

fn lowest(rates: &[f64]) -> Option<f64> {
    rates
        .iter()
        .copied()
        .filter(|rate| !rate.is_nan())
        .reduce(f64::min)
}
