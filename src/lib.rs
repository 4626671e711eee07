pub mod cli;
pub mod core;
pub mod lookup;
pub mod providers;
pub mod store;

pub use crate::core::error::{Error, Result};
pub use lookup::{ChainData, ChainDataBuilder};

use crate::core::config::AppConfig;
use crate::core::price::ExchangeType;
use crate::providers::{BlobRecordStore, ExplorerHeightOracle, IpfsVoteStore};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Address { address: String },
    Asset { asset_id: String },
    Kyc { address: String },
    Rules { asset_id: String, height: u64 },
    Votes { cid: String },
    Utxo { txid: String, vout: u32 },
    Rate { exchange: ExchangeType, height: u64 },
    Height,
}

impl Display for AppCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppCommand::Address { address } => write!(f, "Looking up address {address}"),
            AppCommand::Asset { asset_id } => write!(f, "Looking up asset {asset_id}"),
            AppCommand::Kyc { address } => write!(f, "Looking up KYC for {address}"),
            AppCommand::Rules { asset_id, .. } => write!(f, "Resolving rules of {asset_id}"),
            AppCommand::Votes { cid } => write!(f, "Fetching votes from {cid}"),
            AppCommand::Utxo { txid, vout } => write!(f, "Looking up {txid}:{vout}"),
            AppCommand::Rate { exchange, .. } => {
                write!(f, "Resolving {} exchange rate", exchange.name)
            }
            AppCommand::Height => write!(f, "Fetching chain height"),
        }
    }
}

/// Wires the configured collaborators into a [`ChainData`].
pub fn chain_data_from_config(config: &AppConfig) -> anyhow::Result<ChainData> {
    let mut builder = ChainData::builder()
        .vote_store(Arc::new(IpfsVoteStore::new(&config.vote_store.api_url)?))
        .vote_timeout(config.vote_store.timeout())
        .height_oracle(Arc::new(ExplorerHeightOracle::new(
            config.height.url.as_deref(),
            config.height.fallback,
        )?));

    match &config.record_store {
        Some(record_store) => {
            let store = BlobRecordStore::new(
                &record_store.base_url,
                &record_store.bucket,
                &record_store.region,
            )?;
            let store = match record_store.credentials()? {
                Some((access_key_id, secret_access_key)) => {
                    store.with_credentials(access_key_id, secret_access_key)
                }
                None => store.with_env_credentials(),
            };
            if !store.is_signed() {
                warn!("No record store credentials, requests will be unsigned");
            }
            builder = builder.record_store(Arc::new(store));
        }
        None => debug!("No record store configured"),
    }

    Ok(builder.build()?)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> anyhow::Result<()> {
    info!("chaindata starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data = chain_data_from_config(&config)?;
    let output = cli::execute(&data, command).await?;
    println!("{output}");
    Ok(())
}
