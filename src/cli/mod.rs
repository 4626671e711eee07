pub mod display;
pub mod setup;
pub mod ui;

use crate::AppCommand;
use crate::lookup::ChainData;
use anyhow::{Context, Result};

/// Runs one lookup and renders its result.
pub async fn execute(data: &ChainData, command: AppCommand) -> Result<String> {
    let spinner = ui::new_spinner(&command.to_string());
    let output = render(data, command).await;
    spinner.finish_and_clear();
    output
}

async fn render(data: &ChainData, command: AppCommand) -> Result<String> {
    match command {
        AppCommand::Address { address } => display::json(&data.get_address(&address).await?),
        AppCommand::Asset { asset_id } => display::json(&data.get_asset(&asset_id).await?),
        AppCommand::Kyc { address } => {
            let kyc = data.get_kyc(&address).await?;
            Ok(display::kyc(&address, kyc.as_ref()))
        }
        AppCommand::Rules { asset_id, height } => {
            let rules = data.get_rules(&asset_id, height).await?;
            Ok(display::rules(&asset_id, height, rules.as_deref()))
        }
        AppCommand::Votes { cid } => Ok(display::votes(&cid, &data.get_votes(&cid).await)),
        AppCommand::Utxo { txid, vout } => Ok(display::utxo(&data.get_utxo(&txid, vout).await?)),
        AppCommand::Rate { exchange, height } => {
            let rate = data
                .get_exchange_rate(&exchange, height)
                .await
                .with_context(|| format!("Error finding exchange rate on {}", exchange.address))?;
            Ok(display::exchange_rate(&exchange, height, rate))
        }
        AppCommand::Height => Ok(display::height(data.current_height().await?)),
    }
}
