//! Renders lookup results for the terminal.

use super::ui;
use crate::core::price::ExchangeType;
use crate::core::records::{AssetRules, KycState, Utxo, Vote};
use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;
use serde_json::Value;

pub fn json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn kyc(address: &str, kyc: Option<&KycState>) -> String {
    let Some(kyc) = kyc else {
        return format!(
            "{} {}",
            ui::style_text(address, ui::StyleType::Label),
            ui::style_text("has no KYC", ui::StyleType::Subtle)
        );
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Country"),
        ui::header_cell("Name"),
        ui::header_cell("Hash"),
        ui::header_cell("Revoked"),
    ]);
    table.add_row(vec![
        Cell::new(kyc.country.as_deref().unwrap_or("N/A")),
        Cell::new(kyc.name.as_deref().unwrap_or("N/A")),
        Cell::new(kyc.hash.as_deref().unwrap_or("N/A")),
        ui::format_optional_cell(kyc.revoked.as_ref(), plain_value),
    ]);

    format!(
        "KYC: {}\n\n{}",
        ui::style_text(address, ui::StyleType::Title),
        table
    )
}

/// JSON scalar without string quotes.
fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn rules(asset_id: &str, height: u64, rules: Option<&[AssetRules]>) -> String {
    let at = if height == 0 {
        "latest".to_string()
    } else {
        format!("height {height}")
    };
    let Some(rules) = rules else {
        return format!(
            "{} {}",
            ui::style_text(asset_id, ui::StyleType::Label),
            ui::style_text("has no rules", ui::StyleType::Subtle)
        );
    };
    if rules.is_empty() {
        return format!(
            "{} {}",
            ui::style_text(asset_id, ui::StyleType::Label),
            ui::style_text(&format!("has no rules in force at {at}"), ui::StyleType::Error)
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Effective"),
        ui::header_cell("Rewritable"),
        ui::header_cell("Deflate"),
        ui::header_cell("Royalties"),
    ]);

    for rule in rules {
        let royalties = rule.royalties.as_ref().map(|royalties| {
            royalties
                .iter()
                .map(|(address, amount)| format!("{address}: {amount}"))
                .collect::<Vec<_>>()
                .join("\n")
        });
        table.add_row(vec![
            ui::amount_cell(rule.effective.to_string()),
            Cell::new(if rule.rewritable { "yes" } else { "no" }),
            ui::format_optional_cell(rule.deflate, |d| d.to_string()),
            ui::format_optional_cell(royalties, |r| r),
        ]);
    }

    format!(
        "Rules: {} ({at})\n\n{}",
        ui::style_text(asset_id, ui::StyleType::Title),
        table
    )
}

pub fn utxo(utxo: &Utxo) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Value"),
        ui::amount_cell(utxo.output.value.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Addresses"),
        Cell::new(utxo.output.script_pub_key.addresses.join("\n")),
    ]);
    table.add_row(vec![
        Cell::new("Script"),
        Cell::new(&utxo.output.script_pub_key.hex),
    ]);
    for asset in utxo.output.assets.iter().flatten() {
        table.add_row(vec![
            Cell::new(&asset.asset_id),
            ui::amount_cell(asset.amount.to_string()),
        ]);
    }

    format!(
        "UTXO: {}\n\n{}",
        ui::style_text(&format!("{}:{}", utxo.txid, utxo.vout), ui::StyleType::Title),
        table
    )
}

pub fn votes(cid: &str, votes: &[Vote]) -> String {
    if votes.is_empty() {
        return format!(
            "{} {}",
            ui::style_text(cid, ui::StyleType::Label),
            ui::style_text("has no votes", ui::StyleType::Subtle)
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Label"), ui::header_cell("Address")]);
    for vote in votes {
        table.add_row(vec![Cell::new(&vote.label), Cell::new(&vote.address)]);
    }
    format!(
        "Votes: {}\n\n{}",
        ui::style_text(cid, ui::StyleType::Title),
        table
    )
}

pub fn exchange_rate(exchange: &ExchangeType, height: u64, rate: f64) -> String {
    let at = if height == 0 {
        "latest".to_string()
    } else {
        format!("height {height}")
    };
    format!(
        "Exchange rate {} ({at}): {}",
        ui::style_text(&exchange.name, ui::StyleType::Label),
        ui::style_text(&rate.to_string(), ui::StyleType::Value)
    )
}

pub fn height(height: u64) -> String {
    format!(
        "Chain height: {}",
        ui::style_text(&height.to_string(), ui::StyleType::Value)
    )
}
