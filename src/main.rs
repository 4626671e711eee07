use anyhow::Result;
use chaindata::core::log::init_logging;
use chaindata::core::price::{EXCHANGE_RATE_ADDRESS, ExchangeType};
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for chaindata::AppCommand {
    fn from(cmd: Commands) -> chaindata::AppCommand {
        match cmd {
            Commands::Address { address } => chaindata::AppCommand::Address { address },
            Commands::Asset { asset_id } => chaindata::AppCommand::Asset { asset_id },
            Commands::Kyc { address } => chaindata::AppCommand::Kyc { address },
            Commands::Rules { asset_id, height } => {
                chaindata::AppCommand::Rules { asset_id, height }
            }
            Commands::Votes { cid } => chaindata::AppCommand::Votes { cid },
            Commands::Utxo { txid, vout } => chaindata::AppCommand::Utxo { txid, vout },
            Commands::Rate {
                address,
                index,
                name,
                height,
            } => chaindata::AppCommand::Rate {
                exchange: ExchangeType::new(&address, index, &name),
                height,
            },
            Commands::Height => chaindata::AppCommand::Height,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Print an address record
    Address { address: String },
    /// Print an asset record
    Asset { asset_id: String },
    /// Show the KYC state of an address
    Kyc { address: String },
    /// Show the asset rules in force at a height
    Rules {
        asset_id: String,
        /// Block height, 0 for the latest rules
        #[arg(long, default_value_t = 0)]
        height: u64,
    },
    /// List the votes stored under a content id
    Votes { cid: String },
    /// Show one transaction output
    Utxo { txid: String, vout: u32 },
    /// Show the lowest exchange rate valid at a height
    Rate {
        /// Address publishing the rates
        #[arg(long, default_value = EXCHANGE_RATE_ADDRESS)]
        address: String,
        /// Currency slot within each publication
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Display name of the currency
        #[arg(long, default_value = "CAD")]
        name: String,
        /// Block height, 0 for the most recent rate
        #[arg(long, default_value_t = 0)]
        height: u64,
    },
    /// Show the current chain height
    Height,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => chaindata::cli::setup::setup(),
        Some(cmd) => chaindata::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
