mod commands;
mod error;
mod groups;
mod settings;
mod utils;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    oseme_tiers::{
        state::{parse_tier, TierLevel},
        utils::current_time,
    },
    rust_decimal::Decimal,
    solana_client::rpc_client::RpcClient,
    solana_program::pubkey::Pubkey,
    solana_sdk::commitment_config::CommitmentConfig,
    tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::{error::CliResult, settings::Settings, utils::print_json};

/// Tier policy, verification flows and account planning for Oseme savings groups
#[derive(Parser, Debug)]
#[command(name = "oseme", version)]
struct Cli {
    /// RPC endpoint
    #[arg(long, env = "RPC_URL", default_value = settings::DEFAULT_RPC_URL, global = true)]
    rpc_url: String,

    /// Savings group program id
    #[arg(long, env = "PROGRAM_ID", global = true)]
    program_id: Option<Pubkey>,

    /// Mint trust stakes are denominated in
    #[arg(long, env = "USDC_MINT", global = true)]
    usdc_mint: Option<Pubkey>,

    /// JSON tier table replacing the built-in one
    #[arg(long, env = "TIER_TABLE", global = true)]
    tier_table: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every tier with its requirements and yield strategies
    Tiers,
    /// Check a profile against a tier
    Eligibility {
        #[arg(long, value_parser = parse_tier)]
        tier: TierLevel,
        /// JSON profile file
        #[arg(long)]
        profile: PathBuf,
    },
    /// List the verification steps of a tier
    Flow {
        #[arg(long, value_parser = parse_tier)]
        tier: TierLevel,
        #[arg(long)]
        address: Pubkey,
    },
    /// Derive the accounts to stake and create a group
    Plan {
        #[arg(long, value_parser = parse_tier)]
        tier: TierLevel,
        #[arg(long)]
        creator: Pubkey,
        #[arg(long)]
        group_id: u64,
        /// Per-cycle contribution, defaults to the tier minimum
        #[arg(long)]
        contribution: Option<Decimal>,
    },
    /// Fetch and summarize an on-chain group
    Group {
        #[arg(long)]
        group_id: u64,
        /// Also fetch every member record
        #[arg(long)]
        members: bool,
    },
}

async fn process(cli: Cli) -> CliResult {
    let settings = Settings::new(cli.rpc_url, cli.program_id, cli.usdc_mint, cli.tier_table)?;
    let policy = settings.policy()?;

    match cli.command {
        Command::Tiers => print_json(&commands::tiers(&policy)),
        Command::Eligibility { tier, profile } => {
            let profile = commands::read_profile(&profile)?;
            print_json(&commands::eligibility(&policy, tier, &profile, current_time())?)
        }
        Command::Flow { tier, address } => {
            print_json(&commands::flow(&policy, tier, address, current_time()))
        }
        Command::Plan {
            tier,
            creator,
            group_id,
            contribution,
        } => print_json(&commands::plan(
            &policy,
            &settings,
            tier,
            &creator,
            group_id,
            contribution,
        )?),
        Command::Group { group_id, members } => {
            let connection = Arc::new(RpcClient::new_with_commitment(
                settings.rpc_url.clone(),
                CommitmentConfig::confirmed(),
            ));
            let report =
                groups::fetch_group(connection, &policy, group_id, &settings.program_id, members)
                    .await?;
            print_json(&report)
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    if cli.verbose {
        init_logging();
    }

    if let Err(e) = process(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oseme=debug,oseme_tiers=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
