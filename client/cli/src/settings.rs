use std::path::PathBuf;

use oseme_tiers::{config::TierTable, policy::TierPolicy, state::USDC_MINT};
use solana_program::pubkey::Pubkey;
use tracing::info;

use crate::error::{CliError, CliResult};

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

pub const FETCH_ATTEMPTS: u32 = 3;

/// Resolved runtime settings. Flags win over the environment (`.env` included).
#[derive(Clone, Debug)]
pub struct Settings {
    pub rpc_url: String,
    pub program_id: Pubkey,
    pub usdc_mint: Pubkey,
    pub tier_table: Option<PathBuf>,
}

impl Settings {
    pub fn new(
        rpc_url: String,
        program_id: Option<Pubkey>,
        usdc_mint: Option<Pubkey>,
        tier_table: Option<PathBuf>,
    ) -> CliResult<Self> {
        if rpc_url.trim().is_empty() {
            return Err(CliError::Config("RPC_URL is empty".to_string()));
        }
        Ok(Self {
            rpc_url,
            program_id: program_id.unwrap_or_else(oseme_tiers::id),
            usdc_mint: usdc_mint.unwrap_or(USDC_MINT),
            tier_table,
        })
    }

    /// The built-in policy, or one backed by the configured tier table
    pub fn policy(&self) -> CliResult<TierPolicy> {
        match &self.tier_table {
            Some(path) => {
                let table = TierTable::from_path(path)?;
                info!("Using tier table from {}", path.display());
                Ok(TierPolicy::new(table))
            }
            None => Ok(TierPolicy::builtin().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::new(DEFAULT_RPC_URL.to_string(), None, None, None).unwrap();
        assert_eq!(settings.program_id, oseme_tiers::id());
        assert_eq!(settings.usdc_mint, USDC_MINT);
        assert!(settings.policy().is_ok());
    }

    #[test]
    fn empty_rpc_url() {
        let err = Settings::new(" ".to_string(), None, None, None).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_tier_table() {
        let settings = Settings::new(
            DEFAULT_RPC_URL.to_string(),
            None,
            None,
            Some(PathBuf::from("/nonexistent/tiers.json")),
        )
        .unwrap();
        assert!(matches!(settings.policy(), Err(CliError::Policy(_))));
    }
}
