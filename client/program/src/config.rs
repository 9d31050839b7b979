//! Tier configuration tables, built in or loaded from JSON.
use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{OsemeError, OsemeResult};
use crate::state::{TierConfig, TierLevel, TIER_CONFIGS};
use crate::yield_strategy;

/// One [`TierConfig`] per tier, validated on construction.
#[derive(Clone, Debug, PartialEq)]
pub struct TierTable {
    configs: [TierConfig; 4],
}

impl TierTable {
    pub fn builtin() -> OsemeResult<Self> {
        Self::new(TIER_CONFIGS.clone())
    }

    pub fn new(configs: [TierConfig; 4]) -> OsemeResult<Self> {
        let table = Self { configs };
        table.validate()?;
        Ok(table)
    }

    /// Parses a table keyed by tier name, e.g. `{"basic": {...}, "trust": {...}}`.
    pub fn from_json(data: &str) -> OsemeResult<Self> {
        let raw: HashMap<String, TierConfig> = serde_json::from_str(data)?;
        let mut slots: [Option<TierConfig>; 4] = [None, None, None, None];
        for (name, config) in raw {
            let tier: TierLevel = name.parse()?;
            if slots[tier.index()].replace(config).is_some() {
                return Err(OsemeError::InvalidTierTable(format!(
                    "{} is configured more than once",
                    tier
                )));
            }
        }
        let [basic, trust, super_trust, premium] = slots;
        let missing = |tier: TierLevel| {
            OsemeError::InvalidTierTable(format!("no configuration for the {} tier", tier))
        };
        let table = Self::new([
            basic.ok_or_else(|| missing(TierLevel::Basic))?,
            trust.ok_or_else(|| missing(TierLevel::Trust))?,
            super_trust.ok_or_else(|| missing(TierLevel::SuperTrust))?,
            premium.ok_or_else(|| missing(TierLevel::Premium))?,
        ])?;
        debug!("Loaded tier table from JSON");
        Ok(table)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> OsemeResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn get(&self, tier: TierLevel) -> &TierConfig {
        &self.configs[tier.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TierLevel, &TierConfig)> {
        TierLevel::ALL.iter().map(move |t| (*t, self.get(*t)))
    }

    /// Checks that requirements only grow and capacity only shrinks with strictness
    pub fn validate(&self) -> OsemeResult<()> {
        for pair in TierLevel::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let (lo, hi) = (self.get(lower), self.get(higher));

            let non_decreasing: [(&str, Decimal, Decimal); 4] = [
                ("minContribution", lo.min_contribution, hi.min_contribution),
                (
                    "collateralStakeRequirement",
                    lo.collateral_stake_requirement,
                    hi.collateral_stake_requirement,
                ),
                (
                    "trustStakeRequirement",
                    lo.trust_stake_requirement,
                    hi.trust_stake_requirement,
                ),
                ("insuranceCoverage", lo.insurance_coverage, hi.insurance_coverage),
            ];
            for (field, a, b) in non_decreasing.iter() {
                if a > b {
                    return Err(OsemeError::InvalidTierTable(format!(
                        "{} decreases from {} ({}) to {} ({})",
                        field, lower, a, higher, b
                    )));
                }
            }
            if lo.yield_eligible && !hi.yield_eligible {
                return Err(OsemeError::InvalidTierTable(format!(
                    "yieldEligible is lost between {} and {}",
                    lower, higher
                )));
            }
            if lo.max_members < hi.max_members {
                return Err(OsemeError::InvalidTierTable(format!(
                    "maxMembers grows from {} ({}) to {} ({})",
                    lower, lo.max_members, higher, hi.max_members
                )));
            }
            if lo.cycle_duration_days < hi.cycle_duration_days {
                return Err(OsemeError::InvalidTierTable(format!(
                    "cycleDurationDays grows from {} ({}) to {} ({})",
                    lower, lo.cycle_duration_days, higher, hi.cycle_duration_days
                )));
            }
        }

        for (tier, config) in self.iter() {
            let magnitudes = [
                ("collateralStakeRequirement", config.collateral_stake_requirement),
                ("trustStakeRequirement", config.trust_stake_requirement),
                ("insuranceCoverage", config.insurance_coverage),
            ];
            for (field, value) in magnitudes.iter() {
                if *value < Decimal::ZERO {
                    return Err(OsemeError::InvalidTierTable(format!(
                        "{} {} is negative ({})",
                        tier, field, value
                    )));
                }
            }
            if config.min_contribution <= Decimal::ZERO || config.max_members == 0 {
                return Err(OsemeError::InvalidTierTable(format!(
                    "{} has an empty contribution or member cap",
                    tier
                )));
            }
            if config.yield_eligible && !config.requires_trust_stake() {
                return Err(OsemeError::InvalidTierTable(format!(
                    "{} is yield eligible without a trust stake",
                    tier
                )));
            }
            if config.yield_eligible && yield_strategy::total_allocation(tier) != 100 {
                return Err(OsemeError::InvalidTierTable(format!(
                    "{} yield allocations do not sum to 100",
                    tier
                )));
            }
        }
        Ok(())
    }
}
