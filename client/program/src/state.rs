use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use lazy_static::lazy_static;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::error::{OsemeError, OsemeResult};

pub const USDC_MINT: Pubkey =
    solana_program::pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

pub const SECONDS_IN_DAY: i64 = 3600 * 24;

pub const USDC_DECIMALS: u32 = 6;
pub const SOL_DECIMALS: u32 = 9;

/// Membership tiers, ordered from least to most strict.
#[derive(
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
    FromPrimitive,
    ToPrimitive,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum TierLevel {
    Basic,
    Trust,
    SuperTrust,
    Premium,
}

impl TierLevel {
    pub const ALL: [TierLevel; 4] = [
        TierLevel::Basic,
        TierLevel::Trust,
        TierLevel::SuperTrust,
        TierLevel::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierLevel::Basic => "basic",
            TierLevel::Trust => "trust",
            TierLevel::SuperTrust => "superTrust",
            TierLevel::Premium => "premium",
        }
    }

    /// Position of the tier in the per-tier tables
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TierLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierLevel {
    type Err = OsemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "basic" => Ok(TierLevel::Basic),
            "trust" => Ok(TierLevel::Trust),
            "supertrust" => Ok(TierLevel::SuperTrust),
            "premium" => Ok(TierLevel::Premium),
            _ => Err(OsemeError::InvalidTier(s.to_string())),
        }
    }
}

impl TryFrom<u8> for TierLevel {
    type Error = OsemeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TierLevel::from_u8(value).ok_or_else(|| OsemeError::InvalidTier(value.to_string()))
    }
}

/// Economic parameters of a tier.
///
/// Amounts are in USD-equivalent units except `collateral_stake_requirement`,
/// which is denominated in SOL.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TierConfig {
    // Minimum per-cycle contribution
    pub min_contribution: Decimal,

    // Upper bound on group membership
    pub max_members: u16,

    // Length of one rotation cycle
    pub cycle_duration_days: u32,

    // SOL a participant locks to join
    pub collateral_stake_requirement: Decimal,

    // USDC a group creator locks, zero when no trust stake is needed
    pub trust_stake_requirement: Decimal,

    // Nominal coverage ceiling
    pub insurance_coverage: Decimal,

    // Whether the trust stake can be deployed to yield strategies
    pub yield_eligible: bool,

    #[serde(skip, default = "fiat_on_ramp_default")]
    pub fiat_on_ramp_enabled: bool,
}

fn fiat_on_ramp_default() -> bool {
    true
}

impl TierConfig {
    pub fn requires_trust_stake(&self) -> bool {
        self.trust_stake_requirement > Decimal::ZERO
    }
}

/// A single eligibility check, in the order checks are reported.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Gate {
    Identity,
    Social,
    CreditScore,
    InstitutionalBacking,
    AccreditedInvestor,
    LegalEntity,
    TrustScore,
    StakingHistory,
}

impl Gate {
    pub const ORDER: [Gate; 8] = [
        Gate::Identity,
        Gate::Social,
        Gate::CreditScore,
        Gate::InstitutionalBacking,
        Gate::AccreditedInvestor,
        Gate::LegalEntity,
        Gate::TrustScore,
        Gate::StakingHistory,
    ];
}

/// Verification gates a profile has to pass to join a tier.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TierRequirements {
    pub identity_verification: bool,
    pub social_verification: bool,
    pub min_credit_score: Option<u16>,
    pub institutional_backing: bool,
    pub accredited_investor: bool,
    pub legal_entity: bool,
    pub min_trust_score: Decimal,
    pub staking_history: bool,
}

impl TierRequirements {
    pub fn has_gate(&self, gate: Gate) -> bool {
        match gate {
            Gate::Identity => self.identity_verification,
            Gate::Social => self.social_verification,
            Gate::CreditScore => self.min_credit_score.is_some(),
            Gate::InstitutionalBacking => self.institutional_backing,
            Gate::AccreditedInvestor => self.accredited_investor,
            Gate::LegalEntity => self.legal_entity,
            Gate::TrustScore => self.min_trust_score > Decimal::ZERO,
            Gate::StakingHistory => self.staking_history,
        }
    }

    /// Gates defined on the tier, in reporting order
    pub fn gates(&self) -> Vec<Gate> {
        Gate::ORDER
            .iter()
            .copied()
            .filter(|g| self.has_gate(*g))
            .collect()
    }
}

lazy_static! {
    pub static ref TIER_CONFIGS: [TierConfig; 4] = [
        TierConfig {
            min_contribution: Decimal::from(50),
            max_members: 20,
            cycle_duration_days: 30,
            collateral_stake_requirement: Decimal::new(10, 1),
            trust_stake_requirement: Decimal::ZERO,
            insurance_coverage: Decimal::from(5_000),
            yield_eligible: false,
            fiat_on_ramp_enabled: true,
        },
        TierConfig {
            min_contribution: Decimal::from(250),
            max_members: 15,
            cycle_duration_days: 21,
            collateral_stake_requirement: Decimal::new(25, 1),
            trust_stake_requirement: Decimal::from(500),
            insurance_coverage: Decimal::from(25_000),
            yield_eligible: true,
            fiat_on_ramp_enabled: true,
        },
        TierConfig {
            min_contribution: Decimal::from(1_000),
            max_members: 10,
            cycle_duration_days: 14,
            collateral_stake_requirement: Decimal::new(50, 1),
            trust_stake_requirement: Decimal::from(2_500),
            insurance_coverage: Decimal::from(100_000),
            yield_eligible: true,
            fiat_on_ramp_enabled: true,
        },
        TierConfig {
            min_contribution: Decimal::from(5_000),
            max_members: 5,
            cycle_duration_days: 7,
            collateral_stake_requirement: Decimal::new(100, 1),
            trust_stake_requirement: Decimal::from(10_000),
            insurance_coverage: Decimal::from(500_000),
            yield_eligible: true,
            fiat_on_ramp_enabled: true,
        },
    ];

    pub static ref TIER_REQUIREMENTS: [TierRequirements; 4] = [
        TierRequirements {
            identity_verification: false,
            social_verification: false,
            min_credit_score: None,
            institutional_backing: false,
            accredited_investor: false,
            legal_entity: false,
            min_trust_score: Decimal::ZERO,
            staking_history: false,
        },
        TierRequirements {
            identity_verification: true,
            social_verification: true,
            min_credit_score: None,
            institutional_backing: false,
            accredited_investor: false,
            legal_entity: false,
            min_trust_score: Decimal::from(700),
            staking_history: false,
        },
        TierRequirements {
            identity_verification: true,
            social_verification: true,
            min_credit_score: Some(650),
            institutional_backing: true,
            accredited_investor: false,
            legal_entity: false,
            min_trust_score: Decimal::from(850),
            staking_history: true,
        },
        TierRequirements {
            identity_verification: true,
            social_verification: true,
            min_credit_score: Some(750),
            institutional_backing: true,
            accredited_investor: true,
            legal_entity: true,
            min_trust_score: Decimal::from(950),
            staking_history: true,
        },
    ];
}

pub fn requirements(tier: TierLevel) -> &'static TierRequirements {
    &TIER_REQUIREMENTS[tier.index()]
}

/// Parses a tier from either its name or its numeric index
pub fn parse_tier(value: &str) -> OsemeResult<TierLevel> {
    match value.parse::<u8>() {
        Ok(index) => TierLevel::try_from(index),
        Err(_) => value.parse(),
    }
}
