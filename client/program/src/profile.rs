use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::state::TierLevel;
use crate::utils::pubkey_string;
use crate::verification::StepKind;

/// Verification state of a wallet, owned and updated by the caller.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(with = "pubkey_string")]
    pub address: Pubkey,
    #[serde(default)]
    pub identity_verified: bool,
    #[serde(default)]
    pub social_verified: bool,
    #[serde(default)]
    pub credit_score: Option<u16>,
    #[serde(default)]
    pub institutional_backing: bool,
    #[serde(default)]
    pub accredited_investor: bool,
    #[serde(default)]
    pub legal_entity: bool,
    #[serde(default)]
    pub trust_score: Option<Decimal>,
    #[serde(default)]
    pub has_staking_history: bool,
}

impl UserProfile {
    pub fn new(address: Pubkey) -> Self {
        Self {
            address,
            identity_verified: false,
            social_verified: false,
            credit_score: None,
            institutional_backing: false,
            accredited_investor: false,
            legal_entity: false,
            trust_score: None,
            has_staking_history: false,
        }
    }

    /// Records the outcome of a completed verification step.
    ///
    /// Credit checks carry a score and go through [`UserProfile::record_credit_score`].
    pub fn record_verification(&mut self, kind: StepKind) {
        match kind {
            StepKind::Identity => self.identity_verified = true,
            StepKind::Social => self.social_verified = true,
            StepKind::InstitutionalBacking => self.institutional_backing = true,
            StepKind::AccreditedInvestor => self.accredited_investor = true,
            StepKind::LegalEntity => self.legal_entity = true,
            StepKind::CreditScore => {}
        }
    }

    pub fn record_credit_score(&mut self, score: u16) {
        self.credit_score = Some(score);
    }
}

/// One past group membership, as read from the member and group accounts
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Participation {
    pub tier: TierLevel,
    pub contributions: u32,
}

pub const MIN_PARTICIPATION_SCORE: u16 = 300;
pub const MAX_PARTICIPATION_SCORE: u16 = 850;

/// Credit score derived from group participation history, 0 with no history
pub fn participation_credit_score(history: &[Participation]) -> u16 {
    if history.is_empty() {
        return 0;
    }
    let groups = Decimal::from(history.len() as u64);
    let contributions: u64 = history.iter().map(|p| p.contributions as u64).sum();
    let average = Decimal::from(contributions) / groups;
    let tier_bonus: u64 = history
        .iter()
        .map(|p| match p.tier {
            TierLevel::Basic => 50,
            TierLevel::Trust => 100,
            TierLevel::SuperTrust => 150,
            TierLevel::Premium => 200,
        })
        .sum();

    let score = Decimal::from(500) + groups * Decimal::from(50)
        + average * Decimal::from(25)
        + Decimal::from(tier_bonus);
    let clamped = score
        .floor()
        .max(Decimal::from(MIN_PARTICIPATION_SCORE))
        .min(Decimal::from(MAX_PARTICIPATION_SCORE));
    clamped.to_u16().unwrap_or(MAX_PARTICIPATION_SCORE)
}
