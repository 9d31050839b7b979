//! Tier eligibility evaluation.
use lazy_static::lazy_static;
use serde::Serialize;
use solana_program::pubkey::Pubkey;
use tracing::debug;

use crate::config::TierTable;
use crate::error::{OsemeError, OsemeResult};
use crate::profile::UserProfile;
use crate::state::{requirements, Gate, TierConfig, TierLevel, TierRequirements};
use crate::utils::current_time;
use crate::verification::VerificationFlow;

lazy_static! {
    static ref BUILTIN: TierPolicy = match TierTable::builtin() {
        Ok(table) => TierPolicy::new(table),
        Err(e) => panic!("Built-in tier table is inconsistent: {}", e),
    };
}

/// Outcome of an eligibility check. Unmet gates are a normal result, not an error.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub missing_requirements: Vec<String>,
    pub unmet_gates: Vec<Gate>,
}

/// Answers tier questions against one tier table
#[derive(Clone, Debug)]
pub struct TierPolicy {
    table: TierTable,
}

impl TierPolicy {
    pub fn new(table: TierTable) -> Self {
        Self { table }
    }

    /// The policy backed by the built-in tables, validated on first use
    pub fn builtin() -> &'static TierPolicy {
        &BUILTIN
    }

    pub fn table(&self) -> &TierTable {
        &self.table
    }

    pub fn get_config(&self, tier: TierLevel) -> &TierConfig {
        self.table.get(tier)
    }

    pub fn requirements(&self, tier: TierLevel) -> &'static TierRequirements {
        requirements(tier)
    }

    pub fn check_eligibility(
        &self,
        tier: TierLevel,
        profile: &UserProfile,
    ) -> OsemeResult<EligibilityVerdict> {
        let req = requirements(tier);
        let mut missing = Vec::new();
        let mut unmet = Vec::new();

        for gate in req.gates() {
            if let Some(message) = unmet_message(gate, req, profile)? {
                missing.push(message);
                unmet.push(gate);
            }
        }

        let verdict = EligibilityVerdict {
            eligible: missing.is_empty(),
            missing_requirements: missing,
            unmet_gates: unmet,
        };
        debug!(
            "Eligibility of {} for {}: {} ({} unmet)",
            profile.address,
            tier,
            verdict.eligible,
            verdict.unmet_gates.len()
        );
        Ok(verdict)
    }

    pub fn initiate_verification_flow(
        &self,
        tier: TierLevel,
        user_address: Pubkey,
        now: i64,
    ) -> VerificationFlow {
        VerificationFlow::new(tier, user_address, now)
    }
}

/// Message for `gate` when the profile does not satisfy it
fn unmet_message(
    gate: Gate,
    req: &TierRequirements,
    profile: &UserProfile,
) -> OsemeResult<Option<String>> {
    let message = match gate {
        Gate::Identity if !profile.identity_verified => {
            Some("Identity verification required".to_string())
        }
        Gate::Social if !profile.social_verified => {
            Some("Social media verification required".to_string())
        }
        Gate::CreditScore => match (req.min_credit_score, profile.credit_score) {
            (Some(min), Some(score)) if score >= min => None,
            (Some(min), _) => Some(format!("Credit score of {}+ required", min)),
            (None, _) => None,
        },
        Gate::InstitutionalBacking if !profile.institutional_backing => {
            Some("Institutional backing/endorsement required".to_string())
        }
        Gate::AccreditedInvestor if !profile.accredited_investor => {
            Some("Accredited investor status required".to_string())
        }
        Gate::LegalEntity if !profile.legal_entity => {
            Some("Legal entity registration required".to_string())
        }
        Gate::TrustScore => {
            let score = profile
                .trust_score
                .ok_or(OsemeError::IncompleteProfile("trustScore"))?;
            if score >= req.min_trust_score {
                None
            } else {
                Some(format!(
                    "Trust score of {}+ required (current: {})",
                    req.min_trust_score, score
                ))
            }
        }
        Gate::StakingHistory if !profile.has_staking_history => {
            Some("Previous staking/participation history required".to_string())
        }
        _ => None,
    };
    Ok(message)
}

pub fn check_eligibility(tier: TierLevel, profile: &UserProfile) -> OsemeResult<EligibilityVerdict> {
    TierPolicy::builtin().check_eligibility(tier, profile)
}

pub fn get_config(tier: TierLevel) -> &'static TierConfig {
    TierPolicy::builtin().get_config(tier)
}

pub fn initiate_verification_flow(tier: TierLevel, user_address: Pubkey) -> VerificationFlow {
    TierPolicy::builtin().initiate_verification_flow(tier, user_address, current_time())
}
