use std::path::Path;

use {
    oseme_tiers::{
        accounts::{GroupCreationPlan, PlatformAccounts, TrustStakePlan},
        policy::{EligibilityVerdict, TierPolicy},
        profile::UserProfile,
        state::{TierConfig, TierLevel, TierRequirements},
        verification::{VerificationFlow, VerificationStep},
        yield_strategy::{self, YieldStrategy},
    },
    rust_decimal::Decimal,
    serde::Serialize,
    solana_program::pubkey::Pubkey,
    tracing::{debug, warn},
};

use crate::{error::CliResult, settings::Settings};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TierOverview<'a> {
    pub tier: TierLevel,
    pub config: &'a TierConfig,
    pub requirements: &'static TierRequirements,
    pub yield_strategies: &'static [YieldStrategy],
    pub weighted_apy: Decimal,
}

pub fn tiers(policy: &TierPolicy) -> Vec<TierOverview<'_>> {
    policy
        .table()
        .iter()
        .map(|(tier, config)| TierOverview {
            tier,
            config,
            requirements: policy.requirements(tier),
            yield_strategies: yield_strategy::strategies(tier),
            weighted_apy: yield_strategy::weighted_apy(tier),
        })
        .collect()
}

pub fn read_profile(path: &Path) -> CliResult<UserProfile> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub tier: TierLevel,
    pub verdict: EligibilityVerdict,
    // Steps still to complete, in gate order
    pub remediation: Vec<VerificationStep>,
}

pub fn eligibility(
    policy: &TierPolicy,
    tier: TierLevel,
    profile: &UserProfile,
    now: i64,
) -> CliResult<EligibilityReport> {
    let verdict = policy.check_eligibility(tier, profile)?;
    let remediation = if verdict.eligible {
        vec![]
    } else {
        warn!(
            "{} is not eligible for {}: {}",
            profile.address,
            tier,
            verdict.missing_requirements.join("; ")
        );
        policy
            .initiate_verification_flow(tier, profile.address, now)
            .outstanding(&verdict)
            .cloned()
            .collect()
    };
    Ok(EligibilityReport {
        tier,
        verdict,
        remediation,
    })
}

pub fn flow(policy: &TierPolicy, tier: TierLevel, address: Pubkey, now: i64) -> VerificationFlow {
    policy.initiate_verification_flow(tier, address, now)
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreationPlan {
    pub platform: PlatformAccounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_stake: Option<TrustStakePlan>,
    pub group: GroupCreationPlan,
}

/// Everything needed to stake (when the tier asks for it) and create a group
pub fn plan(
    policy: &TierPolicy,
    settings: &Settings,
    tier: TierLevel,
    creator: &Pubkey,
    group_id: u64,
    contribution: Option<Decimal>,
) -> CliResult<CreationPlan> {
    let program_id = &settings.program_id;
    let trust_stake = if policy.get_config(tier).requires_trust_stake() {
        Some(TrustStakePlan::derive(
            policy,
            tier,
            creator,
            group_id,
            &settings.usdc_mint,
            program_id,
        )?)
    } else {
        None
    };
    let group = GroupCreationPlan::derive(
        policy,
        tier,
        creator,
        group_id,
        contribution,
        trust_stake.as_ref(),
        program_id,
    )?;
    debug!("Planned group {} for {}", group_id, creator);
    Ok(CreationPlan {
        platform: PlatformAccounts::derive(program_id)?,
        trust_stake,
        group,
    })
}
