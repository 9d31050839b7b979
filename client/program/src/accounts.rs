//! Address and amount sets for the external program's instructions.
//!
//! These are the accounts a client has to pass when creating a group,
//! staking, joining, contributing or releasing a payout. Nothing here talks
//! to the network.
use rust_decimal::Decimal;
use serde::Serialize;
use solana_program::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;
use tracing::info;

use crate::error::{OsemeError, OsemeResult};
use crate::pda::{self, DerivedAddress};
use crate::policy::TierPolicy;
use crate::state::{TierLevel, SOL_DECIMALS, USDC_DECIMALS};
use crate::utils::{pubkey_string, to_base_units};
use crate::yield_strategy::{self, Protocol};

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PlatformAccounts {
    pub platform: DerivedAddress,
    pub treasury: DerivedAddress,
    pub insurance: DerivedAddress,
}

impl PlatformAccounts {
    pub fn derive(program_id: &Pubkey) -> OsemeResult<Self> {
        Ok(Self {
            platform: pda::find_platform(program_id)?,
            treasury: pda::find_treasury(program_id)?,
            insurance: pda::find_insurance(program_id)?,
        })
    }
}

/// Trust stake a Trust-or-stricter creator locks before creating a group
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrustStakePlan {
    pub tier: TierLevel,
    pub group_id: u64,
    #[serde(with = "pubkey_string")]
    pub creator: Pubkey,
    pub trust_stake: DerivedAddress,
    pub yield_vault: DerivedAddress,
    // USDC account owned by the yield vault
    #[serde(with = "pubkey_string")]
    pub vault_token_account: Pubkey,
    #[serde(with = "pubkey_string")]
    pub creator_token_account: Pubkey,
    // USDC base units
    pub stake_amount: u64,
    pub can_earn_yield: bool,
    pub yield_split: Vec<(Protocol, u64)>,
}

impl TrustStakePlan {
    pub fn derive(
        policy: &TierPolicy,
        tier: TierLevel,
        creator: &Pubkey,
        group_id: u64,
        usdc_mint: &Pubkey,
        program_id: &Pubkey,
    ) -> OsemeResult<Self> {
        let config = policy.get_config(tier);
        if !config.requires_trust_stake() {
            return Err(OsemeError::StakeNotRequired(tier));
        }

        let stake_amount = to_base_units(config.trust_stake_requirement, USDC_DECIMALS)?;
        let trust_stake = pda::find_trust_stake(group_id, creator, program_id)?;
        let yield_vault = pda::find_yield_vault(&trust_stake.address, program_id)?;
        let yield_split = if config.yield_eligible {
            yield_strategy::split(tier, stake_amount)
        } else {
            vec![]
        };

        info!(
            "Trust stake for group {} ({}): {} at {}",
            group_id, tier, config.trust_stake_requirement, trust_stake.address
        );
        Ok(Self {
            tier,
            group_id,
            creator: *creator,
            trust_stake,
            yield_vault,
            vault_token_account: get_associated_token_address(&yield_vault.address, usdc_mint),
            creator_token_account: get_associated_token_address(creator, usdc_mint),
            stake_amount,
            can_earn_yield: config.yield_eligible,
            yield_split,
        })
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreationPlan {
    pub tier: TierLevel,
    pub group_id: u64,
    #[serde(with = "pubkey_string")]
    pub creator: Pubkey,
    pub group: DerivedAddress,
    pub stake: DerivedAddress,
    pub trust_stake: Option<DerivedAddress>,
    pub member_cap: u16,
    pub cycle_days: u32,
    // USDC base units per cycle
    pub contribution: u64,
    // USDC base units, zero when the tier has no trust stake
    pub trust_stake_amount: u64,
}

impl GroupCreationPlan {
    /// `contribution` defaults to the tier minimum
    pub fn derive(
        policy: &TierPolicy,
        tier: TierLevel,
        creator: &Pubkey,
        group_id: u64,
        contribution: Option<Decimal>,
        trust_stake: Option<&TrustStakePlan>,
        program_id: &Pubkey,
    ) -> OsemeResult<Self> {
        let config = policy.get_config(tier);
        let contribution = contribution.unwrap_or(config.min_contribution);
        if contribution < config.min_contribution {
            return Err(OsemeError::ContributionBelowMinimum {
                tier,
                minimum: config.min_contribution,
            });
        }

        match trust_stake {
            None if config.requires_trust_stake() => {
                return Err(OsemeError::TrustStakeRequired(tier));
            }
            Some(stake)
                if stake.tier != tier || stake.group_id != group_id || stake.creator != *creator =>
            {
                return Err(OsemeError::TrustStakeMismatch);
            }
            _ => {}
        }

        let group = pda::find_group(group_id, program_id)?;
        let stake = pda::find_stake(&group.address, program_id)?;

        info!("Group {} ({}) at {}", group_id, tier, group.address);
        Ok(Self {
            tier,
            group_id,
            creator: *creator,
            group,
            stake,
            trust_stake: trust_stake.map(|s| s.trust_stake),
            member_cap: config.max_members,
            cycle_days: config.cycle_duration_days,
            contribution: to_base_units(contribution, USDC_DECIMALS)?,
            trust_stake_amount: trust_stake.map(|s| s.stake_amount).unwrap_or(0),
        })
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    #[serde(with = "pubkey_string")]
    pub group: Pubkey,
    #[serde(with = "pubkey_string")]
    pub member: Pubkey,
    pub member_record: DerivedAddress,
    // Lamports of SOL collateral
    pub collateral: u64,
}

impl MembershipPlan {
    pub fn derive(
        policy: &TierPolicy,
        tier: TierLevel,
        group: &Pubkey,
        member: &Pubkey,
        program_id: &Pubkey,
    ) -> OsemeResult<Self> {
        let config = policy.get_config(tier);
        Ok(Self {
            group: *group,
            member: *member,
            member_record: pda::find_member(group, member, program_id)?,
            collateral: to_base_units(config.collateral_stake_requirement, SOL_DECIMALS)?,
        })
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContributionPlan {
    #[serde(with = "pubkey_string")]
    pub group: Pubkey,
    #[serde(with = "pubkey_string")]
    pub member: Pubkey,
    pub contribution_record: DerivedAddress,
    pub group_yield: DerivedAddress,
    // USDC base units
    pub amount: u64,
}

impl ContributionPlan {
    pub fn derive(
        group: &Pubkey,
        member: &Pubkey,
        amount: Decimal,
        program_id: &Pubkey,
    ) -> OsemeResult<Self> {
        Ok(Self {
            group: *group,
            member: *member,
            contribution_record: pda::find_contribution(group, member, program_id)?,
            group_yield: pda::find_yield(group, program_id)?,
            amount: to_base_units(amount, USDC_DECIMALS)?,
        })
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutPlan {
    #[serde(with = "pubkey_string")]
    pub group: Pubkey,
    #[serde(with = "pubkey_string")]
    pub recipient: Pubkey,
    pub payout_record: DerivedAddress,
    pub insurance: DerivedAddress,
}

impl PayoutPlan {
    pub fn derive(group: &Pubkey, recipient: &Pubkey, program_id: &Pubkey) -> OsemeResult<Self> {
        Ok(Self {
            group: *group,
            recipient: *recipient,
            payout_record: pda::find_payout(group, recipient, program_id)?,
            insurance: pda::find_insurance(program_id)?,
        })
    }
}
