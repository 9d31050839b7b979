//! Read-only mirrors of the savings-group program's accounts.
//!
//! Accounts start with an 8 byte discriminator, `sha256("account:<Name>")[..8]`,
//! followed by the borsh encoded fields.
use borsh::{BorshDeserialize, BorshSerialize};
use rust_decimal::Decimal;
use serde::Serialize;
use solana_program::{hash::hash, pubkey::Pubkey};

use crate::error::{OsemeError, OsemeResult};
use crate::policy::TierPolicy;
use crate::profile::Participation;
use crate::state::{TierLevel, SECONDS_IN_DAY, USDC_DECIMALS};
use crate::utils::{from_base_units, pubkey_string};

pub const DISCRIMINATOR_LEN: usize = 8;

pub fn discriminator(account_name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = hash(format!("account:{}", account_name).as_bytes()).to_bytes();
    let mut out = [0; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

fn strip_discriminator<'a>(data: &'a [u8], account_name: &'static str) -> OsemeResult<&'a [u8]> {
    if data.len() < DISCRIMINATOR_LEN || data[..DISCRIMINATOR_LEN] != discriminator(account_name) {
        return Err(OsemeError::AccountDiscriminatorMismatch(account_name));
    }
    Ok(&data[DISCRIMINATOR_LEN..])
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GroupModel {
    Basic,
    Trust,
    SuperTrust,
}

impl GroupModel {
    pub fn tier(&self) -> TierLevel {
        match self {
            GroupModel::Basic => TierLevel::Basic,
            GroupModel::Trust => TierLevel::Trust,
            GroupModel::SuperTrust => TierLevel::SuperTrust,
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GroupStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct GroupAccount {
    pub group_id: u64,
    pub model: GroupModel,
    pub creator: Pubkey,
    pub member_cap: u8,
    pub current_turn_index: u8,
    pub cycle_days: u32,
    pub payout_order: Vec<Pubkey>,
    pub escrow_vault: Pubkey,
    pub stake_vault: Option<Pubkey>,
    pub status: GroupStatus,
    pub total_members: u8,
    pub current_turn_start: i64,
    // USDC base units
    pub contribution_amount: u64,
    pub total_pool: u64,
    pub trust_score: u8,
    pub created_at: i64,
    pub bump: u8,
}

impl GroupAccount {
    pub const NAME: &'static str = "Group";

    /// Decodes raw account data. Trailing bytes are allocation padding.
    pub fn from_data(data: &[u8]) -> OsemeResult<Self> {
        let mut body = strip_discriminator(data, Self::NAME)?;
        GroupAccount::deserialize(&mut body).map_err(|e| OsemeError::AccountDecode(e.to_string()))
    }

    /// Member whose turn it is to be paid
    pub fn current_recipient(&self) -> Option<&Pubkey> {
        self.payout_order.get(self.current_turn_index as usize)
    }

    pub fn turn_ends_at(&self) -> OsemeResult<i64> {
        (self.cycle_days as i64)
            .checked_mul(SECONDS_IN_DAY)
            .and_then(|cycle| self.current_turn_start.checked_add(cycle))
            .ok_or(OsemeError::TimestampOverflow("turn end"))
    }

    pub fn is_full(&self) -> bool {
        self.total_members >= self.member_cap
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct MemberAccount {
    pub group: Pubkey,
    pub user: Pubkey,
    // Lamports
    pub stake_amount: u64,
    pub contributed_turns: Vec<bool>,
    pub missed_count: u8,
    pub trust_delta: i8,
    pub join_timestamp: i64,
    pub is_creator: bool,
    pub bump: u8,
}

impl MemberAccount {
    pub const NAME: &'static str = "Member";

    pub fn from_data(data: &[u8]) -> OsemeResult<Self> {
        let mut body = strip_discriminator(data, Self::NAME)?;
        MemberAccount::deserialize(&mut body).map_err(|e| OsemeError::AccountDecode(e.to_string()))
    }

    pub fn contributions(&self) -> u32 {
        self.contributed_turns.iter().filter(|c| **c).count() as u32
    }

    pub fn participation(&self, group: &GroupAccount) -> Participation {
        Participation {
            tier: group.model.tier(),
            contributions: self.contributions(),
        }
    }
}

/// A decoded group alongside the terms of its tier
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    #[serde(with = "pubkey_string")]
    pub address: Pubkey,
    pub group_id: u64,
    pub tier: TierLevel,
    pub status: GroupStatus,
    #[serde(with = "pubkey_string")]
    pub creator: Pubkey,
    pub members: u8,
    pub member_cap: u8,
    pub contribution: Decimal,
    pub total_pool: Decimal,
    pub current_turn: u8,
    pub current_recipient: Option<String>,
    pub turn_ends_at: i64,
    pub insurance_coverage: Decimal,
    pub yield_eligible: bool,
}

impl GroupSummary {
    pub fn new(address: Pubkey, group: &GroupAccount, policy: &TierPolicy) -> OsemeResult<Self> {
        let tier = group.model.tier();
        let config = policy.get_config(tier);
        Ok(Self {
            address,
            group_id: group.group_id,
            tier,
            status: group.status,
            creator: group.creator,
            members: group.total_members,
            member_cap: group.member_cap,
            contribution: from_base_units(group.contribution_amount, USDC_DECIMALS),
            total_pool: from_base_units(group.total_pool, USDC_DECIMALS),
            current_turn: group.current_turn_index,
            current_recipient: group.current_recipient().map(|k| k.to_string()),
            turn_ends_at: group.turn_ends_at()?,
            insurance_coverage: config.insurance_coverage,
            yield_eligible: config.yield_eligible,
        })
    }
}
