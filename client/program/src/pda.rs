//! Program-derived addresses for Oseme resources.
//!
//! Derivation is delegated to [`Pubkey::try_find_program_address`], the same
//! routine the on-chain runtime uses, so addresses computed here resolve to
//! the accounts the program creates. Seeds are always the namespace tag
//! followed by the resource's components, in the order listed on
//! [`ResourceKind`].
use serde::Serialize;
use solana_program::pubkey::{Pubkey, MAX_SEEDS, MAX_SEED_LEN};
use tracing::debug;

use crate::error::{OsemeError, OsemeResult};
use crate::utils::pubkey_string;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DerivedAddress {
    #[serde(with = "pubkey_string")]
    pub address: Pubkey,
    pub bump: u8,
}

/// Finds the address and bump for `namespace ++ components` under `program_id`.
pub fn derive_address(
    namespace: &str,
    components: &[&[u8]],
    program_id: &Pubkey,
) -> OsemeResult<DerivedAddress> {
    // The bump takes the last seed slot
    if components.len() + 1 >= MAX_SEEDS {
        return Err(OsemeError::TooManySeeds(components.len()));
    }
    let mut seeds: Vec<&[u8]> = Vec::with_capacity(components.len() + 1);
    seeds.push(namespace.as_bytes());
    seeds.extend_from_slice(components);
    if let Some((index, seed)) = seeds.iter().enumerate().find(|(_, s)| s.len() > MAX_SEED_LEN) {
        return Err(OsemeError::SeedTooLong {
            index,
            len: seed.len(),
        });
    }

    let (address, bump) = Pubkey::try_find_program_address(&seeds, program_id)
        .ok_or_else(|| OsemeError::NoValidBumpFound(namespace.to_string()))?;
    debug!("Derived {} address {} (bump {})", namespace, address, bump);
    Ok(DerivedAddress { address, bump })
}

/// On-chain resources and their seed layouts
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    // ["platform"]
    Platform,
    // ["treasury"]
    Treasury,
    // ["insurance"]
    Insurance,
    // ["platform-config"]
    PlatformConfig,
    // ["group", group id]
    Group,
    // ["stake", group]
    Stake,
    // ["escrow", group]
    Escrow,
    // ["trust_stake", group id, creator]
    TrustStake,
    // ["yield_vault", trust stake]
    YieldVault,
    // ["member", group, member]
    Member,
    // ["contribution", group, member]
    Contribution,
    // ["yield", group]
    Yield,
    // ["payout", group, recipient]
    Payout,
}

impl ResourceKind {
    pub fn seed(&self) -> &'static str {
        match self {
            ResourceKind::Platform => "platform",
            ResourceKind::Treasury => "treasury",
            ResourceKind::Insurance => "insurance",
            ResourceKind::PlatformConfig => "platform-config",
            ResourceKind::Group => "group",
            ResourceKind::Stake => "stake",
            ResourceKind::Escrow => "escrow",
            ResourceKind::TrustStake => "trust_stake",
            ResourceKind::YieldVault => "yield_vault",
            ResourceKind::Member => "member",
            ResourceKind::Contribution => "contribution",
            ResourceKind::Yield => "yield",
            ResourceKind::Payout => "payout",
        }
    }

    /// Derives the resource address, checking the component count first
    pub fn derive(&self, components: &[&[u8]], program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
        if components.len() != self.arity() {
            return Err(OsemeError::SeedArity {
                namespace: self.seed(),
                expected: self.arity(),
                actual: components.len(),
            });
        }
        derive_address(self.seed(), components, program_id)
    }

    /// Number of components that follow the namespace tag
    pub fn arity(&self) -> usize {
        match self {
            ResourceKind::Platform
            | ResourceKind::Treasury
            | ResourceKind::Insurance
            | ResourceKind::PlatformConfig => 0,
            ResourceKind::Group
            | ResourceKind::Stake
            | ResourceKind::Escrow
            | ResourceKind::YieldVault
            | ResourceKind::Yield => 1,
            ResourceKind::TrustStake
            | ResourceKind::Member
            | ResourceKind::Contribution
            | ResourceKind::Payout => 2,
        }
    }
}

/// Group ids are seeded as their decimal string
pub fn group_id_seed(group_id: u64) -> String {
    group_id.to_string()
}

pub fn find_platform(program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
    ResourceKind::Platform.derive(&[], program_id)
}

pub fn find_treasury(program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
    ResourceKind::Treasury.derive(&[], program_id)
}

pub fn find_insurance(program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
    ResourceKind::Insurance.derive(&[], program_id)
}

pub fn find_platform_config(program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
    ResourceKind::PlatformConfig.derive(&[], program_id)
}

pub fn find_group(group_id: u64, program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
    let id = group_id_seed(group_id);
    ResourceKind::Group.derive(&[id.as_bytes()], program_id)
}

pub fn find_stake(group: &Pubkey, program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
    ResourceKind::Stake.derive(&[group.as_ref()], program_id)
}

pub fn find_escrow(group: &Pubkey, program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
    ResourceKind::Escrow.derive(&[group.as_ref()], program_id)
}

pub fn find_trust_stake(
    group_id: u64,
    creator: &Pubkey,
    program_id: &Pubkey,
) -> OsemeResult<DerivedAddress> {
    let id = group_id_seed(group_id);
    ResourceKind::TrustStake.derive(&[id.as_bytes(), creator.as_ref()], program_id)
}

pub fn find_yield_vault(trust_stake: &Pubkey, program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
    ResourceKind::YieldVault.derive(&[trust_stake.as_ref()], program_id)
}

pub fn find_member(
    group: &Pubkey,
    member: &Pubkey,
    program_id: &Pubkey,
) -> OsemeResult<DerivedAddress> {
    ResourceKind::Member.derive(&[group.as_ref(), member.as_ref()], program_id)
}

pub fn find_contribution(
    group: &Pubkey,
    member: &Pubkey,
    program_id: &Pubkey,
) -> OsemeResult<DerivedAddress> {
    ResourceKind::Contribution.derive(&[group.as_ref(), member.as_ref()], program_id)
}

pub fn find_yield(group: &Pubkey, program_id: &Pubkey) -> OsemeResult<DerivedAddress> {
    ResourceKind::Yield.derive(&[group.as_ref()], program_id)
}

pub fn find_payout(
    group: &Pubkey,
    recipient: &Pubkey,
    program_id: &Pubkey,
) -> OsemeResult<DerivedAddress> {
    ResourceKind::Payout.derive(&[group.as_ref(), recipient.as_ref()], program_id)
}
