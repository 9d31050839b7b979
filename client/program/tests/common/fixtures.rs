use std::str::FromStr;

use rust_decimal::Decimal;
use solana_program::{hash::hash, pubkey::Pubkey};

use oseme_tiers::profile::UserProfile;

pub const CREATOR: &str = "SeedPubey1111111111111111111111111111111111";

/// Deterministic program id used by the golden address vectors
pub fn program_id() -> Pubkey {
    Pubkey::new_from_array(hash(b"oseme-group").to_bytes())
}

pub fn creator() -> Pubkey {
    Pubkey::from_str(CREATOR).unwrap()
}

pub fn member() -> Pubkey {
    Pubkey::new_from_array(hash(b"member-one").to_bytes())
}

pub fn key(s: &str) -> Pubkey {
    Pubkey::from_str(s).unwrap()
}

/// A profile that passes every gate of every tier
pub fn verified_profile() -> UserProfile {
    UserProfile {
        address: member(),
        identity_verified: true,
        social_verified: true,
        credit_score: Some(800),
        institutional_backing: true,
        accredited_investor: true,
        legal_entity: true,
        trust_score: Some(Decimal::from(1_000)),
        has_staking_history: true,
    }
}

/// A profile that has not passed anything yet
pub fn fresh_profile() -> UserProfile {
    let mut profile = UserProfile::new(member());
    profile.trust_score = Some(Decimal::ZERO);
    profile
}
