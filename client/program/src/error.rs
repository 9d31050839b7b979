use thiserror::Error;

use crate::state::TierLevel;
use crate::verification::{StepKind, StepStatus};

pub type OsemeResult<T = ()> = Result<T, OsemeError>;

#[derive(Debug, Error)]
pub enum OsemeError {
    #[error("Unrecognized tier: {0}")]
    InvalidTier(String),
    #[error("Profile is missing a required field: {0}")]
    IncompleteProfile(&'static str),
    #[error("No valid bump seed found for namespace {0}")]
    NoValidBumpFound(String),
    #[error("Seed component {index} is {len} bytes, the maximum is 32")]
    SeedTooLong { index: usize, len: usize },
    #[error("{0} seed components supplied, the maximum is 14")]
    TooManySeeds(usize),
    #[error("The {namespace} address takes {expected} seed components, {actual} supplied")]
    SeedArity {
        namespace: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Verification step {kind} cannot move from {from} to {to}")]
    InvalidStepTransition {
        kind: StepKind,
        from: StepStatus,
        to: StepStatus,
    },
    #[error("Verification flow has no {0} step")]
    UnknownStep(StepKind),
    #[error("The {0} tier does not require a trust stake")]
    StakeNotRequired(TierLevel),
    #[error("The {0} tier requires a trust stake before group creation")]
    TrustStakeRequired(TierLevel),
    #[error("Trust stake does not match the group being created")]
    TrustStakeMismatch,
    #[error("Minimum contribution for the {tier} tier is {minimum}")]
    ContributionBelowMinimum {
        tier: TierLevel,
        minimum: rust_decimal::Decimal,
    },
    #[error("Amount {0} cannot be represented in base units")]
    AmountOverflow(rust_decimal::Decimal),
    #[error("Invalid tier table: {0}")]
    InvalidTierTable(String),
    #[error("Tier table could not be parsed: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("Tier table could not be read: {0}")]
    ConfigRead(#[from] std::io::Error),
    #[error("Account is not a {0} account")]
    AccountDiscriminatorMismatch(&'static str),
    #[error("Account data could not be decoded: {0}")]
    AccountDecode(String),
    #[error("Timestamp overflows: {0}")]
    TimestampOverflow(&'static str),
}
