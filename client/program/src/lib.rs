use solana_program::declare_id;

pub mod accounts;
pub mod config;
pub mod error;
pub mod group;
pub mod pda;
pub mod policy;
pub mod profile;
pub mod state;
pub mod utils;
pub mod verification;
pub mod yield_strategy;

pub use policy::{check_eligibility, get_config, initiate_verification_flow};

declare_id!("CbbFznCzapJJ5kRbSH7LcM4MmCvmGFkUF2dhMzvWUKNS");
