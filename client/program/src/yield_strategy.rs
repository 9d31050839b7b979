//! Fixed per-tier split of a trust stake across external yield protocols.
use std::fmt;

use lazy_static::lazy_static;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{OsemeError, OsemeResult};
use crate::state::TierLevel;

pub const DAYS_IN_YEAR: u64 = 365;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    Marinade,
    Solend,
    Francium,
    PortFinance,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Marinade => "Marinade",
            Protocol::Solend => "Solend",
            Protocol::Francium => "Francium",
            Protocol::PortFinance => "Port Finance",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YieldStrategy {
    pub protocol: Protocol,
    // Share of the stake, in percent
    pub allocation: u8,
    // Expected APY, in percent
    pub expected_apy: Decimal,
}

impl YieldStrategy {
    fn new(protocol: Protocol, allocation: u8, expected_apy: Decimal) -> Self {
        Self {
            protocol,
            allocation,
            expected_apy,
        }
    }
}

lazy_static! {
    static ref YIELD_STRATEGIES: [Vec<YieldStrategy>; 4] = {
        let marinade = Decimal::new(65, 1);
        let solend = Decimal::new(52, 1);
        let francium = Decimal::new(81, 1);
        let port = Decimal::new(78, 1);
        [
            vec![],
            vec![
                YieldStrategy::new(Protocol::Marinade, 60, marinade),
                YieldStrategy::new(Protocol::Solend, 40, solend),
            ],
            vec![
                YieldStrategy::new(Protocol::Marinade, 40, marinade),
                YieldStrategy::new(Protocol::Solend, 30, solend),
                YieldStrategy::new(Protocol::Francium, 30, francium),
            ],
            vec![
                YieldStrategy::new(Protocol::Marinade, 30, marinade),
                YieldStrategy::new(Protocol::Solend, 20, solend),
                YieldStrategy::new(Protocol::Francium, 30, francium),
                YieldStrategy::new(Protocol::PortFinance, 20, port),
            ],
        ]
    };
}

pub fn strategies(tier: TierLevel) -> &'static [YieldStrategy] {
    &YIELD_STRATEGIES[tier.index()]
}

pub fn total_allocation(tier: TierLevel) -> u32 {
    strategies(tier).iter().map(|s| s.allocation as u32).sum()
}

/// Allocation-weighted APY, in percent
pub fn weighted_apy(tier: TierLevel) -> Decimal {
    strategies(tier)
        .iter()
        .map(|s| s.expected_apy * Decimal::from(s.allocation) / Decimal::ONE_HUNDRED)
        .sum()
}

/// Splits `amount` base units across the tier's strategies.
///
/// The last strategy absorbs rounding so the parts always add up to `amount`.
pub fn split(tier: TierLevel, amount: u64) -> Vec<(Protocol, u64)> {
    let strategies = strategies(tier);
    let mut remaining = amount;
    let mut parts = Vec::with_capacity(strategies.len());
    for (i, strategy) in strategies.iter().enumerate() {
        let part = if i + 1 == strategies.len() {
            remaining
        } else {
            ((amount as u128 * strategy.allocation as u128) / 100) as u64
        };
        remaining -= part;
        parts.push((strategy.protocol, part));
    }
    parts
}

/// Simple-interest yield earned by `stake` over `days`
pub fn accrued_yield(tier: TierLevel, stake: Decimal, days: u64) -> OsemeResult<Decimal> {
    let earned = stake
        .checked_mul(weighted_apy(tier))
        .and_then(|e| e.checked_mul(Decimal::from(days)))
        .and_then(|e| e.checked_div(Decimal::from(100 * DAYS_IN_YEAR)))
        .ok_or(OsemeError::AmountOverflow(stake))?;
    Ok(earned.max(Decimal::ZERO))
}
