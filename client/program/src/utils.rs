use std::time::{SystemTime, UNIX_EPOCH};

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{OsemeError, OsemeResult};

/// Converts a UI amount to integer base units, truncating sub-unit dust
pub fn to_base_units(amount: Decimal, decimals: u32) -> OsemeResult<u64> {
    if amount.is_sign_negative() {
        return Err(OsemeError::AmountOverflow(amount));
    }
    amount
        .checked_mul(Decimal::from(10u64.pow(decimals)))
        .and_then(|v| v.trunc().to_u64())
        .ok_or(OsemeError::AmountOverflow(amount))
}

pub fn from_base_units(amount: u64, decimals: u32) -> Decimal {
    Decimal::from_i128_with_scale(amount as i128, decimals)
}

pub fn current_time() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Serializes a `Pubkey` as its base58 string
pub mod pubkey_string {
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};
    use solana_program::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(de::Error::custom)
    }
}

#[test]
fn test() {
    use crate::state::{SOL_DECIMALS, USDC_DECIMALS};

    assert_eq!(to_base_units(Decimal::from(500), USDC_DECIMALS).unwrap(), 500_000_000);
    assert_eq!(
        to_base_units(Decimal::new(25, 1), SOL_DECIMALS).unwrap(),
        2_500_000_000
    );
    // Dust below one base unit is dropped
    assert_eq!(
        to_base_units(Decimal::new(10_000_009, 7), USDC_DECIMALS).unwrap(),
        1_000_000
    );
    assert!(to_base_units(Decimal::new(-1, 0), USDC_DECIMALS).is_err());
    assert!(to_base_units(Decimal::MAX, USDC_DECIMALS).is_err());

    assert_eq!(from_base_units(2_500_000_000, SOL_DECIMALS), Decimal::new(25, 1));
}
