//! Money
//!
//! Wallet balances, prices and commissions share one representation: a
//! non-negative decimal with at most two fractional digits and at most
//! [`MONEY_INTEGER_DIGITS`] integer digits, matching `NUMERIC(18, 2)`.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 小数点以下の最大桁数
pub const MONEY_SCALE: u32 = 2;

/// 整数部の最大桁数 (NUMERIC(18, 2) の精度 - スケール)
pub const MONEY_INTEGER_DIGITS: u32 = 16;

/// 9_999_999_999_999_999.99
fn max_amount() -> Decimal {
    Decimal::new(10i64.pow(MONEY_INTEGER_DIGITS + MONEY_SCALE) - 1, MONEY_SCALE)
}

/// 金額のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Amount cannot be negative")]
    Negative,

    #[error("Amount cannot have more than {MONEY_SCALE} decimal places")]
    TooPrecise,

    #[error("Amount cannot have more than {MONEY_INTEGER_DIGITS} integer digits")]
    TooLarge,

    #[error("Amount is out of range")]
    Overflow,
}

/// 非負の金額
///
/// ## Examples
/// ```rust
/// use kernel::money::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::new(Decimal::new(4999, 2)).unwrap();
/// assert_eq!(price.to_string(), "49.99");
/// assert!(Money::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Validate and wrap a decimal amount
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        let normalized = amount.normalize();
        if normalized.scale() > MONEY_SCALE {
            return Err(MoneyError::TooPrecise);
        }
        if normalized > max_amount() {
            return Err(MoneyError::TooLarge);
        }
        Ok(Self(normalized))
    }

    /// Whole currency units, e.g. `Money::from_units(50)` is 50.00
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Add, refusing to leave the representable range
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .filter(|sum| *sum <= max_amount())
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Subtract, refusing to go below zero
    pub fn checked_sub(self, other: Money) -> Result<Money, MoneyError> {
        if other.0 > self.0 {
            return Err(MoneyError::Negative);
        }
        Ok(Money(self.0 - other.0))
    }

    /// Share of this amount expressed in basis points, rounded down to cents
    pub fn basis_points(self, bps: u32) -> Money {
        let share = self.0 * Decimal::from(bps) / Decimal::from(10_000u32);
        Money(share.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero).normalize())
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_rejects_negative() {
        assert_eq!(Money::new(dec!(-0.01)), Err(MoneyError::Negative));
        assert!(Money::new(dec!(0)).is_ok());
    }

    #[test]
    fn test_money_rejects_sub_cent_precision() {
        assert_eq!(Money::new(dec!(1.005)), Err(MoneyError::TooPrecise));
        // trailing zeros do not count
        assert!(Money::new(dec!(1.500)).is_ok());
    }

    #[test]
    fn test_money_bounded_to_column_precision() {
        assert!(Money::new(dec!(9999999999999999.99)).is_ok());
        assert_eq!(Money::new(dec!(10000000000000000)), Err(MoneyError::TooLarge));
        assert!(serde_json::from_str::<Money>("\"100000000000000000\"").is_err());
    }

    #[test]
    fn test_checked_add_stays_in_range() {
        let top = Money::new(dec!(9999999999999999.99)).unwrap();
        assert_eq!(top.checked_add(Money::new(dec!(0.01)).unwrap()), Err(MoneyError::Overflow));
        assert_eq!(top.checked_add(Money::ZERO), Ok(top));
    }

    #[test]
    fn test_checked_sub_never_goes_negative() {
        let a = Money::new(dec!(10)).unwrap();
        let b = Money::new(dec!(10.01)).unwrap();
        assert_eq!(a.checked_sub(b), Err(MoneyError::Negative));
        assert_eq!(b.checked_sub(a).unwrap().amount(), dec!(0.01));
    }

    #[test]
    fn test_basis_points_rounds_down() {
        let price = Money::new(dec!(99.99)).unwrap();
        // 10% of 99.99 = 9.999 -> 9.99
        assert_eq!(price.basis_points(1_000).amount(), dec!(9.99));
        assert_eq!(price.basis_points(0), Money::ZERO);
        assert_eq!(price.basis_points(10_000), price);
    }

    #[test]
    fn test_money_serde() {
        let m: Money = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(m.amount(), dec!(12.5));
        let m: Money = serde_json::from_str("40").unwrap();
        assert_eq!(m, Money::from_units(40));
        assert!(serde_json::from_str::<Money>("\"-3\"").is_err());
    }
}
