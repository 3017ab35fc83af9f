//! Domain Services
//!
//! Pure settlement arithmetic. No I/O.

use kernel::money::Money;

use crate::error::{MarketError, MarketResult};

/// A validated split of a purchase amount: `0 < amount`, `0 <= commission <= amount`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionSplit {
    amount: Money,
    commission: Money,
}

impl CommissionSplit {
    pub fn new(amount: Money, commission: Money) -> MarketResult<Self> {
        if !amount.is_positive() {
            return Err(MarketError::InvalidAmount("Amount must be greater than zero"));
        }
        if commission > amount {
            return Err(MarketError::InvalidAmount("Commission cannot exceed the amount"));
        }
        Ok(Self { amount, commission })
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn commission(&self) -> Money {
        self.commission
    }

    pub fn owner_share(&self) -> Money {
        // commission <= amount checked in new()
        self.amount.checked_sub(self.commission).unwrap_or(Money::ZERO)
    }
}

/// Use the requested commission, or derive it from the configured rate
pub fn resolve_commission(amount: Money, requested: Option<Money>, rate_bps: u32) -> Money {
    requested.unwrap_or_else(|| amount.basis_points(rate_bps))
}
