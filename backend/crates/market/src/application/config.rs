//! Application Configuration
//!
//! Configuration for the market application layer.

use kernel::id::AccountId;
use thiserror::Error;

/// 10_000 basis points = 100%
pub const MAX_COMMISSION_BPS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketConfigError {
    #[error("Commission rate must be at most {MAX_COMMISSION_BPS} basis points")]
    CommissionRateOutOfRange,
}

/// Market application configuration
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Account credited with commissions
    pub platform_account_id: AccountId,
    /// Commission applied when a purchase omits it (basis points)
    pub commission_rate_bps: u32,
    /// Reject purchases whose amount differs from the listed price
    pub require_list_price: bool,
    /// Screenshot limit per project
    pub max_screenshots: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            platform_account_id: AccountId::from_uuid(uuid::Uuid::nil()),
            commission_rate_bps: 1_000, // 10%
            require_list_price: true,
            max_screenshots: 5,
        }
    }
}

impl MarketConfig {
    pub fn new(platform_account_id: AccountId) -> Self {
        Self {
            platform_account_id,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), MarketConfigError> {
        if self.commission_rate_bps > MAX_COMMISSION_BPS {
            return Err(MarketConfigError::CommissionRateOutOfRange);
        }
        Ok(())
    }
}
