//! Engine configuration
//!
//! Risk parameters are fixed at construction; the engine exposes no setters,
//! so changing them means building a new engine through whatever admin path
//! the host provides.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Default minimum collateralization ratio (125%)
pub const DEFAULT_MIN_COLLATERAL_RATIO: Decimal = dec!(1.25);

/// Default liquidation discount (liquidators buy collateral at 95% of value)
pub const DEFAULT_LIQUIDATION_DISCOUNT: Decimal = dec!(0.95);

/// Default oracle quote freshness threshold
pub const DEFAULT_MAX_QUOTE_AGE_SECS: u64 = 300;

/// Global risk configuration for a `LendingEngine`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    min_collateral_ratio: Decimal,
    liquidation_discount: Decimal,
    max_quote_age_secs: u64,
}

impl EngineConfig {
    /// Create a validated configuration.
    ///
    /// `min_collateral_ratio` must be at least 1; `liquidation_discount`
    /// must lie strictly between 0 and 1; the quote age threshold must be
    /// non-zero.
    pub fn new(
        min_collateral_ratio: Decimal,
        liquidation_discount: Decimal,
        max_quote_age_secs: u64,
    ) -> Result<Self, EngineError> {
        if min_collateral_ratio < Decimal::ONE {
            return Err(EngineError::InvalidParameter {
                name: "min_collateral_ratio".to_string(),
                reason: format!("must be >= 1, got {}", min_collateral_ratio),
            });
        }

        if liquidation_discount <= Decimal::ZERO || liquidation_discount >= Decimal::ONE {
            return Err(EngineError::InvalidParameter {
                name: "liquidation_discount".to_string(),
                reason: format!("must be in (0, 1), got {}", liquidation_discount),
            });
        }

        if max_quote_age_secs == 0 {
            return Err(EngineError::InvalidParameter {
                name: "max_quote_age_secs".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }

        Ok(Self {
            min_collateral_ratio,
            liquidation_discount,
            max_quote_age_secs,
        })
    }

    /// Minimum health ratio required after withdraw/borrow
    pub fn min_collateral_ratio(&self) -> Decimal {
        self.min_collateral_ratio
    }

    /// Discount applied to seized collateral (the liquidator's incentive)
    pub fn liquidation_discount(&self) -> Decimal {
        self.liquidation_discount
    }

    /// Maximum accepted oracle quote age in seconds
    pub fn max_quote_age_secs(&self) -> u64 {
        self.max_quote_age_secs
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_collateral_ratio: DEFAULT_MIN_COLLATERAL_RATIO,
            liquidation_discount: DEFAULT_LIQUIDATION_DISCOUNT,
            max_quote_age_secs: DEFAULT_MAX_QUOTE_AGE_SECS,
        }
    }
}
