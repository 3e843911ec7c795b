//! Interest rate models
//!
//! Pure functions from market utilization to annualized rates. The borrow
//! rate is monotonic non-decreasing in utilization for both model shapes;
//! suppliers earn the borrow rate scaled by utilization, less the reserve
//! factor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Utilization of a market: borrows over supply, clamped to [0, 1].
///
/// Zero when nothing is supplied.
pub fn utilization(total_borrows: Decimal, total_supply: Decimal) -> Decimal {
    if total_supply.is_zero() {
        return Decimal::ZERO;
    }
    (total_borrows / total_supply).clamp(Decimal::ZERO, Decimal::ONE)
}

/// Supply rate implied by utilization, borrow rate and the reserve cut
pub fn supply_rate(
    utilization: Decimal,
    borrow_rate: Decimal,
    reserve_factor: Decimal,
) -> Decimal {
    utilization * borrow_rate * (Decimal::ONE - reserve_factor)
}

/// Annualized borrow rate as a function of utilization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestRateModel {
    /// `base + utilization * slope`
    Linear { base: Decimal, slope: Decimal },

    /// Linear up to the kink, then a steeper slope beyond it
    Kinked {
        base: Decimal,
        slope: Decimal,
        kink: Decimal,
        jump_slope: Decimal,
    },
}

impl InterestRateModel {
    /// Validate model parameters: rates and slopes non-negative, kink in (0, 1),
    /// jump slope at least the base slope (keeps the curve non-decreasing).
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |name: &str, reason: String| EngineError::InvalidParameter {
            name: name.to_string(),
            reason,
        };

        match self {
            InterestRateModel::Linear { base, slope } => {
                if base.is_sign_negative() || slope.is_sign_negative() {
                    return Err(invalid(
                        "rate_model",
                        format!("negative base or slope: base={}, slope={}", base, slope),
                    ));
                }
            }
            InterestRateModel::Kinked {
                base,
                slope,
                kink,
                jump_slope,
            } => {
                if base.is_sign_negative() || slope.is_sign_negative() {
                    return Err(invalid(
                        "rate_model",
                        format!("negative base or slope: base={}, slope={}", base, slope),
                    ));
                }
                if *kink <= Decimal::ZERO || *kink >= Decimal::ONE {
                    return Err(invalid(
                        "rate_model",
                        format!("kink must be in (0, 1), got {}", kink),
                    ));
                }
                if jump_slope < slope {
                    return Err(invalid(
                        "rate_model",
                        format!(
                            "jump slope {} below slope {} breaks monotonicity",
                            jump_slope, slope
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Annualized borrow rate at the given utilization (clamped to [0, 1])
    pub fn borrow_rate(&self, utilization: Decimal) -> Decimal {
        let u = utilization.clamp(Decimal::ZERO, Decimal::ONE);

        match self {
            InterestRateModel::Linear { base, slope } => *base + u * *slope,
            InterestRateModel::Kinked {
                base,
                slope,
                kink,
                jump_slope,
            } => {
                if u <= *kink {
                    *base + u * *slope
                } else {
                    *base + *kink * *slope + (u - *kink) * *jump_slope
                }
            }
        }
    }
}

impl Default for InterestRateModel {
    /// 2% base, 20% slope: 22% borrow APR at full utilization
    fn default() -> Self {
        use rust_decimal_macros::dec;
        InterestRateModel::Linear {
            base: dec!(0.02),
            slope: dec!(0.20),
        }
    }
}
