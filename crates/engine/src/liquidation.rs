//! Liquidation settlement
//!
//! Third parties repay an unhealthy borrower's debt and receive collateral at
//! a discount. The seizure math lives here; eligibility gating and custody
//! sequencing live on the engine facade.

use lendledger_core::{AccountId, Asset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settled liquidation, as emitted to the audit log and returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    pub borrower: AccountId,
    pub liquidator: AccountId,
    pub repay_asset: Asset,
    pub collateral_asset: Asset,
    /// Debt repaid by the liquidator
    pub repaid: Decimal,
    /// Collateral transferred to the liquidator
    pub seized: Decimal,
    /// Health ratio that made the borrower eligible
    pub health_before: Decimal,
}

/// Collateral owed for repaying `repay_amount` of debt.
///
/// The discount is what makes liquidation worth doing: the liquidator pays
/// `repay_amount` of debt value and receives collateral worth
/// `repay_amount / discount` at oracle prices.
pub(crate) fn seized_collateral(
    repay_amount: Decimal,
    repay_price: Decimal,
    collateral_price: Decimal,
    discount: Decimal,
) -> Decimal {
    repay_amount * (repay_price / collateral_price) / discount
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_seizure_at_equal_prices() {
        // Repaying 95 seizes 100 at a 0.95 discount
        let seized = seized_collateral(dec!(95), Decimal::ONE, Decimal::ONE, dec!(0.95));
        assert_eq!(seized, dec!(100));
    }

    #[test]
    fn test_seizure_exceeds_repaid_value() {
        let seized = seized_collateral(dec!(30), Decimal::ONE, Decimal::ONE, dec!(0.95));
        assert!(seized > dec!(30));
    }

    #[test]
    fn test_seizure_across_prices() {
        // Collateral at 0.7, debt at 1.0: more collateral units per debt unit
        let seized = seized_collateral(dec!(30), Decimal::ONE, dec!(0.7), dec!(0.95));
        let expected = dec!(30) * (Decimal::ONE / dec!(0.7)) / dec!(0.95);
        assert_eq!(seized, expected);
        assert!(seized > dec!(45) && seized < dec!(46));
    }
}
