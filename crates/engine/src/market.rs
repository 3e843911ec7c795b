//! Market ledger - per-asset aggregate state and interest accrual
//!
//! Each listed asset has one `Market`. Accrual folds borrow interest into the
//! aggregates and grows the supply/borrow indexes; individual positions catch
//! up lazily against the index when they are next touched.

use chrono::{DateTime, Utc};
use lendledger_core::Asset;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::interest::{supply_rate, utilization, InterestRateModel};

/// Seconds in a 365-day year, the accrual denominator
pub const SECONDS_PER_YEAR: Decimal = dec!(31536000);

/// Listing parameters for a market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    /// Fraction of supplied value counted as collateral, in [0, 1]
    pub collateral_factor: Decimal,
    /// Fraction of borrow interest diverted to reserves, in [0, 1]
    pub reserve_factor: Decimal,
    /// Rate model driving accrual
    pub rate_model: InterestRateModel,
}

impl MarketParams {
    /// Create validated parameters
    pub fn new(
        collateral_factor: Decimal,
        reserve_factor: Decimal,
        rate_model: InterestRateModel,
    ) -> Result<Self, EngineError> {
        let params = Self {
            collateral_factor,
            reserve_factor,
            rate_model,
        };
        params.validate()?;
        Ok(params)
    }

    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        let check_fraction = |name: &'static str, value: Decimal| {
            if value < Decimal::ZERO || value > Decimal::ONE {
                Err(EngineError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("must be in [0, 1], got {}", value),
                })
            } else {
                Ok(())
            }
        };

        check_fraction("collateral_factor", self.collateral_factor)?;
        check_fraction("reserve_factor", self.reserve_factor)?;
        self.rate_model.validate()
    }
}

/// Per-asset aggregate ledger state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub asset: Asset,
    /// Sum of all supply positions, at current index
    pub total_supply: Decimal,
    /// Sum of all borrow positions, at current index
    pub total_borrows: Decimal,
    /// Interest diverted from suppliers via the reserve factor
    pub total_reserves: Decimal,
    /// Annualized rates as of the last accrual
    pub borrow_rate: Decimal,
    pub supply_rate: Decimal,
    /// Cumulative interest indexes, starting at 1
    pub borrow_index: Decimal,
    pub supply_index: Decimal,
    /// Accrual checkpoint
    pub last_accrual: DateTime<Utc>,
    pub params: MarketParams,
}

impl Market {
    /// Create an empty market at the given checkpoint
    pub fn new(asset: Asset, params: MarketParams, now: DateTime<Utc>) -> Self {
        let borrow_rate = params.rate_model.borrow_rate(Decimal::ZERO);
        Self {
            asset,
            total_supply: Decimal::ZERO,
            total_borrows: Decimal::ZERO,
            total_reserves: Decimal::ZERO,
            borrow_rate,
            supply_rate: Decimal::ZERO,
            borrow_index: Decimal::ONE,
            supply_index: Decimal::ONE,
            last_accrual: now,
            params,
        }
    }

    /// Current utilization: borrows over supply, clamped to [0, 1]
    pub fn utilization(&self) -> Decimal {
        utilization(self.total_borrows, self.total_supply)
    }

    /// Liquidity available for borrow or withdrawal
    pub fn available_liquidity(&self) -> Decimal {
        (self.total_supply - self.total_borrows).max(Decimal::ZERO)
    }

    /// Accrue interest from the last checkpoint to `now`.
    ///
    /// No-op when `now` is at or before the checkpoint. Rates are recomputed
    /// from utilization at the start of the window and applied as simple
    /// interest over it; successive accruals compound.
    pub fn accrue(&mut self, now: DateTime<Utc>) {
        let elapsed = now.signed_duration_since(self.last_accrual).num_seconds();
        if elapsed <= 0 {
            return;
        }

        let util = self.utilization();
        let borrow_rate = self.params.rate_model.borrow_rate(util);
        let supply_rate = supply_rate(util, borrow_rate, self.params.reserve_factor);

        let year_fraction = Decimal::from(elapsed) / SECONDS_PER_YEAR;
        let borrow_growth = borrow_rate * year_fraction;
        let supply_growth = supply_rate * year_fraction;

        let interest = self.total_borrows * borrow_growth;
        let reserve_cut = interest * self.params.reserve_factor;

        self.total_borrows += interest;
        self.total_supply += interest - reserve_cut;
        self.total_reserves += reserve_cut;
        self.borrow_index *= Decimal::ONE + borrow_growth;
        self.supply_index *= Decimal::ONE + supply_growth;

        self.borrow_rate = borrow_rate;
        self.supply_rate = supply_rate;
        self.last_accrual = now;
    }

    /// Decrease total supply, rejecting underflow
    pub fn decrease_supply(&mut self, amount: Decimal) -> Result<(), EngineError> {
        if amount > self.total_supply {
            return Err(EngineError::Underflow {
                asset: self.asset.clone(),
                aggregate: "total_supply",
            });
        }
        self.total_supply -= amount;
        Ok(())
    }

    /// Decrease total borrows, rejecting underflow
    pub fn decrease_borrows(&mut self, amount: Decimal) -> Result<(), EngineError> {
        if amount > self.total_borrows {
            return Err(EngineError::Underflow {
                asset: self.asset.clone(),
                aggregate: "total_borrows",
            });
        }
        self.total_borrows -= amount;
        Ok(())
    }
}

/// Read-only market snapshot for callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub asset: Asset,
    pub total_supply: Decimal,
    pub total_borrows: Decimal,
    pub total_reserves: Decimal,
    pub borrow_rate: Decimal,
    pub supply_rate: Decimal,
    pub utilization: Decimal,
    pub collateral_factor: Decimal,
    pub reserve_factor: Decimal,
    pub last_accrual: DateTime<Utc>,
}

impl From<&Market> for MarketInfo {
    fn from(market: &Market) -> Self {
        Self {
            asset: market.asset.clone(),
            total_supply: market.total_supply,
            total_borrows: market.total_borrows,
            total_reserves: market.total_reserves,
            borrow_rate: market.borrow_rate,
            supply_rate: market.supply_rate,
            utilization: market.utilization(),
            collateral_factor: market.params.collateral_factor,
            reserve_factor: market.params.reserve_factor,
            last_accrual: market.last_accrual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_params() -> MarketParams {
        MarketParams::new(
            dec!(0.8),
            dec!(0.10),
            InterestRateModel::Linear {
                base: dec!(0.02),
                slope: dec!(0.10),
            },
        )
        .unwrap()
    }

    fn market_at(now: DateTime<Utc>) -> Market {
        Market::new(Asset::Usdc, test_params(), now)
    }

    #[test]
    fn test_params_validate_fractions() {
        let result = MarketParams::new(dec!(1.5), dec!(0.10), InterestRateModel::default());
        assert!(matches!(result, Err(EngineError::InvalidParameter { .. })));

        let result = MarketParams::new(dec!(0.8), dec!(-0.1), InterestRateModel::default());
        assert!(matches!(result, Err(EngineError::InvalidParameter { .. })));
    }

    #[test]
    fn test_new_market_is_empty() {
        let now = Utc::now();
        let market = market_at(now);

        assert_eq!(market.total_supply, Decimal::ZERO);
        assert_eq!(market.utilization(), Decimal::ZERO);
        assert_eq!(market.borrow_index, Decimal::ONE);
        assert_eq!(market.supply_index, Decimal::ONE);
        assert_eq!(market.borrow_rate, dec!(0.02));
    }

    #[test]
    fn test_accrue_noop_when_time_stands_still() {
        let now = Utc::now();
        let mut market = market_at(now);
        market.total_supply = dec!(1000);
        market.total_borrows = dec!(500);

        market.accrue(now);
        assert_eq!(market.borrow_index, Decimal::ONE);

        market.accrue(now - Duration::seconds(60));
        assert_eq!(market.borrow_index, Decimal::ONE);
        assert_eq!(market.last_accrual, now);
    }

    #[test]
    fn test_accrue_one_year() {
        let now = Utc::now();
        let mut market = market_at(now);
        market.total_supply = dec!(2000);
        market.total_borrows = dec!(400);

        market.accrue(now + Duration::days(365));

        // util 0.2 -> borrow rate 4%, supply rate 0.2 * 0.04 * 0.9 = 0.72%
        assert_eq!(market.borrow_rate, dec!(0.04));
        assert_eq!(market.supply_rate, dec!(0.0072));

        // interest 16, reserves take 1.6, suppliers get 14.4
        assert_eq!(market.total_borrows, dec!(416));
        assert_eq!(market.total_supply, dec!(2014.4));
        assert_eq!(market.total_reserves, dec!(1.6));
        assert_eq!(market.borrow_index, dec!(1.04));
        assert_eq!(market.supply_index, dec!(1.0072));
    }

    #[test]
    fn test_accrue_compounds_across_checkpoints() {
        let now = Utc::now();
        let mut market = market_at(now);
        market.total_supply = dec!(1000);
        market.total_borrows = dec!(1000);

        // Full utilization: borrow rate 12%
        market.accrue(now + Duration::days(365));
        assert_eq!(market.borrow_index, dec!(1.12));

        market.accrue(now + Duration::days(730));
        // Second year compounds on the first
        assert_eq!(market.borrow_index, dec!(1.12) * dec!(1.12));
    }

    #[test]
    fn test_available_liquidity() {
        let now = Utc::now();
        let mut market = market_at(now);
        market.total_supply = dec!(100);
        market.total_borrows = dec!(60);

        assert_eq!(market.available_liquidity(), dec!(40));
    }

    #[test]
    fn test_decrease_supply_underflow() {
        let now = Utc::now();
        let mut market = market_at(now);
        market.total_supply = dec!(50);

        let result = market.decrease_supply(dec!(51));
        assert!(matches!(
            result,
            Err(EngineError::Underflow {
                aggregate: "total_supply",
                ..
            })
        ));
        assert_eq!(market.total_supply, dec!(50));
    }

    #[test]
    fn test_decrease_borrows_underflow() {
        let now = Utc::now();
        let mut market = market_at(now);
        market.total_borrows = dec!(10);

        assert!(market.decrease_borrows(dec!(10)).is_ok());
        assert!(market.decrease_borrows(dec!(1)).is_err());
    }

    #[test]
    fn test_market_info_snapshot() {
        let now = Utc::now();
        let mut market = market_at(now);
        market.total_supply = dec!(100);
        market.total_borrows = dec!(25);

        let info = MarketInfo::from(&market);
        assert_eq!(info.utilization, dec!(0.25));
        assert_eq!(info.collateral_factor, dec!(0.8));
        assert_eq!(info.reserve_factor, dec!(0.10));
    }
}
