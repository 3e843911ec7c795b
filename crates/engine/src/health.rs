//! Health engine - cross-market collateralization
//!
//! An account's health is the ratio of collateral-adjusted supply value to
//! borrow value across every listed market, priced fresh from the oracle on
//! each evaluation. Debt-free accounts are unconstrained rather than
//! divided-by-zero.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use lendledger_core::{AccountId, Asset};
use lendledger_oracle::{OracleError, PriceOracle};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::market::Market;
use crate::position::PositionStore;

/// Cross-market health of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    /// No outstanding debt; any collateral level is acceptable
    Unconstrained,
    /// Collateral-adjusted supply value over borrow value
    Ratio(Decimal),
}

impl Health {
    /// True when the account is constrained and its ratio is under `minimum`
    pub fn is_below(&self, minimum: Decimal) -> bool {
        match self {
            Health::Unconstrained => false,
            Health::Ratio(ratio) => *ratio < minimum,
        }
    }

    /// The ratio, when constrained
    pub fn ratio(&self) -> Option<Decimal> {
        match self {
            Health::Unconstrained => None,
            Health::Ratio(ratio) => Some(*ratio),
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Unconstrained => write!(f, "unconstrained"),
            Health::Ratio(ratio) => write!(f, "{}", ratio),
        }
    }
}

/// A provisional balance change applied on top of stored positions, used to
/// evaluate the health an operation WOULD leave behind before committing it.
#[derive(Debug, Clone)]
pub(crate) struct BalanceAdjustment {
    pub asset: Asset,
    pub supply_delta: Decimal,
    pub borrow_delta: Decimal,
}

impl BalanceAdjustment {
    /// A pending withdrawal of `amount`
    pub fn withdraw(asset: Asset, amount: Decimal) -> Self {
        Self {
            asset,
            supply_delta: -amount,
            borrow_delta: Decimal::ZERO,
        }
    }

    /// A pending borrow of `amount`
    pub fn borrow(asset: Asset, amount: Decimal) -> Self {
        Self {
            asset,
            supply_delta: Decimal::ZERO,
            borrow_delta: amount,
        }
    }
}

/// Fetch a fresh quote and reject stale or non-positive values.
pub(crate) fn validated_price(
    oracle: &dyn PriceOracle,
    asset: &Asset,
    now: DateTime<Utc>,
    max_age_secs: u64,
) -> Result<Decimal, EngineError> {
    let quote = oracle.quote(asset)?;

    if quote.is_stale(now, max_age_secs) {
        return Err(OracleError::StalePrice {
            asset: asset.clone(),
            age_secs: quote.age_secs(now),
            max_age_secs,
        }
        .into());
    }

    if quote.value <= Decimal::ZERO {
        return Err(OracleError::InvalidPrice {
            asset: asset.clone(),
            reason: format!("non-positive value {}", quote.value),
        }
        .into());
    }

    Ok(quote.value)
}

/// Evaluate an account's health across all listed markets.
///
/// Markets where the account holds nothing are skipped without touching the
/// oracle; every market it does touch needs a fresh, valid quote or the whole
/// evaluation aborts.
pub(crate) fn evaluate(
    markets: &HashMap<Asset, Market>,
    positions: &PositionStore,
    oracle: &dyn PriceOracle,
    account: &AccountId,
    adjustment: Option<&BalanceAdjustment>,
    now: DateTime<Utc>,
    max_age_secs: u64,
) -> Result<Health, EngineError> {
    let mut collateral_value = Decimal::ZERO;
    let mut borrow_value = Decimal::ZERO;

    for (asset, market) in markets {
        let mut supplied = positions.supply_balance(account, asset, market.supply_index);
        let mut borrowed = positions.borrow_balance(account, asset, market.borrow_index);

        if let Some(adjustment) = adjustment {
            if adjustment.asset == *asset {
                supplied += adjustment.supply_delta;
                borrowed += adjustment.borrow_delta;
            }
        }

        if supplied.is_zero() && borrowed.is_zero() {
            continue;
        }

        let price = validated_price(oracle, asset, now, max_age_secs)?;

        collateral_value += supplied * price * market.params.collateral_factor;
        borrow_value += borrowed * price;
    }

    if borrow_value.is_zero() {
        Ok(Health::Unconstrained)
    } else {
        Ok(Health::Ratio(collateral_value / borrow_value))
    }
}
