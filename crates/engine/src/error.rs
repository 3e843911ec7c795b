//! Engine errors
//!
//! Every variant is a rejected transaction: the caller can retry with
//! different parameters or wait for external conditions to change. No
//! operation partially applies and then errors.

use lendledger_core::{AccountId, Asset};
use lendledger_custody::CustodyError;
use lendledger_oracle::OracleError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Market already listed: {asset}")]
    AlreadyListed { asset: Asset },

    #[error("Market not listed: {asset}")]
    NotListed { asset: Asset },

    #[error("Insufficient {asset} balance for {account}: available {available}, requested {requested}")]
    InsufficientBalance {
        account: AccountId,
        asset: Asset,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Insufficient {asset} liquidity: available {available}, requested {requested}")]
    InsufficientLiquidity {
        asset: Asset,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Repay of {requested} {asset} exceeds outstanding debt {debt}")]
    RepayExceedsDebt {
        asset: Asset,
        debt: Decimal,
        requested: Decimal,
    },

    #[error("Insufficient collateral: health would be {ratio}, minimum is {minimum}")]
    InsufficientCollateral { ratio: Decimal, minimum: Decimal },

    #[error("Position would become unhealthy: health would be {ratio}, minimum is {minimum}")]
    UnhealthyPosition { ratio: Decimal, minimum: Decimal },

    #[error("Account {account} is healthy ({health}), liquidation rejected")]
    AccountHealthy { account: AccountId, health: String },

    #[error("Self-liquidation is not permitted")]
    SelfLiquidation,

    #[error("Insufficient {asset} collateral to seize: available {available}, required {required}")]
    InsufficientCollateralToSeize {
        asset: Asset,
        available: Decimal,
        required: Decimal,
    },

    #[error("Aggregate underflow in {asset} {aggregate}")]
    Underflow {
        asset: Asset,
        aggregate: &'static str,
    },

    #[error("Oracle failure: {0}")]
    Oracle(#[from] OracleError),

    #[error("Custody failure: {0}")]
    Custody(#[from] CustodyError),
}
