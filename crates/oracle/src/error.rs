//! Oracle error types

use lendledger_core::Asset;
use thiserror::Error;

/// Oracle-related errors
///
/// Any of these aborts the ledger operation that requested the price; the
/// engine never substitutes a stale or guessed value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// No price feed for the asset
    #[error("No price available for {asset}")]
    PriceUnavailable { asset: Asset },

    /// Quote is older than the freshness threshold
    #[error("Stale price for {asset}: quote is {age_secs}s old, threshold is {max_age_secs}s")]
    StalePrice {
        asset: Asset,
        age_secs: i64,
        max_age_secs: u64,
    },

    /// Quote value is unusable (zero or negative)
    #[error("Invalid price for {asset}: {reason}")]
    InvalidPrice { asset: Asset, reason: String },
}
