//! Core oracle types

use chrono::{DateTime, Utc};
use lendledger_core::Asset;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OracleError;

/// A price quote for one asset, denominated in the reference unit of account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// The quoted asset
    pub asset: Asset,
    /// Price in reference units per one unit of the asset
    pub value: Decimal,
    /// Timestamp when this quote was produced
    pub quoted_at: DateTime<Utc>,
    /// Source of the quote (e.g., "mock", "chainlink", "pyth")
    pub source: String,
}

impl PriceQuote {
    /// Create a new quote stamped now
    pub fn new(asset: Asset, value: Decimal, source: impl Into<String>) -> Self {
        Self {
            asset,
            value,
            quoted_at: Utc::now(),
            source: source.into(),
        }
    }

    /// Create a simple mock quote stamped now
    pub fn simple(asset: Asset, value: Decimal) -> Self {
        Self::new(asset, value, "mock")
    }

    /// Age of the quote in whole seconds, relative to `now`
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.quoted_at).num_seconds()
    }

    /// Check if the quote is older than the threshold
    pub fn is_stale(&self, now: DateTime<Utc>, max_age_secs: u64) -> bool {
        self.age_secs(now) > max_age_secs as i64
    }
}

/// Price Oracle trait - interface for price feeds
///
/// Implementations can be:
/// - MockOracle: fixed prices for testing
/// - An adapter over an external feed (exchange API, on-chain oracle)
///
/// Calls are synchronous and fallible; callers must treat every error as a
/// hard abort of the operation that needed the price.
pub trait PriceOracle: Send + Sync {
    /// Get the current quote for an asset
    fn quote(&self, asset: &Asset) -> Result<PriceQuote, OracleError>;

    /// Get quotes for multiple assets at once
    fn quotes(&self, assets: &[Asset]) -> Vec<Result<PriceQuote, OracleError>> {
        assets.iter().map(|a| self.quote(a)).collect()
    }

    /// List all assets this oracle can quote
    fn supported_assets(&self) -> Vec<Asset>;

    /// Check if an asset is supported
    fn is_supported(&self, asset: &Asset) -> bool {
        self.supported_assets().contains(asset)
    }
}
