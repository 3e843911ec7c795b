//! Mock Oracle for testing
//!
//! Provides configurable fixed prices for testing health and liquidation
//! calculations.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;

use lendledger_core::Asset;

use crate::error::OracleError;
use crate::types::{PriceOracle, PriceQuote};

/// Mock Price Oracle for testing
///
/// Stores fixed quotes that can be updated programmatically. Removing a quote
/// simulates feed loss; backdating one simulates staleness.
pub struct MockOracle {
    quotes: RwLock<HashMap<Asset, PriceQuote>>,
}

impl MockOracle {
    /// Create a new empty mock oracle
    pub fn new() -> Self {
        Self {
            quotes: RwLock::new(HashMap::new()),
        }
    }

    /// Create a mock oracle with default quotes
    pub fn with_defaults() -> Self {
        let oracle = Self::new();

        oracle.set_price(Asset::Btc, Decimal::from(50000));
        oracle.set_price(Asset::Eth, Decimal::from(3000));
        oracle.set_price(Asset::Sol, Decimal::from(100));
        oracle.set_price(Asset::Usdc, Decimal::ONE);

        oracle
    }

    /// Set a fixed price for an asset, stamped now
    pub fn set_price(&self, asset: Asset, value: Decimal) {
        let quote = PriceQuote::simple(asset.clone(), value);
        let mut quotes = self.quotes.write().unwrap();
        quotes.insert(asset, quote);
    }

    /// Replace the full quote, including its timestamp (for staleness tests)
    pub fn set_quote(&self, quote: PriceQuote) {
        let mut quotes = self.quotes.write().unwrap();
        quotes.insert(quote.asset.clone(), quote);
    }

    /// Remove a quote (simulates feed loss)
    pub fn remove_price(&self, asset: &Asset) {
        let mut quotes = self.quotes.write().unwrap();
        quotes.remove(asset);
    }

    /// Number of configured assets
    pub fn asset_count(&self) -> usize {
        self.quotes.read().unwrap().len()
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PriceOracle for MockOracle {
    fn quote(&self, asset: &Asset) -> Result<PriceQuote, OracleError> {
        let quotes = self.quotes.read().unwrap();
        quotes
            .get(asset)
            .cloned()
            .ok_or_else(|| OracleError::PriceUnavailable {
                asset: asset.clone(),
            })
    }

    fn supported_assets(&self) -> Vec<Asset> {
        let quotes = self.quotes.read().unwrap();
        quotes.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mock_oracle_default_prices() {
        let oracle = MockOracle::with_defaults();

        let btc = oracle.quote(&Asset::Btc).unwrap();
        assert_eq!(btc.value, Decimal::from(50000));

        let usdc = oracle.quote(&Asset::Usdc).unwrap();
        assert_eq!(usdc.value, Decimal::ONE);
    }

    #[test]
    fn test_mock_oracle_set_price() {
        let oracle = MockOracle::new();

        assert!(oracle.quote(&Asset::Dai).is_err());

        oracle.set_price(Asset::Dai, dec!(0.999));

        let quote = oracle.quote(&Asset::Dai).unwrap();
        assert_eq!(quote.value, dec!(0.999));
        assert_eq!(quote.source, "mock");
    }

    #[test]
    fn test_mock_oracle_price_unavailable() {
        let oracle = MockOracle::new();

        let result = oracle.quote(&Asset::Eth);
        assert!(matches!(
            result,
            Err(OracleError::PriceUnavailable { .. })
        ));
    }

    #[test]
    fn test_mock_oracle_remove_price() {
        let oracle = MockOracle::with_defaults();
        assert!(oracle.quote(&Asset::Btc).is_ok());

        oracle.remove_price(&Asset::Btc);
        assert!(oracle.quote(&Asset::Btc).is_err());
    }

    #[test]
    fn test_mock_oracle_supported_assets() {
        let oracle = MockOracle::with_defaults();
        let assets = oracle.supported_assets();

        assert_eq!(assets.len(), 4);
        assert!(oracle.is_supported(&Asset::Btc));
        assert!(!oracle.is_supported(&Asset::Dai));
    }
}
