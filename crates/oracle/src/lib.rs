//! LendLedger Price Oracle
//!
//! Provides reference prices for collateral valuation and health checks.
//! Currently implements MockOracle for testing; can be extended for external
//! feeds. Every health evaluation queries the oracle fresh - quotes are never
//! cached across operations, and any oracle failure aborts the operation that
//! needed the price.

mod error;
mod mock;
mod types;

pub use error::OracleError;
pub use mock::MockOracle;
pub use types::{PriceOracle, PriceQuote};
