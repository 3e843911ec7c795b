//! LendLedger Engine - Multi-market collateralized lending ledger
//!
//! A single-writer, transactional accounting engine: accounts supply assets
//! into per-asset markets, borrow against cross-market collateral, and are
//! liquidated by third parties when their health ratio falls below the
//! configured minimum. Every public operation accrues interest on the touched
//! markets first, then validates, then settles custody, then commits - either
//! all ledger mutations apply or none do.
//!
//! # Key Types
//! - `LendingEngine`: the facade owning markets, positions and the audit log
//! - `Market`: per-asset aggregate state with index-based interest accrual
//! - `Health`: cross-market collateralization ratio (or the unconstrained
//!   sentinel for debt-free accounts)
//! - `EngineError`: the full rejection taxonomy; nothing is process-fatal

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod health;
pub mod interest;
pub mod liquidation;
pub mod market;
pub mod position;

pub use config::EngineConfig;
pub use engine::LendingEngine;
pub use error::EngineError;
pub use event::{EventKind, EventLog, LedgerEvent};
pub use health::Health;
pub use interest::InterestRateModel;
pub use liquidation::LiquidationOutcome;
pub use market::{Market, MarketInfo, MarketParams, SECONDS_PER_YEAR};
pub use position::{BorrowPosition, PositionStore, PositionSummary, SupplyPosition};
