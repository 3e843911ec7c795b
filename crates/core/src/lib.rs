//! LendLedger Core - Domain types
//!
//! This crate contains the fundamental types used across LendLedger:
//! - `Amount`: Non-negative decimal wrapper for financial amounts
//! - `Asset`: Type-safe asset codes for lendable/borrowable assets
//! - `AccountId`: Validated account identifier

pub mod account;
pub mod amount;
pub mod asset;

pub use account::AccountId;
pub use amount::Amount;
pub use asset::Asset;
