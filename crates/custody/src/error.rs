//! Custody error types

use lendledger_core::{AccountId, Asset};
use thiserror::Error;

/// Custody-related errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// The custodian refused or failed the transfer; no value moved
    #[error("Transfer of {asset} for {party} rejected: {reason}")]
    TransferRejected {
        asset: Asset,
        party: AccountId,
        reason: String,
    },
}
