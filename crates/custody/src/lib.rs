//! LendLedger Asset Custody
//!
//! The ledger never moves tokens itself; it instructs an external custodian
//! and only mutates its own state after the custodian confirms. Currently
//! implements MockCustody for testing; a production deployment adapts this
//! trait over its settlement rails.

mod error;
mod mock;

use lendledger_core::{AccountId, Amount, Asset};

pub use error::CustodyError;
pub use mock::{MockCustody, TransferDirection, TransferRecord};

/// Asset custody trait - interface for external transfer settlement
///
/// Both calls are synchronous and fallible. A failure means no value moved;
/// the custodian never leaves a transfer half-settled.
pub trait AssetCustody: Send + Sync {
    /// Pull `amount` of `asset` from `from` into the system's custody
    fn transfer_in(
        &self,
        asset: &Asset,
        from: &AccountId,
        amount: Amount,
    ) -> Result<(), CustodyError>;

    /// Release `amount` of `asset` from the system's custody to `to`
    fn transfer_out(
        &self,
        asset: &Asset,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), CustodyError>;
}
