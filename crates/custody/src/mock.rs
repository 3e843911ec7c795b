//! Mock custody for testing
//!
//! Records every confirmed transfer and supports per-asset, per-direction
//! failure injection so rollback paths can be exercised.

use std::collections::HashSet;
use std::sync::RwLock;

use lendledger_core::{AccountId, Amount, Asset};
use serde::{Deserialize, Serialize};

use crate::error::CustodyError;
use crate::AssetCustody;

/// Direction of a custody transfer, from the system's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferDirection {
    /// Into system custody (supply, repay, liquidation repayment)
    In,
    /// Out of system custody (withdraw, borrow, collateral seizure payout)
    Out,
}

/// One confirmed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub direction: TransferDirection,
    pub asset: Asset,
    pub party: AccountId,
    pub amount: Amount,
}

/// Mock custodian for testing
///
/// Confirms every transfer unless the (asset, direction) pair has been denied.
pub struct MockCustody {
    records: RwLock<Vec<TransferRecord>>,
    denied: RwLock<HashSet<(Asset, TransferDirection)>>,
}

impl MockCustody {
    /// Create a custodian that confirms everything
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            denied: RwLock::new(HashSet::new()),
        }
    }

    /// Make transfers of `asset` in `direction` fail until allowed again
    pub fn deny(&self, asset: Asset, direction: TransferDirection) {
        self.denied.write().unwrap().insert((asset, direction));
    }

    /// Lift a previous denial
    pub fn allow(&self, asset: &Asset, direction: TransferDirection) {
        self.denied
            .write()
            .unwrap()
            .remove(&(asset.clone(), direction));
    }

    /// All confirmed transfers, in settlement order
    pub fn records(&self) -> Vec<TransferRecord> {
        self.records.read().unwrap().clone()
    }

    /// Number of confirmed transfers
    pub fn record_count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    fn settle(
        &self,
        direction: TransferDirection,
        asset: &Asset,
        party: &AccountId,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        if self
            .denied
            .read()
            .unwrap()
            .contains(&(asset.clone(), direction))
        {
            return Err(CustodyError::TransferRejected {
                asset: asset.clone(),
                party: party.clone(),
                reason: "denied by test configuration".to_string(),
            });
        }

        self.records.write().unwrap().push(TransferRecord {
            direction,
            asset: asset.clone(),
            party: party.clone(),
            amount,
        });

        Ok(())
    }
}

impl Default for MockCustody {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCustody for MockCustody {
    fn transfer_in(
        &self,
        asset: &Asset,
        from: &AccountId,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        self.settle(TransferDirection::In, asset, from, amount)
    }

    fn transfer_out(
        &self,
        asset: &Asset,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        self.settle(TransferDirection::Out, asset, to, amount)
    }
}
