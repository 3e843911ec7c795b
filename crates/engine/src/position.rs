//! Account positions - per (account, market) supply and borrow balances
//!
//! Positions snapshot the market index at their last touch; the current
//! balance is the stored balance scaled by the index ratio. Positions are
//! created on first use and never physically deleted - a balance of zero is
//! the "absent" state.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use lendledger_core::{AccountId, Asset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One account's supplied balance in one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyPosition {
    pub balance: Decimal,
    /// Market supply index at the last touch
    pub interest_index: Decimal,
}

impl SupplyPosition {
    /// Open an empty position at the given index
    pub fn open(index: Decimal) -> Self {
        Self {
            balance: Decimal::ZERO,
            interest_index: index,
        }
    }

    /// Balance including interest accrued since the last touch
    pub fn current_balance(&self, market_index: Decimal) -> Decimal {
        if self.balance.is_zero() || self.interest_index == market_index {
            self.balance
        } else {
            self.balance * market_index / self.interest_index
        }
    }

    /// Fold accrued interest into the stored balance
    pub fn refresh(&mut self, market_index: Decimal) {
        self.balance = self.current_balance(market_index);
        self.interest_index = market_index;
    }
}

/// One account's debt in one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowPosition {
    pub balance: Decimal,
    /// Market borrow index at the last touch
    pub interest_index: Decimal,
    pub last_update: DateTime<Utc>,
}

impl BorrowPosition {
    /// Open an empty position at the given index
    pub fn open(index: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            balance: Decimal::ZERO,
            interest_index: index,
            last_update: now,
        }
    }

    /// Debt including interest accrued since the last touch
    pub fn current_balance(&self, market_index: Decimal) -> Decimal {
        if self.balance.is_zero() || self.interest_index == market_index {
            self.balance
        } else {
            self.balance * market_index / self.interest_index
        }
    }

    /// Fold accrued interest into the stored balance
    pub fn refresh(&mut self, market_index: Decimal, now: DateTime<Utc>) {
        self.balance = self.current_balance(market_index);
        self.interest_index = market_index;
        self.last_update = now;
    }
}

/// Read-only position snapshot for callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub account: AccountId,
    pub asset: Asset,
    pub supplied: Decimal,
    pub borrowed: Decimal,
}

type PositionKey = (AccountId, Asset);

/// The engine's position store: maps keyed by (account, market)
#[derive(Debug, Default, Clone)]
pub struct PositionStore {
    supplies: HashMap<PositionKey, SupplyPosition>,
    borrows: HashMap<PositionKey, BorrowPosition>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a supply position
    pub fn supply(&self, account: &AccountId, asset: &Asset) -> Option<&SupplyPosition> {
        self.supplies.get(&(account.clone(), asset.clone()))
    }

    /// Get or create a supply position, opening it at `market_index`
    pub fn supply_mut(
        &mut self,
        account: &AccountId,
        asset: &Asset,
        market_index: Decimal,
    ) -> &mut SupplyPosition {
        self.supplies
            .entry((account.clone(), asset.clone()))
            .or_insert_with(|| SupplyPosition::open(market_index))
    }

    /// Current supply balance, zero when no position exists
    pub fn supply_balance(
        &self,
        account: &AccountId,
        asset: &Asset,
        market_index: Decimal,
    ) -> Decimal {
        self.supply(account, asset)
            .map(|p| p.current_balance(market_index))
            .unwrap_or(Decimal::ZERO)
    }

    /// Look up a borrow position
    pub fn borrow(&self, account: &AccountId, asset: &Asset) -> Option<&BorrowPosition> {
        self.borrows.get(&(account.clone(), asset.clone()))
    }

    /// Get or create a borrow position, opening it at `market_index`
    pub fn borrow_mut(
        &mut self,
        account: &AccountId,
        asset: &Asset,
        market_index: Decimal,
        now: DateTime<Utc>,
    ) -> &mut BorrowPosition {
        self.borrows
            .entry((account.clone(), asset.clone()))
            .or_insert_with(|| BorrowPosition::open(market_index, now))
    }

    /// Current debt, zero when no position exists
    pub fn borrow_balance(
        &self,
        account: &AccountId,
        asset: &Asset,
        market_index: Decimal,
    ) -> Decimal {
        self.borrow(account, asset)
            .map(|p| p.current_balance(market_index))
            .unwrap_or(Decimal::ZERO)
    }

    /// All accounts with outstanding debt, in stable order
    pub fn borrowing_accounts(&self) -> BTreeSet<AccountId> {
        self.borrows
            .iter()
            .filter(|(_, position)| position.balance > Decimal::ZERO)
            .map(|((account, _), _)| account.clone())
            .collect()
    }
}
