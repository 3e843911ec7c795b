//! Audit events
//!
//! Every committed operation appends one `LedgerEvent`. The log is in-memory
//! and append-only; hosts drain it into whatever durable sink they run.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lendledger_core::{AccountId, Asset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Kind of committed operation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    MarketListed,
    Supplied,
    Withdrawn,
    Borrowed,
    Repaid,
    Liquidated,
}

/// One committed operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    /// Initiating account; None for administrative operations
    pub account: Option<AccountId>,
    /// Primary market touched
    pub asset: Asset,
    pub amount: Decimal,
    /// Operation-specific payload
    pub detail: HashMap<String, serde_json::Value>,
}

impl LedgerEvent {
    pub fn new(
        kind: EventKind,
        account: Option<AccountId>,
        asset: Asset,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            kind,
            account,
            asset,
            amount,
            detail: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: serde_json::Value) -> Self {
        self.detail.insert(key.to_string(), value);
        self
    }
}

/// In-memory append-only audit log
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event
    pub fn record(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// All events, in commit order
    pub fn all(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take all events, leaving the log empty
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}
