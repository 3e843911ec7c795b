//! AccountId - Validated account identifier
//!
//! Accounts are implicit aggregates over positions; the only standalone
//! account artifact is the identifier itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing account identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Empty account id")]
    Empty,

    #[error("Account id too long (max 64 chars): {0}")]
    TooLong(String),

    #[error("Invalid account id (alphanumeric, '-' and '_' only): {0}")]
    InvalidFormat(String),
}

/// A validated account identifier.
///
/// # Example
/// ```
/// use lendledger_core::AccountId;
///
/// let alice: AccountId = "alice".parse().unwrap();
/// assert_eq!(alice.as_str(), "alice");
///
/// assert!("".parse::<AccountId>().is_err());
/// assert!("no spaces".parse::<AccountId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Create a new AccountId, validating the format.
    pub fn new(id: impl Into<String>) -> Result<Self, AccountIdError> {
        let id = id.into();
        let trimmed = id.trim();

        if trimmed.is_empty() {
            return Err(AccountIdError::Empty);
        }

        if trimmed.len() > 64 {
            return Err(AccountIdError::TooLong(trimmed.to_string()));
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AccountIdError::InvalidFormat(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}
