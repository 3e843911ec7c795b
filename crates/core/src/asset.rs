//! Asset - Type-safe asset codes
//!
//! Each listed market is keyed by an `Asset`. Common assets are pre-defined;
//! anything else falls back to the `Other` variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing asset codes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Empty asset code")]
    EmptyCode,

    #[error("Asset code too long (max 10 chars): {0}")]
    TooLong(String),

    #[error("Invalid asset code format: {0}")]
    InvalidFormat(String),
}

/// Asset codes for lendable/borrowable assets
///
/// # Examples
/// ```
/// use lendledger_core::Asset;
///
/// let usdc: Asset = "USDC".parse().unwrap();
/// assert_eq!(usdc, Asset::Usdc);
///
/// let custom: Asset = "MYTOKEN".parse().unwrap();
/// assert!(matches!(custom, Asset::Other(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Asset {
    // === Stablecoins ===
    /// USD Coin
    Usdc,
    /// Tether USD
    Usdt,
    /// Dai
    Dai,

    // === Major Crypto ===
    /// Bitcoin
    Btc,
    /// Ethereum
    Eth,
    /// Solana
    Sol,

    // === Fiat ===
    /// US Dollar
    Usd,
    /// Euro
    Eur,

    // === Custom tokens ===
    /// Any other token/asset
    Other(String),
}

impl Asset {
    /// Returns the asset code as a string slice
    pub fn code(&self) -> &str {
        match self {
            Asset::Usdc => "USDC",
            Asset::Usdt => "USDT",
            Asset::Dai => "DAI",
            Asset::Btc => "BTC",
            Asset::Eth => "ETH",
            Asset::Sol => "SOL",
            Asset::Usd => "USD",
            Asset::Eur => "EUR",
            Asset::Other(s) => s.as_str(),
        }
    }

    /// Returns true if this is a stablecoin
    pub fn is_stablecoin(&self) -> bool {
        matches!(self, Asset::Usdc | Asset::Usdt | Asset::Dai)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Asset {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        if s.is_empty() {
            return Err(AssetError::EmptyCode);
        }

        if s.len() > 10 {
            return Err(AssetError::TooLong(s));
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AssetError::InvalidFormat(s));
        }

        Ok(match s.as_str() {
            "USDC" => Asset::Usdc,
            "USDT" => Asset::Usdt,
            "DAI" => Asset::Dai,
            "BTC" => Asset::Btc,
            "ETH" => Asset::Eth,
            "SOL" => Asset::Sol,
            "USD" => Asset::Usd,
            "EUR" => Asset::Eur,
            _ => Asset::Other(s),
        })
    }
}

impl TryFrom<String> for Asset {
    type Error = AssetError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Asset> for String {
    fn from(a: Asset) -> Self {
        a.code().to_string()
    }
}
