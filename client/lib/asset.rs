//! The asset being distributed.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use disperse_types::{Address, U256};

use crate::error::{Error, Result};

/// Unit count of the chain's native coin.
pub const NATIVE_UNIT_COUNT: u8 = 18;

/// Symbol shown for the native coin.
pub const NATIVE_SYMBOL: &str = "ETH";

/// The asset selected by the operator, as entered.
///
/// A token address is kept verbatim so that an invalid entry can be reported when the list is
/// validated rather than when it is typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSelection {
    /// The chain's native coin.
    Native,
    /// A fungible token at the given (unvalidated) address.
    Token(String),
}

impl AssetSelection {
    /// Resolves the selection to an asset kind, validating the token address.
    pub fn resolve(&self) -> Result<AssetKind> {
        match self {
            AssetSelection::Native => Ok(AssetKind::Native),
            AssetSelection::Token(input) => Address::from_str(input.trim())
                .map(AssetKind::Fungible)
                .map_err(|_| Error::MissingAssetAddress),
        }
    }
}

impl Default for AssetSelection {
    fn default() -> Self {
        AssetSelection::Native
    }
}

/// A validated asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// The chain's native coin, sent as call value.
    Native,
    /// A fungible token contract, pulled by the distributor under an allowance.
    Fungible(Address),
}

impl AssetKind {
    /// Returns the token address for fungible assets.
    pub fn token(&self) -> Option<Address> {
        match self {
            AssetKind::Native => None,
            AssetKind::Fungible(token) => Some(*token),
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            AssetKind::Native => write!(formatter, "native coin"),
            AssetKind::Fungible(token) => write!(formatter, "token {}", token),
        }
    }
}

/// Token metadata read from the token contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Ticker symbol.
    pub symbol: String,
    /// Unit count (decimals).
    pub decimals: u8,
}

/// Everything known about the active asset at a point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetContext {
    /// The asset.
    pub kind: AssetKind,
    /// Unit count used to convert display amounts.
    pub unit_count: u8,
    /// Last observed allowance granted to the distributor; never set for the native coin.
    pub known_allowance: Option<U256>,
}
