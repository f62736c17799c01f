use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The number of bytes in a [`TxHash`].
pub const TX_HASH_LENGTH: usize = 32;

/// Error while parsing a [`TxHash`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TxHashParseError {
    /// The string does not start with `0x`.
    #[error("transaction hash must start with '0x'")]
    MissingPrefix,
    /// The hex part is not 32 bytes of valid hex.
    #[error("invalid transaction hash: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Hash identifying a broadcast transaction.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxHash([u8; TX_HASH_LENGTH]);

impl TxHash {
    /// Constructs a new `TxHash`.
    pub const fn new(bytes: [u8; TX_HASH_LENGTH]) -> Self {
        TxHash(bytes)
    }

    /// Returns the raw bytes of the hash.
    pub fn as_bytes(&self) -> &[u8; TX_HASH_LENGTH] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = TxHashParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let hex = input
            .strip_prefix("0x")
            .ok_or(TxHashParseError::MissingPrefix)?;
        let mut bytes = [0u8; TX_HASH_LENGTH];
        hex::decode_to_slice(hex, &mut bytes)?;
        Ok(TxHash(bytes))
    }
}

impl Display for TxHash {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "0x{}", hex::encode(self.0))
    }
}

impl Debug for TxHash {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "TxHash(0x{})", hex::encode(self.0))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        TxHash::from_str(&value).map_err(SerdeError::custom)
    }
}
