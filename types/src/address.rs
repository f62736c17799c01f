use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::checksummed_hex;

/// The number of bytes in an [`Address`].
pub const ADDRESS_LENGTH: usize = 20;

const HEX_PREFIX: &str = "0x";

/// Error while parsing an [`Address`] from a formatted string.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// The string does not start with `0x`.
    #[error("address must start with '0x'")]
    MissingPrefix,
    /// The hex part does not have exactly 40 characters.
    #[error("address must have 40 hex digits, found {0}")]
    InvalidLength(usize),
    /// The hex part contains a non-hex character.
    #[error("address contains non-hex characters")]
    InvalidHex,
    /// The string is mixed case but not a valid EIP-55 checksum.
    #[error("address has an invalid checksum")]
    ChecksumMismatch,
}

/// A 20-byte account or contract address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Constructs a new `Address` from its raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Address(bytes)
    }

    /// Returns the raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns the `0x`-prefixed EIP-55 checksummed form.
    pub fn to_checksummed(&self) -> String {
        format!("{}{}", HEX_PREFIX, checksummed_hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let hex = input
            .strip_prefix(HEX_PREFIX)
            .ok_or(AddressParseError::MissingPrefix)?;
        if hex.len() != ADDRESS_LENGTH * 2 {
            return Err(AddressParseError::InvalidLength(hex.len()));
        }
        let bytes = checksummed_hex::decode(hex).map_err(|error| match error {
            checksummed_hex::DecodeError::InvalidHex(_) => AddressParseError::InvalidHex,
            checksummed_hex::DecodeError::ChecksumMismatch { .. } => {
                AddressParseError::ChecksumMismatch
            }
        })?;
        let mut address = [0u8; ADDRESS_LENGTH];
        address.copy_from_slice(&bytes);
        Ok(Address(address))
    }
}

impl Display for Address {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}", self.to_checksummed())
    }
}

impl Debug for Address {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "Address({})", self.to_checksummed())
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Address(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksummed())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Address::from_str(&value).map_err(SerdeError::custom)
    }
}
