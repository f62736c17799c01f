//! Value types shared by the batch distribution client.
//!
//! Amounts are carried as 256-bit unsigned integers in base units, addresses as 20-byte values
//! parsed from `0x`-prefixed hex with optional EIP-55 checksums.

#![warn(missing_docs)]

mod address;
pub mod checksummed_hex;
pub mod crypto;
mod time_diff;
mod tx_hash;
mod uint;
pub mod units;

pub use address::{Address, AddressParseError, ADDRESS_LENGTH};
pub use time_diff::TimeDiff;
pub use tx_hash::{TxHash, TxHashParseError, TX_HASH_LENGTH};
pub use uint::U256;
pub use units::{to_base_units, to_decimal_string, AmountParseError};
