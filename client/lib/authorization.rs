//! Whether a token allowance covers a distribution.

use disperse_types::{Address, U256};

use crate::call_spec::CallSpec;

/// Returns true if an authorization must be confirmed before distributing `total`.
///
/// An allowance equal to the total is sufficient.
pub fn needs_authorization(known_allowance: U256, total: U256) -> bool {
    known_allowance < total
}

/// Builds the authorization call for `total`.
///
/// The request is for exactly the distribution total, never an unlimited allowance, so nothing
/// remains approved once the distribution went through.
pub fn authorization_call(token: Address, spender: Address, total: U256) -> CallSpec {
    CallSpec::approve(token, spender, total)
}
