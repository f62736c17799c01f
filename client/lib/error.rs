//! Errors returned by the distribution client.

use thiserror::Error;

use disperse_types::{AddressParseError, AmountParseError};

use crate::{
    session::InvalidationReason,
    submission::{Action, FailedPhase, InvalidTransition},
    transport::TransportError,
};

/// Crate-wide Result type wrapper.
pub type Result<T> = std::result::Result<T, Error>;

/// Error that can be returned by `disperse-client`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The global amount could not be converted to base units.
    #[error("please enter a valid global amount, '{amount}' is invalid: {reason}")]
    MalformedAmount {
        /// The amount as entered.
        amount: String,
        /// Why conversion failed.
        reason: AmountParseError,
    },

    /// A line of the recipient list is invalid. Nothing from the input was kept.
    #[error("line {line}: {detail}")]
    InvalidEntry {
        /// 1-based line number in the raw input.
        line: usize,
        /// What is wrong with the line.
        detail: EntryError,
    },

    /// The input contained no recipient lines.
    #[error("no valid entries could be parsed, format should be: 0xAddress Amount")]
    NoValidEntries,

    /// A token distribution was requested without a valid token address.
    #[error("please enter a valid token address first")]
    MissingAssetAddress,

    /// The distribution total does not fit in 256 bits.
    #[error("distribution total exceeds the 256-bit range")]
    AmountOverflow,

    /// The token allowance does not cover the distribution and no authorization is confirmed.
    #[error("token authorization has not been confirmed")]
    AuthorizationNotConfirmed,

    /// The transport refused the call in the given phase.
    #[error("{phase} rejected: {reason}")]
    TransportRejected {
        /// Phase the submission was in.
        phase: FailedPhase,
        /// Reason given by the transport.
        reason: String,
    },

    /// The transport gave up waiting in the given phase.
    #[error("{phase} timed out")]
    TransportTimeout {
        /// Phase the submission was in.
        phase: FailedPhase,
    },

    /// Reading token state from the chain failed.
    #[error("failed to read token state: {0}")]
    ContractRead(TransportError),

    /// The parsed recipients were discarded and must be parsed again.
    #[error("recipient list is stale ({0}), validate the list again")]
    StaleRecipients(InvalidationReason),

    /// No recipient list has been parsed yet.
    #[error("recipient list has not been validated yet")]
    RecipientsNotParsed,

    /// The action is already awaiting a signature or confirmation.
    #[error("{0} is already in progress")]
    ActionInFlight(Action),

    /// The token allowance has not been read since it was last invalidated.
    #[error("token allowance is unknown, refresh it before continuing")]
    AllowanceUnknown,

    /// The token's decimals have not been read yet.
    #[error("token metadata has not been loaded yet")]
    AssetMetadataUnavailable,

    /// Native coin distributions have no authorization step.
    #[error("native distributions do not need authorization")]
    AuthorizationNotApplicable,

    /// A submission state machine was driven out of order.
    #[error("{action}: {source}")]
    InvalidTransition {
        /// The action whose state was being updated.
        action: Action,
        /// The refused transition.
        source: InvalidTransition,
    },
}

/// What is wrong with a single line of recipient input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The address token is not a valid address.
    #[error("invalid address found: {token} ({reason})")]
    InvalidAddress {
        /// The token as entered.
        token: String,
        /// Why validation failed.
        reason: AddressParseError,
    },

    /// List mode line without an amount.
    #[error("missing amount for address {address}, format should be: 0xAddress Amount")]
    MissingAmount {
        /// The address on the line.
        address: String,
    },

    /// The amount token could not be converted to base units.
    #[error("invalid amount format for address {address}: {amount} ({reason})")]
    InvalidAmount {
        /// The address on the line.
        address: String,
        /// The amount as entered.
        amount: String,
        /// Why conversion failed.
        reason: AmountParseError,
    },
}

impl Error {
    pub(crate) fn from_transport(phase: FailedPhase, error: TransportError) -> Self {
        match error {
            TransportError::Rejected(reason) => Error::TransportRejected { phase, reason },
            TransportError::Timeout => Error::TransportTimeout { phase },
        }
    }
}
