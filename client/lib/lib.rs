//! Core of a batch distribution client: validates a recipient list for the native coin or a
//! token, converts amounts to base units and walks the optional authorization and the transfer
//! through their submission lifecycle.

#![warn(missing_docs)]

mod asset;
mod authorization;
mod call_spec;
pub mod config;
mod coordinator;
mod distribution;
mod error;
pub mod logging;
pub mod parsing;
mod session;
mod submission;
mod transport;

pub use asset::{
    AssetContext, AssetKind, AssetSelection, TokenMetadata, NATIVE_SYMBOL, NATIVE_UNIT_COUNT,
};
pub use authorization::{authorization_call, needs_authorization};
pub use call_spec::CallSpec;
pub use config::{Config, DistributorConfig};
pub use coordinator::Coordinator;
pub use distribution::{total, DistributionSummary, RecipientEntry, RecipientList};
pub use error::{EntryError, Error, Result};
pub use parsing::InputMode;
pub use session::{InvalidationReason, Session, TokenRead};
pub use submission::{Action, FailedPhase, FailureReason, InvalidTransition, SubmissionState};
pub use transport::{ContractReader, Receipt, SignedCall, TokenSnapshot, Transport, TransportError};
