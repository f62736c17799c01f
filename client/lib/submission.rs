//! Lifecycle of a single on-chain action.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use thiserror::Error;

use disperse_types::TxHash;

use crate::transport::{Receipt, TransportError};

/// The two actions of a distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Granting the distributor an allowance on the token.
    Authorize,
    /// The batch transfer itself.
    Transfer,
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            Action::Authorize => write!(formatter, "authorization"),
            Action::Transfer => write!(formatter, "transfer"),
        }
    }
}

/// Where a submission was when it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedPhase {
    /// Waiting for the wallet to sign.
    Signature,
    /// Handing the signed call to the node.
    Broadcast,
    /// Waiting for inclusion in a block.
    Confirmation,
}

impl Display for FailedPhase {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            FailedPhase::Signature => write!(formatter, "signature request"),
            FailedPhase::Broadcast => write!(formatter, "broadcast"),
            FailedPhase::Confirmation => write!(formatter, "confirmation"),
        }
    }
}

/// Why a submission ended in [`SubmissionState::Failed`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureReason {
    /// The phase that failed.
    pub phase: FailedPhase,
    /// What the transport reported.
    pub error: TransportError,
}

impl Display for FailureReason {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{} failed: {}", self.phase, self.error)
    }
}

/// A transition the state machine refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot {event} while {from}")]
pub struct InvalidTransition {
    /// Name of the state the submission was in.
    pub from: &'static str,
    /// Name of the refused event.
    pub event: &'static str,
}

/// State of one attempted action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing requested yet.
    Idle,
    /// The wallet was asked to sign; the call has not reached the node.
    AwaitingSignature,
    /// The node accepted the call.
    Broadcast {
        /// Hash of the broadcast transaction.
        tx_hash: TxHash,
    },
    /// The call was included in a block.
    Confirmed {
        /// Inclusion proof.
        receipt: Receipt,
    },
    /// The call was abandoned.
    Failed(FailureReason),
}

impl Default for SubmissionState {
    fn default() -> Self {
        SubmissionState::Idle
    }
}

impl Display for SubmissionState {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            SubmissionState::Idle => write!(formatter, "idle"),
            SubmissionState::AwaitingSignature => write!(formatter, "awaiting signature"),
            SubmissionState::Broadcast { tx_hash } => write!(formatter, "broadcast as {}", tx_hash),
            SubmissionState::Confirmed { receipt } => write!(
                formatter,
                "confirmed as {} in block {}",
                receipt.tx_hash, receipt.block_number
            ),
            SubmissionState::Failed(reason) => write!(formatter, "{}", reason),
        }
    }
}

impl SubmissionState {
    fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::AwaitingSignature => "awaiting signature",
            SubmissionState::Broadcast { .. } => "broadcast",
            SubmissionState::Confirmed { .. } => "confirmed",
            SubmissionState::Failed(_) => "failed",
        }
    }

    fn refuse(&self, event: &'static str) -> InvalidTransition {
        InvalidTransition {
            from: self.name(),
            event,
        }
    }

    /// Returns true while waiting on the wallet or the chain.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SubmissionState::AwaitingSignature | SubmissionState::Broadcast { .. }
        )
    }

    /// Returns true once confirmed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmissionState::Confirmed { .. })
    }

    /// Returns true once confirmed or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Confirmed { .. } | SubmissionState::Failed(_)
        )
    }

    /// Returns to `Idle` so a new attempt can start. Refused while in flight.
    pub fn reset(&mut self) -> Result<(), InvalidTransition> {
        if self.is_in_flight() {
            return Err(self.refuse("reset"));
        }
        *self = SubmissionState::Idle;
        Ok(())
    }

    /// `Idle -> AwaitingSignature`.
    pub fn request_signature(&mut self) -> Result<(), InvalidTransition> {
        match self {
            SubmissionState::Idle => {
                *self = SubmissionState::AwaitingSignature;
                Ok(())
            }
            _ => Err(self.refuse("request a signature")),
        }
    }

    /// `AwaitingSignature -> Broadcast`.
    pub fn accept_broadcast(&mut self, tx_hash: TxHash) -> Result<(), InvalidTransition> {
        match self {
            SubmissionState::AwaitingSignature => {
                *self = SubmissionState::Broadcast { tx_hash };
                Ok(())
            }
            _ => Err(self.refuse("accept a broadcast")),
        }
    }

    /// `Broadcast -> Confirmed`. The receipt must be for the broadcast transaction.
    pub fn confirm(&mut self, receipt: Receipt) -> Result<(), InvalidTransition> {
        match self {
            SubmissionState::Broadcast { tx_hash } if *tx_hash == receipt.tx_hash => {
                *self = SubmissionState::Confirmed { receipt };
                Ok(())
            }
            SubmissionState::Broadcast { .. } => Err(self.refuse("confirm another transaction")),
            _ => Err(self.refuse("confirm")),
        }
    }

    /// Moves an in-flight submission to `Failed`.
    ///
    /// Signature and broadcast failures happen before the node accepted the call, confirmation
    /// failures after.
    pub fn fail(&mut self, phase: FailedPhase, error: TransportError) -> Result<(), InvalidTransition> {
        let allowed = match phase {
            FailedPhase::Signature | FailedPhase::Broadcast => {
                matches!(self, SubmissionState::AwaitingSignature)
            }
            FailedPhase::Confirmation => matches!(self, SubmissionState::Broadcast { .. }),
        };
        if !allowed {
            return Err(self.refuse("fail"));
        }
        *self = SubmissionState::Failed(FailureReason { phase, error });
        Ok(())
    }
}
