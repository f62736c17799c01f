//! Interfaces to the wallet and chain collaborators.
//!
//! The core never talks to a node or wallet itself; it drives these traits and tracks the result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use disperse_types::{Address, TxHash, U256};

use crate::call_spec::CallSpec;

/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The wallet, node or contract refused the request.
    #[error("{0}")]
    Rejected(String),
    /// No answer arrived in time.
    #[error("timed out")]
    Timeout,
}

/// A call signed by the wallet, ready to broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedCall {
    /// The call that was signed.
    pub call: CallSpec,
    /// Signed transaction bytes, opaque to the core.
    pub payload: Vec<u8>,
}

/// Proof that a broadcast transaction was included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Hash of the included transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: u64,
}

/// Signs, broadcasts and watches calls.
///
/// Implementations report a reverted transaction as [`TransportError::Rejected`] from
/// `wait_for_inclusion`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Asks the wallet of `from` to sign `call`.
    async fn sign(&self, from: Address, call: &CallSpec) -> Result<SignedCall, TransportError>;

    /// Submits a signed call, returning its hash once the node accepted it.
    async fn broadcast(&self, signed: SignedCall) -> Result<TxHash, TransportError>;

    /// Resolves once `tx_hash` is included in a block.
    async fn wait_for_inclusion(&self, tx_hash: TxHash) -> Result<Receipt, TransportError>;
}

/// Token state relevant to a distribution, read in one go.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// Ticker symbol.
    pub symbol: String,
    /// Unit count.
    pub decimals: u8,
    /// Allowance of `owner` towards `spender`.
    pub allowance: U256,
}

/// Reads token contract state.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Reads symbol, decimals and the allowance `owner` granted `spender` on `token`.
    async fn read_token(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<TokenSnapshot, TransportError>;
}
