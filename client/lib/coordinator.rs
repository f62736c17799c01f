//! Drives a [`Session`] against the wallet and chain collaborators.
//!
//! The session lock is only held between awaits, never across them, so that state can be read and
//! guarded actions refused while a submission is waiting on the wallet or the chain. Every
//! submission state change is published on a per-action watch channel.

use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use disperse_types::{Address, TxHash, U256};

use crate::{
    asset::AssetContext,
    call_spec::CallSpec,
    config::DistributorConfig,
    distribution::DistributionSummary,
    error::{Error, Result},
    parsing::InputMode,
    session::Session,
    submission::{Action, FailedPhase, SubmissionState},
    transport::{ContractReader, Receipt, TokenSnapshot, Transport, TransportError},
};

/// Coordinates one operator account's distribution.
pub struct Coordinator<T, R> {
    config: DistributorConfig,
    account: Address,
    transport: T,
    reader: R,
    session: Mutex<Session>,
    authorize_state: watch::Sender<SubmissionState>,
    transfer_state: watch::Sender<SubmissionState>,
}

impl<T: Transport, R: ContractReader> Coordinator<T, R> {
    /// Creates a coordinator for `account`, distributing the native coin in list mode.
    pub fn new(config: DistributorConfig, account: Address, transport: T, reader: R) -> Self {
        let session = Session::new(config.native_decimals);
        Coordinator {
            config,
            account,
            transport,
            reader,
            session: Mutex::new(session),
            authorize_state: watch::channel(SubmissionState::Idle).0,
            transfer_state: watch::channel(SubmissionState::Idle).0,
        }
    }

    /// The distributor settings in use.
    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    /// Subscribes to state changes of `action`.
    pub fn subscribe(&self, action: Action) -> watch::Receiver<SubmissionState> {
        self.sender(action).subscribe()
    }

    /// Current state of `action`.
    pub async fn state(&self, action: Action) -> SubmissionState {
        self.session.lock().await.state(action).clone()
    }

    fn sender(&self, action: Action) -> &watch::Sender<SubmissionState> {
        match action {
            Action::Authorize => &self.authorize_state,
            Action::Transfer => &self.transfer_state,
        }
    }

    fn publish(&self, action: Action, session: &Session) {
        let state = session.state(action).clone();
        debug!(%action, %state, "submission state changed");
        self.sender(action).send_replace(state);
    }

    /// Publishes both actions, for changes that may reset either.
    fn publish_all(&self, session: &Session) {
        for action in [Action::Authorize, Action::Transfer] {
            if *self.sender(action).borrow() != *session.state(action) {
                self.publish(action, session);
            }
        }
    }

    /// Selects the native coin.
    pub async fn select_native(&self) {
        self.session.lock().await.select_native();
    }

    /// Selects a token by address as typed. Call [`refresh_token`](Self::refresh_token) next.
    pub async fn select_token(&self, input: &str) {
        self.session.lock().await.select_token(input);
    }

    /// Switches between list and global amount input.
    pub async fn set_input_mode(&self, mode: InputMode) {
        self.session.lock().await.set_input_mode(mode);
    }

    /// Records that the raw input changed since the last parse.
    pub async fn input_edited(&self) {
        self.session.lock().await.input_edited();
    }

    /// The validated asset and what is known about it.
    pub async fn asset_context(&self) -> Result<AssetContext> {
        self.session.lock().await.asset_context()
    }

    /// Reads symbol, decimals and allowance of the selected token.
    ///
    /// If the selection changed or a submission was confirmed while reading, the result is
    /// returned but not applied.
    pub async fn refresh_token(&self) -> Result<TokenSnapshot> {
        let read = self.session.lock().await.begin_token_read()?;
        let snapshot = self
            .reader
            .read_token(read.token(), self.account, self.config.contract_address)
            .await
            .map_err(Error::ContractRead)?;
        if !self
            .session
            .lock()
            .await
            .apply_token_read(read, snapshot.clone())
        {
            debug!(token = %read.token(), "token state changed while reading it");
        }
        Ok(snapshot)
    }

    /// Records an allowance observed by some other means, e.g. a chain subscription.
    pub async fn observe_allowance(&self, token: Address, allowance: U256) -> bool {
        self.session.lock().await.observe_allowance(token, allowance)
    }

    /// Validates `raw_text` for the selected asset and summarizes the result.
    pub async fn parse(
        &self,
        raw_text: &str,
        global_amount: Option<&str>,
    ) -> Result<DistributionSummary> {
        let mut session = self.session.lock().await;
        let parsed = session.parse(raw_text, global_amount).map(|_| ());
        let result = parsed.and_then(|()| session.summary());
        self.publish_all(&session);
        result
    }

    /// Summary of the current recipient list.
    pub async fn summary(&self) -> Result<DistributionSummary> {
        self.session.lock().await.summary()
    }

    /// The calls a distribution of the current list would submit, in order.
    pub async fn plan(&self) -> Result<Vec<CallSpec>> {
        self.session
            .lock()
            .await
            .plan(self.config.contract_address)
    }

    /// Authorizes the distributor to pull exactly the current total of the selected token.
    ///
    /// Once confirmed, the allowance is read again; a failure to do so is logged and leaves the
    /// allowance unknown.
    pub async fn authorize(&self) -> Result<Receipt> {
        let call = {
            let mut session = self.session.lock().await;
            let call = session.begin_authorize(self.config.contract_address)?;
            self.publish(Action::Authorize, &session);
            call
        };
        info!(%call, "requesting authorization");
        let receipt = self.submit(Action::Authorize, call).await?;

        if let Err(error) = self.refresh_token().await {
            warn!(%error, "failed to read allowance after authorization");
        }
        Ok(receipt)
    }

    /// Submits the distribution of the current list.
    ///
    /// A confirmed token distribution spends allowance, so the allowance is read again as after
    /// [`authorize`](Self::authorize).
    pub async fn transfer(&self) -> Result<Receipt> {
        let call = {
            let mut session = self.session.lock().await;
            let call = session.begin_transfer(self.config.contract_address)?;
            self.publish(Action::Transfer, &session);
            call
        };
        info!(%call, "requesting transfer");
        let receipt = self.submit(Action::Transfer, call).await?;

        match self.refresh_token().await {
            Ok(_) | Err(Error::AuthorizationNotApplicable) => (),
            Err(error) => warn!(%error, "failed to read allowance after transfer"),
        }
        Ok(receipt)
    }

    /// Link to the transaction on the block explorer.
    pub fn explorer_link(&self, tx_hash: &TxHash) -> String {
        self.config.explorer_link(tx_hash)
    }

    async fn submit(&self, action: Action, call: CallSpec) -> Result<Receipt> {
        let signed = match self.transport.sign(self.account, &call).await {
            Ok(signed) => signed,
            Err(error) => return self.abandon(action, FailedPhase::Signature, error).await,
        };

        let tx_hash = match self.transport.broadcast(signed).await {
            Ok(tx_hash) => tx_hash,
            Err(error) => return self.abandon(action, FailedPhase::Broadcast, error).await,
        };
        self.record(action, |session| session.record_broadcast(action, tx_hash))
            .await?;
        info!(%action, %tx_hash, "transaction broadcast, waiting for confirmation");

        let timeout = Duration::from(self.config.confirmation_timeout);
        let inclusion = tokio::time::timeout(timeout, self.transport.wait_for_inclusion(tx_hash))
            .await
            .unwrap_or(Err(TransportError::Timeout));
        let receipt = match inclusion {
            Ok(receipt) => receipt,
            Err(error) => return self.abandon(action, FailedPhase::Confirmation, error).await,
        };
        self.record(action, |session| session.record_confirmation(action, receipt))
            .await?;
        info!(
            %action,
            block = receipt.block_number,
            link = %self.explorer_link(&receipt.tx_hash),
            "transaction confirmed"
        );
        Ok(receipt)
    }

    async fn abandon(
        &self,
        action: Action,
        phase: FailedPhase,
        error: TransportError,
    ) -> Result<Receipt> {
        warn!(%action, %phase, %error, "submission failed");
        let recorded = error.clone();
        self.record(action, move |session| {
            session.record_failure(action, phase, recorded)
        })
        .await?;
        Err(Error::from_transport(phase, error))
    }

    async fn record<F>(&self, action: Action, update: F) -> Result<()>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        let mut session = self.session.lock().await;
        update(&mut session)?;
        self.publish(action, &session);
        Ok(())
    }
}
