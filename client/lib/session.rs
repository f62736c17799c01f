//! State of one operator session: the selected asset, what is known about it, the parsed
//! recipients and the two submissions.
//!
//! Everything here is synchronous; the [`Coordinator`](crate::Coordinator) wraps a `Session` and
//! performs the awaiting in between its calls.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use tracing::{debug, info, warn};

use disperse_types::{units, Address, TxHash, U256};

use crate::{
    asset::{AssetContext, AssetKind, AssetSelection, TokenMetadata, NATIVE_SYMBOL},
    authorization::{authorization_call, needs_authorization},
    call_spec::CallSpec,
    distribution::{self, DistributionSummary, RecipientList},
    error::{Error, Result},
    parsing::{self, InputMode},
    submission::{Action, FailedPhase, SubmissionState},
    transport::{Receipt, TokenSnapshot, TransportError},
};

/// Why a parsed recipient list was discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    /// A different asset was selected.
    AssetChanged,
    /// The asset's unit count differs from the one the list was parsed with.
    UnitCountChanged {
        /// Unit count of the list.
        from: u8,
        /// Current unit count of the asset.
        to: u8,
    },
    /// The raw input was edited.
    InputEdited,
    /// Switched between list and global amount input.
    ModeChanged,
}

impl Display for InvalidationReason {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            InvalidationReason::AssetChanged => write!(formatter, "the asset changed"),
            InvalidationReason::UnitCountChanged { from, to } => write!(
                formatter,
                "the asset's decimals changed from {} to {}",
                from, to
            ),
            InvalidationReason::InputEdited => write!(formatter, "the input was edited"),
            InvalidationReason::ModeChanged => write!(formatter, "the input mode changed"),
        }
    }
}

#[derive(Clone, Debug)]
struct ParsedRecipients {
    asset: AssetKind,
    list: RecipientList,
}

/// A token state read in progress, started by [`Session::begin_token_read`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenRead {
    token: Address,
    confirmations: u64,
}

impl TokenRead {
    /// The token being read.
    pub fn token(&self) -> Address {
        self.token
    }
}

#[derive(Clone, Debug)]
enum Recipients {
    Empty,
    Parsed(ParsedRecipients),
    Invalidated(InvalidationReason),
}

/// A single operator's distribution session.
#[derive(Clone, Debug)]
pub struct Session {
    native_unit_count: u8,
    selection: AssetSelection,
    metadata: Option<TokenMetadata>,
    allowance: Option<U256>,
    /// Number of confirmed submissions, each of which changes the on-chain allowance.
    confirmations: u64,
    mode: InputMode,
    recipients: Recipients,
    authorize: SubmissionState,
    transfer: SubmissionState,
}

impl Session {
    /// Creates a session distributing the native coin in list mode.
    pub fn new(native_unit_count: u8) -> Self {
        Session {
            native_unit_count,
            selection: AssetSelection::Native,
            metadata: None,
            allowance: None,
            confirmations: 0,
            mode: InputMode::List,
            recipients: Recipients::Empty,
            authorize: SubmissionState::Idle,
            transfer: SubmissionState::Idle,
        }
    }

    /// The selected asset as entered.
    pub fn selection(&self) -> &AssetSelection {
        &self.selection
    }

    /// The current input mode.
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Selects the native coin.
    pub fn select_native(&mut self) {
        self.select(AssetSelection::Native)
    }

    /// Selects a token by its address as typed. Metadata and allowance must be read again.
    pub fn select_token(&mut self, input: &str) {
        self.select(AssetSelection::Token(input.trim().to_string()))
    }

    fn select(&mut self, selection: AssetSelection) {
        if self.selection == selection {
            return;
        }
        info!(?selection, "asset selection changed");
        self.selection = selection;
        self.metadata = None;
        self.allowance = None;
        self.invalidate(InvalidationReason::AssetChanged);
    }

    /// Switches between list and global amount input.
    pub fn set_input_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            self.mode = mode;
            self.invalidate(InvalidationReason::ModeChanged);
        }
    }

    /// Records that the raw input text changed since the last parse.
    pub fn input_edited(&mut self) {
        self.invalidate(InvalidationReason::InputEdited);
    }

    fn invalidate(&mut self, reason: InvalidationReason) {
        if matches!(self.recipients, Recipients::Empty) {
            return;
        }
        debug!(%reason, "discarding parsed recipients");
        self.recipients = Recipients::Invalidated(reason);
    }

    /// The selected token's address.
    pub fn active_token(&self) -> Result<Address> {
        self.selection
            .resolve()?
            .token()
            .ok_or(Error::AuthorizationNotApplicable)
    }

    fn is_active_token(&self, token: Address) -> bool {
        self.active_token().map_or(false, |active| active == token)
    }

    /// Applies freshly read token state.
    ///
    /// Returns false and changes nothing if `token` is no longer selected. A changed unit count
    /// discards the parsed recipients.
    pub fn apply_token_snapshot(&mut self, token: Address, snapshot: TokenSnapshot) -> bool {
        if !self.is_active_token(token) {
            warn!(%token, "ignoring token state for a token that is no longer selected");
            return false;
        }

        let parsed_unit_count = match &self.recipients {
            Recipients::Parsed(parsed) => Some(parsed.list.unit_count()),
            Recipients::Empty | Recipients::Invalidated(_) => None,
        };
        if let Some(from) = parsed_unit_count {
            if from != snapshot.decimals {
                self.invalidate(InvalidationReason::UnitCountChanged {
                    from,
                    to: snapshot.decimals,
                });
            }
        }

        debug!(%token, symbol = %snapshot.symbol, decimals = snapshot.decimals, allowance = %snapshot.allowance, "token state updated");
        self.metadata = Some(TokenMetadata {
            symbol: snapshot.symbol,
            decimals: snapshot.decimals,
        });
        self.allowance = Some(snapshot.allowance);
        true
    }

    /// Starts reading the selected token's state.
    pub fn begin_token_read(&self) -> Result<TokenRead> {
        Ok(TokenRead {
            token: self.active_token()?,
            confirmations: self.confirmations,
        })
    }

    /// Applies the result of `read`.
    ///
    /// Returns false and changes nothing if a submission was confirmed since the read started,
    /// as the snapshot may predate it, or if the token is no longer selected.
    pub fn apply_token_read(&mut self, read: TokenRead, snapshot: TokenSnapshot) -> bool {
        if read.confirmations != self.confirmations {
            debug!(token = %read.token, "ignoring token state read before the last confirmation");
            return false;
        }
        self.apply_token_snapshot(read.token, snapshot)
    }

    /// Records an allowance observed outside of [`apply_token_snapshot`](Self::apply_token_snapshot).
    ///
    /// Returns false if `token` is no longer selected.
    pub fn observe_allowance(&mut self, token: Address, allowance: U256) -> bool {
        if !self.is_active_token(token) {
            return false;
        }
        self.allowance = Some(allowance);
        true
    }

    fn unit_count_for(&self, kind: AssetKind) -> Result<u8> {
        match kind {
            AssetKind::Native => Ok(self.native_unit_count),
            AssetKind::Fungible(_) => self
                .metadata
                .as_ref()
                .map(|metadata| metadata.decimals)
                .ok_or(Error::AssetMetadataUnavailable),
        }
    }

    /// The validated asset and what is known about it.
    pub fn asset_context(&self) -> Result<AssetContext> {
        let kind = self.selection.resolve()?;
        Ok(AssetContext {
            kind,
            unit_count: self.unit_count_for(kind)?,
            known_allowance: kind.token().and(self.allowance),
        })
    }

    fn symbol(&self) -> Option<String> {
        match self.selection {
            AssetSelection::Native => Some(NATIVE_SYMBOL.to_string()),
            AssetSelection::Token(_) => self.metadata.as_ref().map(|m| m.symbol.clone()),
        }
    }

    /// Parses `raw_text` for the selected asset, replacing any earlier list.
    ///
    /// On failure the session is left without a list. Finished submissions are reset, since a
    /// new list is a new distribution.
    pub fn parse(&mut self, raw_text: &str, global_amount: Option<&str>) -> Result<&RecipientList> {
        self.recipients = Recipients::Empty;

        let asset = self.selection.resolve()?;
        let unit_count = self.unit_count_for(asset)?;
        let list = parsing::parse(raw_text, self.mode, unit_count, global_amount)?;
        info!(recipients = list.len(), %asset, unit_count, "validated recipient list");

        for state in [&mut self.authorize, &mut self.transfer] {
            if state.is_terminal() {
                *state = SubmissionState::Idle;
            }
        }
        self.recipients = Recipients::Parsed(ParsedRecipients { asset, list });
        self.recipients()
    }

    fn parsed(&self) -> Result<&ParsedRecipients> {
        let parsed = match &self.recipients {
            Recipients::Empty => return Err(Error::RecipientsNotParsed),
            Recipients::Invalidated(reason) => return Err(Error::StaleRecipients(*reason)),
            Recipients::Parsed(parsed) => parsed,
        };

        // Selection and metadata changes invalidate eagerly; this catches anything that slipped
        // past them so wrong-unit amounts are never handed out.
        let context = self.asset_context()?;
        if parsed.asset != context.kind {
            return Err(Error::StaleRecipients(InvalidationReason::AssetChanged));
        }
        if parsed.list.unit_count() != context.unit_count {
            return Err(Error::StaleRecipients(
                InvalidationReason::UnitCountChanged {
                    from: parsed.list.unit_count(),
                    to: context.unit_count,
                },
            ));
        }
        Ok(parsed)
    }

    /// The current recipient list, if it is still valid for the selected asset.
    pub fn recipients(&self) -> Result<&RecipientList> {
        self.parsed().map(|parsed| &parsed.list)
    }

    /// Total of the current recipient list in base units.
    pub fn total(&self) -> Result<U256> {
        distribution::total(self.recipients()?)
    }

    /// Whether the transfer must wait for an authorization.
    pub fn needs_authorization(&self) -> Result<bool> {
        let parsed = self.parsed()?;
        match parsed.asset {
            AssetKind::Native => Ok(false),
            AssetKind::Fungible(_) => {
                let allowance = self.allowance.ok_or(Error::AllowanceUnknown)?;
                Ok(needs_authorization(
                    allowance,
                    distribution::total(&parsed.list)?,
                ))
            }
        }
    }

    /// Summary of the current list for display. An unknown allowance counts as insufficient.
    pub fn summary(&self) -> Result<DistributionSummary> {
        let parsed = self.parsed()?;
        let unit_count = parsed.list.unit_count();
        let total = distribution::total(&parsed.list)?;
        let allowance = parsed.asset.token().and(self.allowance);
        let needs_authorization = match (parsed.asset, allowance) {
            (AssetKind::Native, _) => false,
            (AssetKind::Fungible(_), Some(allowance)) => needs_authorization(allowance, total),
            (AssetKind::Fungible(_), None) => true,
        };
        Ok(DistributionSummary {
            symbol: self.symbol(),
            recipients: parsed.list.len(),
            total,
            display_total: units::to_decimal_string(total, unit_count),
            allowance,
            display_allowance: allowance.map(|value| units::to_decimal_string(value, unit_count)),
            needs_authorization,
        })
    }

    /// The calls that would be submitted, in order, without starting any of them.
    pub fn plan(&self, contract: Address) -> Result<Vec<CallSpec>> {
        let parsed = self.parsed()?;
        let total = distribution::total(&parsed.list)?;
        let mut calls = Vec::with_capacity(2);
        if let AssetKind::Fungible(token) = parsed.asset {
            if self.needs_authorization()? {
                calls.push(authorization_call(token, contract, total));
            }
        }
        calls.push(CallSpec::distribution(
            contract,
            parsed.asset,
            &parsed.list,
            total,
        ));
        Ok(calls)
    }

    /// State of the given action.
    pub fn state(&self, action: Action) -> &SubmissionState {
        match action {
            Action::Authorize => &self.authorize,
            Action::Transfer => &self.transfer,
        }
    }

    fn state_mut(&mut self, action: Action) -> &mut SubmissionState {
        match action {
            Action::Authorize => &mut self.authorize,
            Action::Transfer => &mut self.transfer,
        }
    }

    /// Resets `action` and moves it to `AwaitingSignature`.
    fn start(&mut self, action: Action) -> Result<()> {
        let state = self.state_mut(action);
        state
            .reset()
            .and_then(|()| state.request_signature())
            .map_err(|source| Error::InvalidTransition { action, source })
    }

    /// Starts an authorization for exactly the current total, returning the call to sign.
    pub fn begin_authorize(&mut self, spender: Address) -> Result<CallSpec> {
        let token = self.active_token()?;
        if self.transfer.is_in_flight() {
            return Err(Error::ActionInFlight(Action::Transfer));
        }
        if self.authorize.is_in_flight() {
            return Err(Error::ActionInFlight(Action::Authorize));
        }
        let call = authorization_call(token, spender, self.total()?);
        self.start(Action::Authorize)?;
        Ok(call)
    }

    /// Starts the distribution, returning the call to sign.
    ///
    /// For tokens the known allowance must cover the total and no authorization may be pending
    /// or failed.
    pub fn begin_transfer(&mut self, contract: Address) -> Result<CallSpec> {
        if self.transfer.is_in_flight() {
            return Err(Error::ActionInFlight(Action::Transfer));
        }
        let parsed = self.parsed()?;
        let total = distribution::total(&parsed.list)?;
        if let AssetKind::Fungible(_) = parsed.asset {
            if self.authorize.is_in_flight() || matches!(self.authorize, SubmissionState::Failed(_))
            {
                return Err(Error::AuthorizationNotConfirmed);
            }
            let allowance = self.allowance.ok_or(Error::AllowanceUnknown)?;
            if needs_authorization(allowance, total) {
                return Err(Error::AuthorizationNotConfirmed);
            }
        }
        let call = CallSpec::distribution(contract, parsed.asset, &parsed.list, total);
        self.start(Action::Transfer)?;
        Ok(call)
    }

    /// Records that the node accepted `action`'s call.
    pub fn record_broadcast(&mut self, action: Action, tx_hash: TxHash) -> Result<()> {
        self.state_mut(action)
            .accept_broadcast(tx_hash)
            .map_err(|source| Error::InvalidTransition { action, source })
    }

    /// Records that `action`'s call was included.
    ///
    /// A confirmed authorization raises the allowance and a confirmed token distribution spends
    /// it, so either makes the known allowance stale; it has to be read again.
    pub fn record_confirmation(&mut self, action: Action, receipt: Receipt) -> Result<()> {
        self.state_mut(action)
            .confirm(receipt)
            .map_err(|source| Error::InvalidTransition { action, source })?;
        self.allowance = None;
        self.confirmations += 1;
        Ok(())
    }

    /// Records that `action` failed in `phase`.
    pub fn record_failure(
        &mut self,
        action: Action,
        phase: FailedPhase,
        error: TransportError,
    ) -> Result<()> {
        self.state_mut(action)
            .fail(phase, error)
            .map_err(|source| Error::InvalidTransition { action, source })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    const TOKEN: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
    const CONTRACT: &str = "0x110769e12155d2d1875d42dcf66d7d92aca1e207";
    const INPUT: &str = "0x1111111111111111111111111111111111111111, 1.5\n\
                         0x2222222222222222222222222222222222222222, 2.5";

    fn token() -> Address {
        Address::from_str(TOKEN).unwrap()
    }

    fn contract() -> Address {
        Address::from_str(CONTRACT).unwrap()
    }

    fn snapshot(decimals: u8, allowance: u64) -> TokenSnapshot {
        TokenSnapshot {
            symbol: "TKN".to_string(),
            decimals,
            allowance: U256::from(allowance),
        }
    }

    fn token_session(decimals: u8, allowance: u64) -> Session {
        let mut session = Session::new(18);
        session.select_token(TOKEN);
        assert!(session.apply_token_snapshot(token(), snapshot(decimals, allowance)));
        session
    }

    fn receipt(byte: u8) -> Receipt {
        Receipt {
            tx_hash: TxHash::new([byte; 32]),
            block_number: 1,
        }
    }

    #[test]
    fn should_parse_native_with_native_unit_count() {
        let mut session = Session::new(18);
        let list = session.parse(INPUT, None).unwrap();
        assert_eq!(list.unit_count(), 18);
        assert_eq!(
            session.total().unwrap(),
            U256::from(4u64) * U256::exp10(18)
        );
        assert!(!session.needs_authorization().unwrap());
        let summary = session.summary().unwrap();
        assert_eq!(summary.display_total, "4");
        assert_eq!(summary.symbol.as_deref(), Some(NATIVE_SYMBOL));
        assert_eq!(summary.allowance, None);
    }

    #[test]
    fn should_refuse_token_parse_without_valid_address() {
        let mut session = Session::new(18);
        session.select_token("0xnope");
        assert_eq!(session.parse(INPUT, None), Err(Error::MissingAssetAddress));
    }

    #[test]
    fn should_refuse_token_parse_without_metadata() {
        let mut session = Session::new(18);
        session.select_token(TOKEN);
        assert_eq!(
            session.parse(INPUT, None),
            Err(Error::AssetMetadataUnavailable)
        );
    }

    #[test]
    fn failed_parse_leaves_no_list() {
        let mut session = token_session(6, 0);
        session.parse(INPUT, None).unwrap();
        assert!(session.parse("0x12 1", None).is_err());
        assert_eq!(session.recipients(), Err(Error::RecipientsNotParsed));
    }

    #[test]
    fn unit_count_change_discards_list() {
        let mut session = token_session(6, 10_000_000);
        session.parse(INPUT, None).unwrap();
        assert!(!session.needs_authorization().unwrap());

        assert!(session.apply_token_snapshot(token(), snapshot(18, 10_000_000)));
        let stale = Error::StaleRecipients(InvalidationReason::UnitCountChanged { from: 6, to: 18 });
        assert_eq!(session.recipients().unwrap_err(), stale);
        assert_eq!(session.begin_transfer(contract()).unwrap_err(), stale);
        assert_eq!(session.state(Action::Transfer), &SubmissionState::Idle);

        session.parse(INPUT, None).unwrap();
        assert_eq!(session.recipients().unwrap().unit_count(), 18);
    }

    #[test]
    fn same_unit_count_keeps_list() {
        let mut session = token_session(6, 0);
        session.parse(INPUT, None).unwrap();
        assert!(session.apply_token_snapshot(token(), snapshot(6, 4_000_000)));
        assert!(session.recipients().is_ok());
        assert!(!session.needs_authorization().unwrap());
    }

    #[test]
    fn asset_mode_and_input_changes_discard_list() {
        let mut session = Session::new(18);
        session.parse(INPUT, None).unwrap();
        session.input_edited();
        assert_eq!(
            session.total(),
            Err(Error::StaleRecipients(InvalidationReason::InputEdited))
        );

        session.parse(INPUT, None).unwrap();
        session.set_input_mode(InputMode::Global);
        assert_eq!(
            session.total(),
            Err(Error::StaleRecipients(InvalidationReason::ModeChanged))
        );

        session.parse(INPUT, Some("1")).unwrap();
        session.select_token(TOKEN);
        assert_eq!(
            session.total(),
            Err(Error::StaleRecipients(InvalidationReason::AssetChanged))
        );
    }

    #[test]
    fn should_ignore_state_for_deselected_token() {
        let mut session = token_session(6, 0);
        session.select_native();
        assert!(!session.apply_token_snapshot(token(), snapshot(6, 0)));
        assert!(!session.observe_allowance(token(), U256::one()));
    }

    #[test]
    fn transfer_waits_for_authorization() {
        let mut session = token_session(6, 0);
        session.parse(INPUT, None).unwrap();
        assert!(session.needs_authorization().unwrap());
        assert_eq!(
            session.begin_transfer(contract()),
            Err(Error::AuthorizationNotConfirmed)
        );

        let call = session.begin_authorize(contract()).unwrap();
        assert_eq!(
            call,
            CallSpec::approve(token(), contract(), U256::from(4_000_000u64))
        );
        assert_eq!(session.state(Action::Authorize), &SubmissionState::AwaitingSignature);
        assert_eq!(
            session.begin_transfer(contract()),
            Err(Error::AuthorizationNotConfirmed)
        );
        assert_eq!(
            session.begin_authorize(contract()),
            Err(Error::ActionInFlight(Action::Authorize))
        );

        session
            .record_broadcast(Action::Authorize, TxHash::new([1; 32]))
            .unwrap();
        session
            .record_confirmation(Action::Authorize, receipt(1))
            .unwrap();
        // The allowance has to be read again after authorizing.
        assert_eq!(session.begin_transfer(contract()), Err(Error::AllowanceUnknown));

        assert!(session.observe_allowance(token(), U256::from(4_000_000u64)));
        let call = session.begin_transfer(contract()).unwrap();
        assert!(matches!(call, CallSpec::DistributeToken { .. }));
        assert_eq!(
            session.begin_transfer(contract()),
            Err(Error::ActionInFlight(Action::Transfer))
        );
        assert_eq!(
            session.begin_authorize(contract()),
            Err(Error::ActionInFlight(Action::Transfer))
        );
    }

    #[test]
    fn confirmed_transfer_spends_known_allowance() {
        let mut session = token_session(6, 4_000_000);
        session.parse(INPUT, None).unwrap();
        session.begin_transfer(contract()).unwrap();
        session
            .record_broadcast(Action::Transfer, TxHash::new([1; 32]))
            .unwrap();
        session
            .record_confirmation(Action::Transfer, receipt(1))
            .unwrap();

        assert_eq!(session.asset_context().unwrap().known_allowance, None);
        assert_eq!(session.needs_authorization(), Err(Error::AllowanceUnknown));
        assert_eq!(session.begin_transfer(contract()), Err(Error::AllowanceUnknown));

        assert!(session.observe_allowance(token(), U256::zero()));
        assert_eq!(
            session.begin_transfer(contract()),
            Err(Error::AuthorizationNotConfirmed)
        );
    }

    #[test]
    fn token_read_started_before_confirmation_is_ignored() {
        let mut session = token_session(6, 0);
        session.parse(INPUT, None).unwrap();
        session.begin_authorize(contract()).unwrap();
        session
            .record_broadcast(Action::Authorize, TxHash::new([1; 32]))
            .unwrap();

        let early = session.begin_token_read().unwrap();
        session
            .record_confirmation(Action::Authorize, receipt(1))
            .unwrap();
        assert!(!session.apply_token_read(early, snapshot(6, 0)));
        assert_eq!(session.needs_authorization(), Err(Error::AllowanceUnknown));

        let fresh = session.begin_token_read().unwrap();
        assert_eq!(fresh.token(), token());
        assert!(session.apply_token_read(fresh, snapshot(6, 4_000_000)));
        assert!(!session.needs_authorization().unwrap());
    }

    #[test]
    fn failed_authorization_blocks_transfer_until_reparse() {
        let mut session = token_session(6, 0);
        session.parse(INPUT, None).unwrap();
        session.begin_authorize(contract()).unwrap();
        session
            .record_failure(
                Action::Authorize,
                FailedPhase::Signature,
                TransportError::Rejected("denied".to_string()),
            )
            .unwrap();
        session.observe_allowance(token(), U256::MAX);
        assert_eq!(
            session.begin_transfer(contract()),
            Err(Error::AuthorizationNotConfirmed)
        );

        session.parse(INPUT, None).unwrap();
        assert_eq!(session.state(Action::Authorize), &SubmissionState::Idle);
        assert!(session.begin_transfer(contract()).is_ok());
    }

    #[test]
    fn native_transfer_needs_no_authorization() {
        let mut session = Session::new(18);
        session.parse(INPUT, None).unwrap();
        assert_eq!(
            session.begin_authorize(contract()),
            Err(Error::AuthorizationNotApplicable)
        );
        let call = session.begin_transfer(contract()).unwrap();
        assert_eq!(call.value(), U256::from(4u64) * U256::exp10(18));
    }

    #[test]
    fn transfer_can_restart_after_failure() {
        let mut session = Session::new(18);
        session.parse(INPUT, None).unwrap();
        session.begin_transfer(contract()).unwrap();
        session
            .record_failure(Action::Transfer, FailedPhase::Broadcast, TransportError::Timeout)
            .unwrap();
        session.begin_transfer(contract()).unwrap();
        assert_eq!(session.state(Action::Transfer), &SubmissionState::AwaitingSignature);
    }

    #[test]
    fn plan_lists_authorization_first_when_needed() {
        let mut session = token_session(6, 1);
        session.parse(INPUT, None).unwrap();
        let plan = session.plan(contract()).unwrap();
        assert_eq!(plan.len(), 2);
        assert!(matches!(plan[0], CallSpec::Approve { .. }));
        assert!(matches!(plan[1], CallSpec::DistributeToken { .. }));

        session.observe_allowance(token(), U256::from(4_000_000u64));
        assert_eq!(session.plan(contract()).unwrap().len(), 1);
    }

    #[test]
    fn summary_formats_allowance() {
        let mut session = token_session(6, 1_500_000);
        session.parse(INPUT, None).unwrap();
        let summary = session.summary().unwrap();
        assert_eq!(summary.symbol.as_deref(), Some("TKN"));
        assert_eq!(summary.recipients, 2);
        assert_eq!(summary.display_total, "4");
        assert_eq!(summary.display_allowance.as_deref(), Some("1.5"));
        assert!(summary.needs_authorization);
    }
}
