//! Action dispatch: client-side validation, write submission, and the
//! transaction lifecycle.
//!
//! Every write follows the same path: validate locally, submit, report
//! phase changes over a channel, and on confirmation emit an invalidation
//! notice so readers refresh the affected event from chain instead of
//! trusting any cached view.

use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

use crate::catalog::EventRecord;
use crate::chains::find_token;
use crate::codec::{parse_amount, AmountError};
use crate::gateway::{Gateway, GatewayError, NewEvent, Outcome, PendingWrite};

const MAX_TITLE_CHARS: usize = 100;
const MAX_FEE_PERCENT: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CreateEvent,
    PlaceBet,
    MatchBet,
    ResolveEvent,
    RequestRefund,
    ClaimWinnings,
}

impl ActionKind {
    /// Label shown while this action's transaction is in flight.
    pub fn in_flight_label(self) -> &'static str {
        match self {
            Self::CreateEvent => "CREATING EVENT",
            Self::PlaceBet => "PLACING BET",
            Self::MatchBet => "MATCHING",
            Self::ResolveEvent => "RESOLVING",
            Self::RequestRefund => "REQUESTING REFUND",
            Self::ClaimWinnings => "CLAIMING",
        }
    }
}

/// Transaction lifecycle, in order. `Confirmed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxPhase {
    Idle,
    Submitted(B256),
    Confirming(B256),
    Confirmed(B256),
    Failed(String),
}

/// Notifications emitted while an action runs. `Invalidated` means cached
/// reads covering the event are stale; `event_index: None` covers the whole
/// catalog (a new event changed the count).
#[derive(Debug, Clone)]
pub enum ActionEvent {
    PhaseChanged { kind: ActionKind, phase: TxPhase },
    Invalidated { event_index: Option<u64> },
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title exceeds {MAX_TITLE_CHARS} characters")]
    TitleTooLong,
    #[error("outcome label must not be empty")]
    EmptyOutcome,
    #[error("outcome label exceeds 32 bytes")]
    OutcomeTooLong,
    #[error("creator fee {0}% is outside 0..={MAX_FEE_PERCENT}")]
    FeeOutOfRange(u64),
    #[error("token {0} is not accepted on this chain")]
    UnknownToken(Address),
    #[error("start time is in the past")]
    StartInPast,
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// User input for a new event, before validation.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub outcome_a: String,
    pub outcome_b: String,
    pub start_time: DateTime<Utc>,
    pub fee_percent: u64,
    pub token: Address,
}

/// Validate a draft against the rules the contract enforces, producing the
/// creation payload. Rejecting locally saves a doomed transaction.
pub fn validate_event_draft(
    draft: &EventDraft,
    chain_id: u64,
    now: DateTime<Utc>,
) -> Result<NewEvent, ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong);
    }
    for outcome in [&draft.outcome_a, &draft.outcome_b] {
        let outcome = outcome.trim();
        if outcome.is_empty() {
            return Err(ValidationError::EmptyOutcome);
        }
        // Stored on-chain as bytes32.
        if outcome.len() > 32 {
            return Err(ValidationError::OutcomeTooLong);
        }
    }
    if draft.fee_percent > MAX_FEE_PERCENT {
        return Err(ValidationError::FeeOutOfRange(draft.fee_percent));
    }
    if find_token(chain_id, draft.token).is_none() {
        return Err(ValidationError::UnknownToken(draft.token));
    }
    if draft.start_time <= now {
        return Err(ValidationError::StartInPast);
    }
    Ok(NewEvent {
        title: title.to_string(),
        outcomeA: draft.outcome_a.trim().to_string(),
        outcomeB: draft.outcome_b.trim().to_string(),
        startTime: U256::from(draft.start_time.timestamp() as u64),
        creatorFeePercent: U256::from(draft.fee_percent),
        acceptedToken: draft.token,
    })
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no signing key configured, running read-only")]
    ReadOnly,
    #[error("only the event creator may resolve it")]
    NotCreator,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Submits writes against the Gateway and reports their lifecycle over a
/// channel. One dispatcher per connected wallet.
pub struct Dispatcher {
    gateway: Gateway,
    wallet: Option<Address>,
    events: UnboundedSender<ActionEvent>,
}

impl Dispatcher {
    pub fn new(gateway: Gateway, wallet: Option<Address>, events: UnboundedSender<ActionEvent>) -> Self {
        Self {
            gateway,
            wallet,
            events,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.wallet.is_none()
    }

    fn signer(&self) -> Result<Address, DispatchError> {
        self.wallet.ok_or(DispatchError::ReadOnly)
    }

    pub async fn create_event(
        &self,
        draft: &EventDraft,
        now: DateTime<Utc>,
    ) -> Result<B256, DispatchError> {
        self.signer()?;
        let payload = validate_event_draft(draft, self.gateway.chain_id(), now)?;
        let pending = self.gateway.create_events(vec![payload]).await;
        self.drive(ActionKind::CreateEvent, None, pending).await
    }

    pub async fn place_bet(
        &self,
        event_index: u64,
        outcome: Outcome,
        amount: &str,
    ) -> Result<B256, DispatchError> {
        self.signer()?;
        let amount = parse_amount(amount).map_err(ValidationError::from)?;
        let pending = self.gateway.place_prediction(event_index, outcome, amount).await;
        self.drive(ActionKind::PlaceBet, Some(event_index), pending).await
    }

    /// Take the other side of an open slot. `stake` must equal the slot's
    /// recorded amount; the contract rejects anything else.
    pub async fn match_bet(
        &self,
        event_index: u64,
        slot_index: u64,
        stake: U256,
    ) -> Result<B256, DispatchError> {
        self.signer()?;
        let pending = self.gateway.match_prediction(event_index, slot_index, stake).await;
        self.drive(ActionKind::MatchBet, Some(event_index), pending).await
    }

    /// Grade an event. Guarded locally: only the recorded creator may
    /// resolve, and a mismatched wallet fails before any submission.
    pub async fn resolve_event(
        &self,
        event: &EventRecord,
        winner: Outcome,
    ) -> Result<B256, DispatchError> {
        let wallet = self.signer()?;
        if wallet != event.creator {
            return Err(DispatchError::NotCreator);
        }
        let pending = self.gateway.resolve_event(event.index, winner).await;
        self.drive(ActionKind::ResolveEvent, Some(event.index), pending).await
    }

    pub async fn request_refund(
        &self,
        event_index: u64,
        slot_index: u64,
    ) -> Result<B256, DispatchError> {
        self.signer()?;
        let pending = self.gateway.request_refund(event_index, slot_index).await;
        self.drive(ActionKind::RequestRefund, Some(event_index), pending).await
    }

    pub async fn claim_winnings(
        &self,
        event_index: u64,
        slot_index: u64,
    ) -> Result<B256, DispatchError> {
        self.signer()?;
        let pending = self.gateway.claim_winning(event_index, slot_index).await;
        self.drive(ActionKind::ClaimWinnings, Some(event_index), pending).await
    }

    /// Shared tail of every write: report submission, await confirmation,
    /// and invalidate the affected reads once the write is durable.
    async fn drive(
        &self,
        kind: ActionKind,
        invalidates: Option<u64>,
        submitted: Result<PendingWrite, GatewayError>,
    ) -> Result<B256, DispatchError> {
        let pending = match submitted {
            Ok(pending) => pending,
            Err(e) => {
                error!(action = kind.in_flight_label(), error = %e, "submission failed");
                self.emit_phase(kind, TxPhase::Failed(e.to_string()));
                return Err(e.into());
            }
        };

        let hash = pending.hash();
        info!(action = kind.in_flight_label(), tx = %hash, "submitted");
        self.emit_phase(kind, TxPhase::Submitted(hash));
        self.emit_phase(kind, TxPhase::Confirming(hash));

        match pending.confirmed().await {
            Ok(hash) => {
                info!(action = kind.in_flight_label(), tx = %hash, "confirmed");
                self.emit_phase(kind, TxPhase::Confirmed(hash));
                let _ = self.events.send(ActionEvent::Invalidated {
                    event_index: invalidates,
                });
                Ok(hash)
            }
            Err(e) => {
                error!(action = kind.in_flight_label(), tx = %hash, error = %e, "failed");
                self.emit_phase(kind, TxPhase::Failed(e.to_string()));
                Err(e.into())
            }
        }
    }

    fn emit_phase(&self, kind: ActionKind, phase: TxPhase) {
        let _ = self.events.send(ActionEvent::PhaseChanged { kind, phase });
    }
}
