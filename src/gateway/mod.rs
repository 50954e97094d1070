//! The Chain Gateway: the deployed prediction-market contract, reached over
//! RPC. All durable state and settlement logic lives behind this surface;
//! the client only reads it and submits write calls against it.
//!
//! `Gateway` wraps the typed bindings with domain-level methods: reads
//! return decoded `RawEvent`/`PredictionSlot` values tagged with their
//! on-chain indices, writes return a `PendingWrite` whose confirmation is
//! awaited separately by the action dispatcher.

pub mod abi;
pub mod types;

pub use types::{EventStatus, Outcome, PredictionSlot, RawEvent};

use abi::PredictionPlatform;
use alloy::network::Ethereum;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, PendingTransactionError};
use thiserror::Error;
use tracing::debug;

/// Event creation payload, exactly as the contract takes it.
pub type NewEvent = PredictionPlatform::EventData;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),
    #[error("transaction failed to confirm: {0}")]
    Confirmation(#[from] PendingTransactionError),
    #[error("transaction {0} reverted on-chain")]
    Reverted(B256),
}

/// A submitted write call. The transaction handle is available immediately;
/// inclusion is awaited via [`PendingWrite::confirmed`].
pub struct PendingWrite {
    hash: B256,
    pending: PendingTransactionBuilder<Ethereum>,
}

impl PendingWrite {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Await inclusion. A receipt with a failed status is an error: the
    /// call reverted even though it was mined.
    pub async fn confirmed(self) -> Result<B256, GatewayError> {
        let receipt = self.pending.get_receipt().await?;
        if receipt.status() {
            Ok(receipt.transaction_hash)
        } else {
            Err(GatewayError::Reverted(receipt.transaction_hash))
        }
    }
}

#[derive(Clone)]
pub struct Gateway {
    contract: PredictionPlatform::PredictionPlatformInstance<DynProvider>,
    chain_id: u64,
}

impl Gateway {
    pub fn new(address: Address, provider: DynProvider, chain_id: u64) -> Self {
        Self {
            contract: PredictionPlatform::new(address, provider),
            chain_id,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    // --- Reads ---

    pub async fn event_count(&self) -> Result<u64, GatewayError> {
        let count = self.contract.getEventCount().call().await?;
        debug!(chain = self.chain_id, count = %count, "read event count");
        Ok(count.try_into().unwrap_or(u64::MAX))
    }

    pub async fn event(&self, index: u64) -> Result<RawEvent, GatewayError> {
        let e = self.contract.events(U256::from(index)).call().await?;
        Ok(RawEvent {
            index,
            start_time: e.startTime,
            creator: e.creator,
            fee_percent: e.creatorFeePercent,
            status: EventStatus::from_u8(e.status),
            accepted_token: e.acceptedToken,
            title: e.title,
            outcome_a: e.outcomeA,
            outcome_b: e.outcomeB,
        })
    }

    /// Read events `[start, end)`. The caller is responsible for keeping the
    /// range in bounds; the contract rejects out-of-range reads.
    pub async fn events_range(&self, start: u64, end: u64) -> Result<Vec<RawEvent>, GatewayError> {
        let rows = self
            .contract
            .getEventsRange(U256::from(start), U256::from(end))
            .call()
            .await?;
        debug!(chain = self.chain_id, start, end, rows = rows.len(), "read event range");
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(offset, e)| RawEvent {
                index: start + offset as u64,
                start_time: e.startTime,
                creator: e.creator,
                fee_percent: e.creatorFeePercent,
                status: EventStatus::from_u8(e.status),
                accepted_token: e.acceptedToken,
                title: e.title,
                outcome_a: e.outcomeA,
                outcome_b: e.outcomeB,
            })
            .collect())
    }

    pub async fn prediction(
        &self,
        event_index: u64,
        slot_index: u64,
    ) -> Result<PredictionSlot, GatewayError> {
        let p = self
            .contract
            .predictions(U256::from(event_index), U256::from(slot_index))
            .call()
            .await?;
        Ok(PredictionSlot {
            event_index,
            slot_index,
            amount: p.amount,
            player_a: p.playerA,
            outcome_a: Outcome::from_index(p.outcomeA),
            outcome_b: Outcome::from_index(p.outcomeB),
            player_b: p.playerB,
        })
    }

    pub async fn resolved_winner(&self, event_index: u64) -> Result<Outcome, GatewayError> {
        let winner = self
            .contract
            .resolvedEventWinners(U256::from(event_index))
            .call()
            .await?;
        Ok(Outcome::from_index(winner))
    }

    // --- Writes ---

    pub async fn create_events(&self, events: Vec<NewEvent>) -> Result<PendingWrite, GatewayError> {
        let pending = self.contract.createEvents(events).send().await?;
        Ok(Self::pending(pending))
    }

    /// Payable: the stake rides along as transaction value.
    pub async fn place_prediction(
        &self,
        event_index: u64,
        outcome: Outcome,
        amount: U256,
    ) -> Result<PendingWrite, GatewayError> {
        let pending = self
            .contract
            .placePrediction(U256::from(event_index), outcome.index(), amount)
            .value(amount)
            .send()
            .await?;
        Ok(Self::pending(pending))
    }

    /// Payable: the matcher must stake exactly the slot's amount.
    pub async fn match_prediction(
        &self,
        event_index: u64,
        slot_index: u64,
        stake: U256,
    ) -> Result<PendingWrite, GatewayError> {
        let pending = self
            .contract
            .matchPrediction(U256::from(event_index), U256::from(slot_index))
            .value(stake)
            .send()
            .await?;
        Ok(Self::pending(pending))
    }

    pub async fn resolve_event(
        &self,
        event_index: u64,
        winner: Outcome,
    ) -> Result<PendingWrite, GatewayError> {
        let pending = self
            .contract
            .resolveEvent(U256::from(event_index), winner.index())
            .send()
            .await?;
        Ok(Self::pending(pending))
    }

    pub async fn request_refund(
        &self,
        event_index: u64,
        slot_index: u64,
    ) -> Result<PendingWrite, GatewayError> {
        let pending = self
            .contract
            .requestRefund(U256::from(event_index), U256::from(slot_index))
            .send()
            .await?;
        Ok(Self::pending(pending))
    }

    pub async fn claim_winning(
        &self,
        event_index: u64,
        slot_index: u64,
    ) -> Result<PendingWrite, GatewayError> {
        let pending = self
            .contract
            .claimWinning(U256::from(event_index), U256::from(slot_index))
            .send()
            .await?;
        Ok(Self::pending(pending))
    }

    fn pending(pending: PendingTransactionBuilder<Ethereum>) -> PendingWrite {
        PendingWrite {
            hash: *pending.tx_hash(),
            pending,
        }
    }
}
