//! Prediction slot reads.
//!
//! Each event exposes a fixed window of prediction slots by index. Slots
//! are read individually and concurrently; a failed read of one slot never
//! hides the others.

use futures::future::join_all;
use tracing::warn;

use crate::gateway::{Gateway, GatewayError, PredictionSlot};

/// How many slot indices are probed per event.
pub const SLOT_WINDOW: u64 = 5;

/// Outcome of a slot window read: the occupied slots in index order, plus
/// the indices whose reads failed.
#[derive(Debug, Default)]
pub struct SlotFetch {
    pub slots: Vec<PredictionSlot>,
    pub errors: Vec<(u64, GatewayError)>,
}

impl SlotFetch {
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Read the full slot window for an event, all indices in flight at once.
pub async fn read_slots(gateway: &Gateway, event_index: u64) -> SlotFetch {
    let reads = (0..SLOT_WINDOW).map(|slot| gateway.prediction(event_index, slot));
    let fetch = collect_slots(join_all(reads).await);
    for (slot, error) in &fetch.errors {
        warn!(event = event_index, slot, error = %error, "slot read failed");
    }
    fetch
}

/// Split raw read results into occupied slots and per-index errors. Results
/// must be in slot-index order; empty slots (zero amount) are dropped.
pub fn collect_slots(results: Vec<Result<PredictionSlot, GatewayError>>) -> SlotFetch {
    let mut fetch = SlotFetch::default();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(slot) if slot.exists() => fetch.slots.push(slot),
            Ok(_) => {}
            Err(e) => fetch.errors.push((index as u64, e)),
        }
    }
    fetch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Outcome;
    use alloy::primitives::{Address, B256, U256};

    fn slot(slot_index: u64, amount: u64) -> PredictionSlot {
        PredictionSlot {
            event_index: 3,
            slot_index,
            amount: U256::from(amount),
            player_a: Address::repeat_byte(0xaa),
            outcome_a: Outcome::A,
            outcome_b: Outcome::B,
            player_b: Address::ZERO,
        }
    }

    #[test]
    fn empty_slots_are_dropped() {
        let fetch = collect_slots(vec![Ok(slot(0, 100)), Ok(slot(1, 0)), Ok(slot(2, 50))]);
        assert_eq!(fetch.slots.len(), 2);
        assert_eq!(fetch.slots[0].slot_index, 0);
        assert_eq!(fetch.slots[1].slot_index, 2);
        assert!(!fetch.is_partial());
    }

    #[test]
    fn failed_reads_do_not_hide_other_slots() {
        let fetch = collect_slots(vec![
            Ok(slot(0, 100)),
            Err(GatewayError::Reverted(B256::ZERO)),
            Ok(slot(2, 50)),
        ]);
        assert_eq!(fetch.slots.len(), 2);
        assert_eq!(fetch.errors.len(), 1);
        assert_eq!(fetch.errors[0].0, 1);
        assert!(fetch.is_partial());
    }

    #[test]
    fn all_empty_yields_nothing() {
        let fetch = collect_slots((0..SLOT_WINDOW).map(|i| Ok(slot(i, 0))).collect());
        assert!(fetch.slots.is_empty());
        assert!(fetch.errors.is_empty());
    }
}
