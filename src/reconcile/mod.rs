//! Matching reconciler: splits an event's occupied slots into matched pairs
//! and open positions, and works out which open positions the connected
//! wallet may take the other side of.
//!
//! A slot is matched exactly when a counterparty address is recorded in it;
//! amount alone only says the slot exists.

use alloy::primitives::{Address, U256};

use crate::catalog::EventRecord;
use crate::codec::format_amount;
use crate::gateway::{Outcome, PredictionSlot};

pub fn is_matched(slot: &PredictionSlot) -> bool {
    slot.player_b != Address::ZERO
}

/// Whether `user` may match `slot` while targeting `target`: the slot must
/// be open, hold the opposite outcome, and not be the user's own position.
pub fn is_eligible(slot: &PredictionSlot, user: Address, target: Outcome) -> bool {
    !is_matched(slot) && slot.outcome_a == target.opposite() && slot.player_a != user
}

/// Open slots `user` may take the other side of while targeting `target`.
pub fn matchable<'a>(
    slots: &'a [PredictionSlot],
    user: Address,
    target: Outcome,
) -> Vec<&'a PredictionSlot> {
    slots
        .iter()
        .filter(|s| is_eligible(s, user, target))
        .collect()
}

/// A completed pair: both sides staked, positions locked.
#[derive(Debug, Clone)]
pub struct MatchedEntry {
    pub slot_index: u64,
    pub player_a: Address,
    pub player_a_outcome: String,
    pub player_b: Address,
    pub player_b_outcome: String,
    pub amount: U256,
    pub amount_display: String,
}

/// The taking action available on an open slot: stake the same amount on
/// the opposite outcome. The label names the outcome the taker would hold.
#[derive(Debug, Clone)]
pub struct MatchAction {
    pub slot_index: u64,
    pub stake: U256,
    pub label: String,
}

/// An open position still waiting for a counterparty.
#[derive(Debug, Clone)]
pub struct UnmatchedEntry {
    pub slot_index: u64,
    pub player_a: Address,
    pub player_a_outcome: String,
    pub amount: U256,
    pub amount_display: String,
    pub action: Option<MatchAction>,
}

#[derive(Debug, Default)]
pub struct Reconciled {
    pub matched: Vec<MatchedEntry>,
    pub unmatched: Vec<UnmatchedEntry>,
}

/// Partition an event's slots into matched and unmatched views. `user` is
/// the connected wallet, if any; without one, no taking actions are offered.
pub fn reconcile(
    event: &EventRecord,
    slots: &[PredictionSlot],
    user: Option<Address>,
) -> Reconciled {
    let names = [event.outcome_a.display(), event.outcome_b.display()];
    let name_of = |o: Outcome| names[o.index() as usize].to_string();

    let mut out = Reconciled::default();
    for slot in slots {
        let amount_display = format_amount(slot.amount);
        if is_matched(slot) {
            out.matched.push(MatchedEntry {
                slot_index: slot.slot_index,
                player_a: slot.player_a,
                player_a_outcome: name_of(slot.outcome_a),
                player_b: slot.player_b,
                player_b_outcome: name_of(slot.outcome_a.opposite()),
                amount: slot.amount,
                amount_display,
            });
        } else {
            let action = user
                .filter(|u| *u != slot.player_a)
                .map(|_| MatchAction {
                    slot_index: slot.slot_index,
                    stake: slot.amount,
                    label: format!("BET {}", name_of(slot.outcome_a.opposite())),
                });
            out.unmatched.push(UnmatchedEntry {
                slot_index: slot.slot_index,
                player_a: slot.player_a,
                player_a_outcome: name_of(slot.outcome_a),
                amount: slot.amount,
                amount_display,
                action,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{EventStatus, RawEvent};
    use alloy::primitives::{B256, U256};
    use chrono::Utc;

    fn label(s: &str) -> B256 {
        let mut bytes = [0u8; 32];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        B256::from(bytes)
    }

    fn event() -> EventRecord {
        let raw = RawEvent {
            index: 7,
            start_time: U256::from(1_900_000_000u64),
            creator: Address::repeat_byte(0x01),
            fee_percent: 5,
            status: EventStatus::Active,
            accepted_token: Address::ZERO,
            title: label("Title fight"),
            outcome_a: label("YES"),
            outcome_b: label("NO"),
        };
        EventRecord::from_raw(raw, 10143, Utc::now())
    }

    fn open_slot(slot_index: u64, player_a: Address, outcome_a: Outcome) -> PredictionSlot {
        PredictionSlot {
            event_index: 7,
            slot_index,
            amount: U256::from(2_000_000_000_000_000_000u64),
            player_a,
            outcome_a,
            outcome_b: outcome_a.opposite(),
            player_b: Address::ZERO,
        }
    }

    #[test]
    fn matched_means_counterparty_recorded() {
        let mut s = open_slot(0, Address::repeat_byte(0xaa), Outcome::A);
        assert!(!is_matched(&s));
        s.player_b = Address::repeat_byte(0xbb);
        assert!(is_matched(&s));
    }

    #[test]
    fn eligibility_requires_open_opposite_and_foreign() {
        let me = Address::repeat_byte(0x11);
        let other = Address::repeat_byte(0x22);

        // Target A: only open B-slots from someone else qualify.
        assert!(is_eligible(&open_slot(0, other, Outcome::B), me, Outcome::A));
        assert!(!is_eligible(&open_slot(0, other, Outcome::A), me, Outcome::A));
        assert!(!is_eligible(&open_slot(0, me, Outcome::B), me, Outcome::A));

        let mut taken = open_slot(0, other, Outcome::B);
        taken.player_b = Address::repeat_byte(0x33);
        assert!(!is_eligible(&taken, me, Outcome::A));
    }

    #[test]
    fn matchable_keeps_open_opposite_foreign_slots_only() {
        let me = Address::repeat_byte(0x11);
        let other = Address::repeat_byte(0x22);
        let mut taken = open_slot(3, other, Outcome::B);
        taken.player_b = Address::repeat_byte(0x33);
        let slots = vec![
            open_slot(0, other, Outcome::B),
            open_slot(1, other, Outcome::A),
            open_slot(2, me, Outcome::B),
            taken,
        ];

        let candidates = matchable(&slots, me, Outcome::A);
        let indices: Vec<u64> = candidates.iter().map(|s| s.slot_index).collect();
        assert_eq!(indices, vec![0]);

        // Targeting B flips the candidate set.
        let candidates = matchable(&slots, me, Outcome::B);
        let indices: Vec<u64> = candidates.iter().map(|s| s.slot_index).collect();
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn take_action_names_the_opposite_outcome() {
        let me = Address::repeat_byte(0x11);
        let other = Address::repeat_byte(0x22);
        let r = reconcile(&event(), &[open_slot(0, other, Outcome::A)], Some(me));
        assert_eq!(r.unmatched.len(), 1);
        let action = r.unmatched[0].action.as_ref().unwrap();
        assert_eq!(action.label, "BET NO");
        assert_eq!(action.stake, U256::from(2_000_000_000_000_000_000u64));
    }

    #[test]
    fn own_slot_offers_no_action() {
        let me = Address::repeat_byte(0x11);
        let r = reconcile(&event(), &[open_slot(0, me, Outcome::A)], Some(me));
        assert!(r.unmatched[0].action.is_none());
    }

    #[test]
    fn no_wallet_means_no_actions() {
        let other = Address::repeat_byte(0x22);
        let r = reconcile(&event(), &[open_slot(0, other, Outcome::A)], None);
        assert!(r.unmatched[0].action.is_none());
    }

    #[test]
    fn matched_pair_carries_both_sides() {
        let mut s = open_slot(1, Address::repeat_byte(0xaa), Outcome::B);
        s.player_b = Address::repeat_byte(0xbb);
        let r = reconcile(&event(), &[s], None);
        assert!(r.unmatched.is_empty());
        let m = &r.matched[0];
        assert_eq!(m.player_a_outcome, "NO");
        assert_eq!(m.player_b_outcome, "YES");
        assert_eq!(m.amount_display, "2.0000");
    }
}
