//! Event catalog: the trailing window of recently created events.
//!
//! The contract only exposes a count and indexed reads, so the catalog is
//! always the last `CATALOG_WINDOW` events, fetched in one range read and
//! rendered newest first.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::chains::{find_token, TokenDescriptor};
use crate::codec::{decode_label, format_start_time, Decoded};
use crate::gateway::{EventStatus, Gateway, GatewayError, RawEvent};

/// How many trailing events the catalog shows.
pub const CATALOG_WINDOW: u64 = 20;

/// The index range `[start, end)` the catalog covers for a given event
/// count. `None` when the chain has no events at all.
pub fn fetch_window(count: u64) -> Option<std::ops::Range<u64>> {
    if count == 0 {
        None
    } else {
        Some(count.saturating_sub(CATALOG_WINDOW)..count)
    }
}

/// A catalog entry, decoded for display.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub index: u64,
    pub title: Decoded,
    pub outcome_a: Decoded,
    pub outcome_b: Decoded,
    pub start_time: U256,
    pub starts: String,
    pub status: EventStatus,
    pub fee_percent: u8,
    pub creator: Address,
    pub accepted_token: Address,
    pub token: Option<&'static TokenDescriptor>,
}

impl EventRecord {
    pub fn from_raw(raw: RawEvent, chain_id: u64, now: DateTime<Utc>) -> Self {
        Self {
            index: raw.index,
            title: decode_label(&raw.title),
            outcome_a: decode_label(&raw.outcome_a),
            outcome_b: decode_label(&raw.outcome_b),
            start_time: raw.start_time,
            starts: format_start_time(raw.start_time, now),
            status: raw.status,
            fee_percent: raw.fee_percent,
            creator: raw.creator,
            accepted_token: raw.accepted_token,
            token: find_token(chain_id, raw.accepted_token),
        }
    }
}

/// Fetch and decode the catalog window, newest first.
pub async fn read_recent(
    gateway: &Gateway,
    now: DateTime<Utc>,
) -> Result<Vec<EventRecord>, GatewayError> {
    let count = gateway.event_count().await?;
    let Some(window) = fetch_window(count) else {
        debug!("no events on chain yet");
        return Ok(Vec::new());
    };
    let raw = gateway.events_range(window.start, window.end).await?;
    let chain_id = gateway.chain_id();
    let mut records: Vec<EventRecord> = raw
        .into_iter()
        .map(|e| EventRecord::from_raw(e, chain_id, now))
        .collect();
    records.reverse();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_has_no_window() {
        assert_eq!(fetch_window(0), None);
    }

    #[test]
    fn small_counts_cover_everything() {
        assert_eq!(fetch_window(1), Some(0..1));
        assert_eq!(fetch_window(7), Some(0..7));
        assert_eq!(fetch_window(CATALOG_WINDOW), Some(0..CATALOG_WINDOW));
    }

    #[test]
    fn large_counts_keep_only_the_tail() {
        assert_eq!(fetch_window(21), Some(1..21));
        assert_eq!(fetch_window(1000), Some(980..1000));
        let w = fetch_window(1000).unwrap();
        assert_eq!(w.end - w.start, CATALOG_WINDOW);
    }
}
