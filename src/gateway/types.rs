//! Domain types decoded from Gateway reads.

use alloy::primitives::{Address, B256, U256};

/// A binary event outcome. The wire encoding is uint8: A=0, B=1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    A,
    B,
}

impl Outcome {
    pub fn opposite(self) -> Self {
        match self {
            Outcome::A => Outcome::B,
            Outcome::B => Outcome::A,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Outcome::A => 0,
            Outcome::B => 1,
        }
    }

    pub fn from_index(value: u8) -> Self {
        if value == 0 {
            Outcome::A
        } else {
            Outcome::B
        }
    }

    /// Parse a CLI/user spelling: "A"/"a"/"0" or "B"/"b"/"1".
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A" | "a" | "0" => Some(Outcome::A),
            "B" | "b" | "1" => Some(Outcome::B),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::A => write!(f, "A"),
            Outcome::B => write!(f, "B"),
        }
    }
}

/// Event lifecycle status. Transitions are monotonic and owned entirely by
/// the Gateway; the client only ever reads this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Pending,
    Active,
    Resolved,
}

impl EventStatus {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => EventStatus::Pending,
            1 => EventStatus::Active,
            _ => EventStatus::Resolved,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Pending => write!(f, "PENDING"),
            EventStatus::Active => write!(f, "ACTIVE"),
            EventStatus::Resolved => write!(f, "RESOLVED"),
        }
    }
}

/// An event exactly as stored on-chain, tagged with its absolute index in
/// the append-only event list. Labels are still encoded at this layer.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub index: u64,
    pub start_time: U256,
    pub creator: Address,
    pub fee_percent: u8,
    pub status: EventStatus,
    pub accepted_token: Address,
    pub title: B256,
    pub outcome_a: B256,
    pub outcome_b: B256,
}

/// One prediction slot, tagged with (event index, slot index) so a match
/// action can later target the right slot.
#[derive(Debug, Clone)]
pub struct PredictionSlot {
    pub event_index: u64,
    pub slot_index: u64,
    pub amount: U256,
    pub player_a: Address,
    pub outcome_a: Outcome,
    /// Meaningful only once the slot is matched.
    pub outcome_b: Outcome,
    /// Zero address while unmatched.
    pub player_b: Address,
}

impl PredictionSlot {
    /// A slot with zero amount is an empty storage slot, not a prediction.
    pub fn exists(&self) -> bool {
        self.amount > U256::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_round_trip_and_opposite() {
        assert_eq!(Outcome::from_index(0), Outcome::A);
        assert_eq!(Outcome::from_index(1), Outcome::B);
        assert_eq!(Outcome::A.opposite(), Outcome::B);
        assert_eq!(Outcome::B.opposite(), Outcome::A);
        assert_eq!(Outcome::parse("b"), Some(Outcome::B));
        assert_eq!(Outcome::parse("2"), None);
    }

    #[test]
    fn test_status_decoding() {
        assert_eq!(EventStatus::from_u8(0), EventStatus::Pending);
        assert_eq!(EventStatus::from_u8(1), EventStatus::Active);
        assert_eq!(EventStatus::from_u8(2), EventStatus::Resolved);
    }
}
