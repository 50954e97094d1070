//! Decoding and display formatting for on-chain values.
//!
//! The Gateway stores outcome labels and titles as fixed-width bytes32.
//! Decoding is tagged and total: malformed input degrades to the raw hex
//! value instead of throwing, and the same input always yields the same
//! output. Timestamps render as a relative distance ("in 3 hours",
//! "2 days ago") with the same raw-value fallback.
//!
//! Amounts are fixed at 18 decimals in both directions (display divides
//! by 10^18, entry multiplies by 10^18 and floors). Token descriptors do
//! carry per-token decimals, but the deployed contract flow is native-asset
//! only, so the fixed divisor is kept as-is rather than silently changed.

use alloy::primitives::{B256, U256};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Base units per whole token at the fixed 18-decimal scale.
const BASE_UNITS_PER_TOKEN: u64 = 1_000_000_000_000_000_000;

/// Result of decoding a fixed-width encoded text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Valid UTF-8 after trailing-zero trim.
    Text(String),
    /// Decode failed; the original value, hex-encoded.
    Raw(String),
}

impl Decoded {
    pub fn display(&self) -> &str {
        match self {
            Decoded::Text(s) => s,
            Decoded::Raw(s) => s,
        }
    }
}

impl std::fmt::Display for Decoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display())
    }
}

/// Decode a bytes32 label to text. Trailing zero padding is stripped;
/// anything that is not printable UTF-8 falls back to the raw hex value.
pub fn decode_label(raw: &B256) -> Decoded {
    let bytes = raw.as_slice();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    match std::str::from_utf8(&bytes[..end]) {
        Ok(s) if !s.is_empty() && !s.chars().any(|c| c.is_control()) => {
            Decoded::Text(s.to_string())
        }
        _ => Decoded::Raw(format!("{raw}")),
    }
}

/// Render a unix start time as a human-readable distance from `now`.
/// Values that do not fit a timestamp degrade to the raw decimal value.
pub fn format_start_time(start: U256, now: DateTime<Utc>) -> String {
    let secs: i64 = match start.try_into() {
        Ok(s) => s,
        Err(_) => return start.to_string(),
    };
    match DateTime::from_timestamp(secs, 0) {
        Some(then) => format_distance(then - now),
        None => start.to_string(),
    }
}

fn format_distance(delta: Duration) -> String {
    let future = delta > Duration::zero();
    let secs = delta.num_seconds().abs();

    let body = if secs < 60 {
        "less than a minute".to_string()
    } else if secs < 3600 {
        plural(secs / 60, "minute")
    } else if secs < 86_400 {
        plural(secs / 3600, "hour")
    } else if secs < 30 * 86_400 {
        plural(secs / 86_400, "day")
    } else if secs < 365 * 86_400 {
        plural(secs / (30 * 86_400), "month")
    } else {
        plural(secs / (365 * 86_400), "year")
    };

    if future {
        format!("in {body}")
    } else {
        format!("{body} ago")
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Format a staked amount (base units) for display: divide by 10^18,
/// fixed to 4 decimal places, rounded half-up.
pub fn format_amount(amount: U256) -> String {
    // Work in 1e-4 token units so the fraction is exactly four digits.
    let unit = U256::from(100_000_000_000_000u64);
    let half = U256::from(50_000_000_000_000u64);
    let scaled = amount.saturating_add(half) / unit;
    let whole = scaled / U256::from(10_000u64);
    let frac: u64 = (scaled % U256::from(10_000u64)).to::<u64>();
    format!("{whole}.{frac:04}")
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is not a valid decimal number")]
    Unparseable,
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("amount is too large")]
    TooLarge,
}

/// Parse a user-entered token amount into integer base units:
/// positive decimal × 10^18, floored.
pub fn parse_amount(input: &str) -> Result<U256, AmountError> {
    let amount = Decimal::from_str(input.trim()).map_err(|_| AmountError::Unparseable)?;
    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    let scaled = amount
        .checked_mul(Decimal::from(BASE_UNITS_PER_TOKEN))
        .ok_or(AmountError::TooLarge)?;
    let floored = scaled.trunc().normalize();
    U256::from_str(&floored.to_string()).map_err(|_| AmountError::TooLarge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> B256 {
        let mut buf = [0u8; 32];
        buf[..text.len()].copy_from_slice(text.as_bytes());
        B256::from(buf)
    }

    #[test]
    fn test_decode_label_text() {
        assert_eq!(decode_label(&label("Lakers win")), Decoded::Text("Lakers win".to_string()));
    }

    #[test]
    fn test_decode_label_malformed_falls_back_to_raw() {
        let mut buf = [0u8; 32];
        buf[0] = 0xff;
        buf[1] = 0xfe;
        let raw = B256::from(buf);
        let decoded = decode_label(&raw);
        assert_eq!(decoded, Decoded::Raw(format!("{raw}")));
        // Idempotent: same input, same fallback, no panic.
        assert_eq!(decode_label(&raw), decoded);
    }

    #[test]
    fn test_decode_label_all_zero_is_raw() {
        assert!(matches!(decode_label(&B256::ZERO), Decoded::Raw(_)));
    }

    #[test]
    fn test_format_start_time_distances() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let in_3h = U256::from(1_700_000_000u64 + 3 * 3600 + 90);
        assert_eq!(format_start_time(in_3h, now), "in 3 hours");

        let two_days_ago = U256::from(1_700_000_000u64 - 2 * 86_400 - 60);
        assert_eq!(format_start_time(two_days_ago, now), "2 days ago");

        let moments = U256::from(1_700_000_000u64 + 30);
        assert_eq!(format_start_time(moments, now), "in less than a minute");
    }

    #[test]
    fn test_format_start_time_overflow_falls_back_to_raw() {
        let now = Utc::now();
        let huge = U256::MAX;
        assert_eq!(format_start_time(huge, now), huge.to_string());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(U256::from(1_000_000_000_000_000_000u64)), "1.0000");
        assert_eq!(format_amount(U256::from(500_000_000_000_000_000u64)), "0.5000");
        assert_eq!(format_amount(U256::from(1_234_567_890_000_000_000u64)), "1.2346");
        assert_eq!(format_amount(U256::ZERO), "0.0000");
    }

    #[test]
    fn test_format_amount_near_max_does_not_overflow() {
        for amount in [U256::MAX, U256::MAX - U256::from(1u64)] {
            let rendered = format_amount(amount);
            let (_, frac) = rendered.split_once('.').unwrap();
            assert_eq!(frac.len(), 4);
        }
    }

    #[test]
    fn test_parse_amount_half_token() {
        assert_eq!(
            parse_amount("0.5").unwrap(),
            U256::from(500_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_parse_amount_floors_sub_wei() {
        // 19 fractional digits; the last one is below base-unit resolution.
        assert_eq!(
            parse_amount("0.0000000000000000015").unwrap(),
            U256::from(1u64)
        );
    }

    #[test]
    fn test_parse_amount_rejects_zero_and_negative() {
        assert_eq!(parse_amount("0"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("-1.5"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("abc"), Err(AmountError::Unparseable));
        assert_eq!(parse_amount(""), Err(AmountError::Unparseable));
    }
}
