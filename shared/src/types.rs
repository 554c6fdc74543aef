//! Common types used across the platform

use chrono::{FixedOffset, Offset, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use std::str::FromStr;

/// Offset of East Africa Time, the zone forecast days are bucketed in by default
pub const DEFAULT_UTC_OFFSET_SECONDS: i32 = 3 * 3600;

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Supported UI languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "sw")]
    Swahili,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Swahili => "sw",
        }
    }

    /// Resolve a language code, falling back to English for anything unknown
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "sw" | "swahili" | "kiswahili" => Language::Swahili,
            _ => Language::English,
        }
    }
}

/// Build a fixed offset zone from seconds east of UTC.
///
/// Offsets chrono rejects (beyond ±24h) fall back to UTC.
pub fn reference_zone(utc_offset_seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_seconds).unwrap_or_else(|| Utc.fix())
}

/// The zone forecast samples are bucketed in unless configured otherwise
pub fn default_reference_zone() -> FixedOffset {
    reference_zone(DEFAULT_UTC_OFFSET_SECONDS)
}

/// Round half away from zero, the way the advisory figures are presented
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Deserialize an optional decimal that may arrive as a JSON number or a
/// string. Text that is not a number becomes `None` so callers can apply
/// their default. Magnitudes beyond the `Decimal` range clamp to
/// `Decimal::MAX` or `Decimal::MIN`.
///
/// The value is read as raw JSON text, so this only works under a
/// `serde_json` deserializer, but numbers too large for `f64` are accepted.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Box<RawValue>>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        let text = raw.get();
        match serde_json::from_str::<String>(text) {
            Ok(quoted) => parse_decimal(&quoted),
            Err(_) => parse_decimal(text),
        }
    }))
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    let numeric = !raw.is_empty()
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric {
        return None;
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .or_else(|| saturating_decimal(raw))
}

fn saturating_decimal(raw: &str) -> Option<Decimal> {
    let value = raw.parse::<f64>().ok().filter(|v| !v.is_nan())?;
    if value.abs() < 1.0 {
        return Some(Decimal::from_f64(value).unwrap_or(Decimal::ZERO));
    }
    Some(Decimal::from_f64(value).unwrap_or(if value > 0.0 {
        Decimal::MAX
    } else {
        Decimal::MIN
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_decimal")]
        value: Option<Decimal>,
    }

    fn probe(json: &str) -> Option<Decimal> {
        serde_json::from_str::<Probe>(json).unwrap().value
    }

    #[test]
    fn test_lenient_decimal_accepts_numbers_and_strings() {
        assert_eq!(probe(r#"{"value": 28}"#), Some(Decimal::from(28)));
        assert_eq!(probe(r#"{"value": 28.5}"#), Some(Decimal::new(285, 1)));
        assert_eq!(probe(r#"{"value": " 31.2 "}"#), Some(Decimal::new(312, 1)));
    }

    #[test]
    fn test_lenient_decimal_malformed_becomes_none() {
        assert_eq!(probe(r#"{"value": "hot"}"#), None);
        assert_eq!(probe(r#"{"value": ""}"#), None);
        assert_eq!(probe(r#"{"value": null}"#), None);
        assert_eq!(probe(r#"{"value": true}"#), None);
        assert_eq!(probe(r#"{}"#), None);
    }

    #[test]
    fn test_lenient_decimal_out_of_range_saturates() {
        assert_eq!(probe(r#"{"value": 1e30}"#), Some(Decimal::MAX));
        assert_eq!(probe(r#"{"value": -1e30}"#), Some(Decimal::MIN));
        assert_eq!(probe(r#"{"value": 1e400}"#), Some(Decimal::MAX));
        assert_eq!(probe(r#"{"value": "-1e400"}"#), Some(Decimal::MIN));
        assert_eq!(probe(r#"{"value": 1e-400}"#), Some(Decimal::ZERO));
        assert_eq!(probe(r#"{"value": 3.5e1}"#), Some(Decimal::from(35)));
    }

    #[test]
    fn test_lenient_decimal_rejects_non_numeric_words() {
        assert_eq!(probe(r#"{"value": "inf"}"#), None);
        assert_eq!(probe(r#"{"value": "NaN"}"#), None);
        assert_eq!(probe(r#"{"value": {"c": 30}}"#), None);
        assert_eq!(probe(r#"{"value": [30]}"#), None);
    }

    #[test]
    fn test_round_dp_half_away_from_zero() {
        assert_eq!(round_dp(Decimal::new(5745, 3), 2), Decimal::new(575, 2));
        assert_eq!(round_dp(Decimal::new(25, 1), 0), Decimal::from(3));
        assert_eq!(round_dp(Decimal::new(6736, 3), 2), Decimal::new(674, 2));
    }

    #[test]
    fn test_reference_zone() {
        assert_eq!(default_reference_zone().local_minus_utc(), 10800);
        assert_eq!(reference_zone(-18000).local_minus_utc(), -18000);
        assert_eq!(reference_zone(200_000).local_minus_utc(), 0);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("sw"), Language::Swahili);
        assert_eq!(Language::from_code("SW"), Language::Swahili);
        assert_eq!(Language::from_code("fr"), Language::English);
        assert_eq!(Language::Swahili.code(), "sw");
    }
}
