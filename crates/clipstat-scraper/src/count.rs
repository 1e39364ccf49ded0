//! Human-readable count parsing (`"12.3K"`, `"4.5M"`, `"1,234"`).
//!
//! Abbreviated counts are lossy: `"12.3K"` stands for anything in
//! `12_250..12_350`, so a parsed value is only accurate to half a unit of the
//! last displayed digit times the suffix multiplier. Callers must not expect
//! a round trip through the site's own formatting to be exact.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static LISTING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([KMB])?$").expect("valid regex"));
static DETAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([KM])?$").expect("valid regex"));

/// Which suffixes a parsing context understands.
///
/// Video pages never render billions, and their parser only knows `K`/`M`;
/// a `B` there falls through to digit stripping like any other stray letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountScale {
    /// Profile listings and follower counts: `K`, `M`, `B`.
    Listing,
    /// Single-video pages: `K`, `M`.
    Detail,
}

impl CountScale {
    fn pattern(self) -> &'static Regex {
        match self {
            CountScale::Listing => &LISTING_RE,
            CountScale::Detail => &DETAIL_RE,
        }
    }
}

fn normalise(raw: &str) -> String {
    raw.trim().to_uppercase().replace(',', "")
}

fn to_count(value: f64) -> Option<u64> {
    let rounded = value.round();
    // u64::MAX is not exactly representable; anything at or past 2^64 is out.
    #[allow(clippy::cast_precision_loss)]
    let limit = u64::MAX as f64;
    if !rounded.is_finite() || rounded < 0.0 || rounded >= limit {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(rounded as u64)
}

/// Strict `<float><suffix?>` parse with no digit-stripping fallback.
///
/// Used where arbitrary words are being tested (tile text tokens), so that
/// `"#fyp2"` is not mistaken for a count.
#[must_use]
pub fn parse_abbreviated(raw: &str, scale: CountScale) -> Option<u64> {
    let text = normalise(raw);
    let caps = scale.pattern().captures(&text)?;
    let base: f64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some("K") => 1e3,
        Some("M") => 1e6,
        Some("B") => 1e9,
        _ => 1.0,
    };
    to_count(base * multiplier)
}

/// Parses a display count, falling back to "every digit in the string".
///
/// Returns `None` when nothing numeric can be recovered. Never fails loudly:
/// absence of a parse is a normal outcome on an adversarial page.
#[must_use]
pub fn parse_count(raw: &str, scale: CountScale) -> Option<u64> {
    if let Some(value) = parse_abbreviated(raw, scale) {
        return Some(value);
    }
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}

/// Reads a count out of an embedded-state JSON value.
///
/// Numbers are taken as-is (rounded, non-negative); strings go through
/// [`parse_count`]; everything else is `None`.
#[must_use]
pub fn count_from_value(value: &Value, scale: CountScale) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(to_count)),
        Value::String(s) => parse_count(s, scale),
        _ => None,
    }
}
