//! Visible-text heuristics used when embedded state is missing or reshaped.
//!
//! What the page renders is what the user sees, so counts read here take
//! precedence over state-derived ones when both exist.

use std::sync::LazyLock;

use regex::Regex;

use crate::count::{parse_abbreviated, parse_count, CountScale};
use crate::page::AnchorTile;

static ARIA_VIEWS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?\s*[KMB]?)\s*VIEWS?").expect("valid regex"));
static LOOSE_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?\s*[KMB]?)").expect("valid regex"));
static FOLLOWERS_AFTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d.,]+\s*[KMB]?)\s+Followers").expect("valid regex")
});
static FOLLOWERS_BEFORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Followers\s+([\d.,]+\s*[KMB]?)").expect("valid regex")
});

/// Leading tokens of a tile's text that may hold its view count.
const TILE_TOKEN_LIMIT: usize = 12;

/// Which heuristic produced a tile's count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSource {
    AriaLabel,
    TextToken,
    Descendant,
}

/// Reads a view count off a video tile, first heuristic that matches wins.
#[must_use]
pub fn tile_views(tile: &AnchorTile) -> Option<(u64, TileSource)> {
    if let Some(label) = tile.aria_label.as_deref() {
        let upper = label.to_uppercase().replace(',', "");
        if let Some(caps) = ARIA_VIEWS_RE.captures(&upper) {
            // A matched label is authoritative even if the number overflows.
            return parse_abbreviated(&caps[1], CountScale::Listing)
                .map(|v| (v, TileSource::AriaLabel));
        }
    }

    if let Some(v) = tile
        .text
        .split_whitespace()
        .take(TILE_TOKEN_LIMIT)
        .find_map(|token| parse_abbreviated(token, CountScale::Listing))
    {
        return Some((v, TileSource::TextToken));
    }

    tile.descendant_texts
        .iter()
        .find_map(|text| descendant_count(text))
        .map(|v| (v, TileSource::Descendant))
}

fn descendant_count(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Some(v) = parse_abbreviated(text, CountScale::Listing) {
        return Some(v);
    }
    let upper = text.to_uppercase();
    let caps = LOOSE_COUNT_RE.captures(&upper)?;
    parse_abbreviated(&caps[1], CountScale::Listing)
}

/// Finds a follower count in the page's visible text.
///
/// Accepts both `"12.3K Followers"` and `"Followers 12.3K"` orderings.
#[must_use]
pub fn followers_from_text(body: &str) -> Option<u64> {
    [&*FOLLOWERS_AFTER_RE, &*FOLLOWERS_BEFORE_RE]
        .into_iter()
        .filter_map(|re| re.captures(body))
        .find_map(|caps| parse_count(&caps[1], CountScale::Listing))
}
