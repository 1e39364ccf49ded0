//! Projects view/like/comment counters out of a node of unknown shape.
//!
//! The projection is table-driven: an ordered list of places a stats
//! sub-object may live, and per counter an ordered list of field aliases.
//! When the first container yields nothing, a fixed list of wrapper objects
//! is tried one by one.

use serde_json::Value;

use crate::count::{count_from_value, CountScale};
use crate::graph::value_at;

/// Candidate locations of a stats sub-object, in probe order.
const STATS_PATHS: [&[&str]; 10] = [
    &["stats"],
    &["statsV2"],
    &["statistics"],
    &["itemStruct", "stats"],
    &["itemStruct", "statsV2"],
    &["itemInfo", "itemStruct", "stats"],
    &["itemInfo", "itemStruct", "statsV2"],
    &["itemInfo", "stats"],
    &["video", "stats"],
    &["video", "statistics"],
];

/// Wrapper objects re-projected when the first pass finds nothing.
const NESTED_CANDIDATES: [&[&str]; 9] = [
    &["itemStruct"],
    &["itemInfo"],
    &["itemInfo", "itemStruct"],
    &["video"],
    &["video", "stats"],
    &["video", "statistics"],
    &["stats"],
    &["statistics"],
    &["statsV2"],
];

const VIEW_ALIASES: &[&[&str]] = &[
    &["playCount"],
    &["viewCount"],
    &["play_count"],
    &["stats", "playCount"],
];
const LIKE_ALIASES: &[&[&str]] = &[
    &["diggCount"],
    &["likeCount"],
    &["digg_count"],
    &["stats", "diggCount"],
];
const COMMENT_ALIASES: &[&[&str]] = &[
    &["commentCount"],
    &["comment_count"],
    &["stats", "commentCount"],
];

/// Views fields read off the candidate itself when its stats container has none.
const OWN_VIEW_ALIASES: &[&[&str]] = &[&["playCount"], &["viewCount"]];

/// Where the projected counters came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateShape {
    /// A stats sub-object at this path.
    StatsObject(&'static [&'static str]),
    /// Counters are fields of the candidate itself.
    Flat,
    /// Found only after descending into this wrapper.
    Nested(&'static [&'static str]),
    /// Nothing recoverable.
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedStats {
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub shape: CandidateShape,
}

impl ProjectedStats {
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.views.is_some() || self.likes.is_some() || self.comments.is_some()
    }
}

/// First alias present with a non-null value, then parsed.
fn probe(source: &Value, aliases: &[&[&str]], scale: CountScale) -> Option<u64> {
    aliases
        .iter()
        .filter_map(|path| value_at(source, path))
        .find(|v| !v.is_null())
        .and_then(|v| count_from_value(v, scale))
}

fn stats_container(node: &Value) -> Option<(&'static [&'static str], &Value)> {
    STATS_PATHS.iter().find_map(|path| {
        value_at(node, path)
            .filter(|v| v.is_object())
            .map(|v| (*path, v))
    })
}

fn project_once(node: &Value, scale: CountScale) -> ProjectedStats {
    let (shape, source) = match stats_container(node) {
        Some((path, container)) => (CandidateShape::StatsObject(path), container),
        None => (CandidateShape::Flat, node),
    };
    let views = probe(source, VIEW_ALIASES, scale).or_else(|| probe(node, OWN_VIEW_ALIASES, scale));
    ProjectedStats {
        views,
        likes: probe(source, LIKE_ALIASES, scale),
        comments: probe(source, COMMENT_ALIASES, scale),
        shape,
    }
}

/// Extracts counters from `node`; fields that cannot be resolved are `None`.
#[must_use]
pub fn project_stats(node: &Value, scale: CountScale) -> ProjectedStats {
    if !node.is_object() {
        return ProjectedStats {
            views: None,
            likes: None,
            comments: None,
            shape: CandidateShape::Opaque,
        };
    }

    let first = project_once(node, scale);
    if first.has_any() {
        return first;
    }

    NESTED_CANDIDATES
        .iter()
        .filter_map(|path| value_at(node, path).filter(|v| v.is_object()).map(|v| (*path, v)))
        .map(|(path, candidate)| ProjectedStats {
            shape: CandidateShape::Nested(path),
            ..project_once(candidate, scale)
        })
        .find(ProjectedStats::has_any)
        .unwrap_or(ProjectedStats {
            shape: CandidateShape::Opaque,
            ..first
        })
}
