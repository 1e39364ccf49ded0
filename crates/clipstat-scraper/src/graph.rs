//! Bounded breadth-first search for a video's node inside embedded state.
//!
//! The state tree's shape shifts between layout versions, so nodes are found
//! by identity rather than by path: either an object keyed by the video id,
//! or an object whose id-like field equals it. Several nodes usually match
//! (a listing entry, a detail entry, a share stub); [`score_node`] ranks them.

use std::collections::VecDeque;

use clipstat_core::MatchCounts;
use serde_json::{Map, Value};

/// Node budget for the per-video searches of a profile listing.
pub const LISTING_NODE_BUDGET: usize = 80_000;
/// Node budget for the single search on a video page.
pub const DETAIL_NODE_BUDGET: usize = 90_000;
/// A match scoring at least this stops the traversal.
pub const CONFIDENT_SCORE: u8 = 4;

const STATS_CONTAINER_KEYS: [&str; 3] = ["stats", "statistics", "statsV2"];
const COUNTER_KEYS: [&str; 5] = [
    "playCount",
    "diggCount",
    "commentCount",
    "viewCount",
    "likeCount",
];
const DESCRIPTOR_KEYS: [&str; 6] = ["desc", "createTime", "author", "authorInfo", "music", "video"];

/// Id fields probed on a node, first present wins.
const ID_FIELDS: [&[&str]; 15] = [
    &["id"],
    &["awemeId"],
    &["aweme_id"],
    &["itemId"],
    &["item_id"],
    &["videoId"],
    &["video_id"],
    &["mediaId"],
    &["media_id"],
    &["itemStruct", "id"],
    &["itemStruct", "awemeId"],
    &["itemStruct", "aweme_id"],
    &["itemInfo", "itemStruct", "id"],
    &["itemInfo", "itemStruct", "awemeId"],
    &["itemInfo", "itemStruct", "aweme_id"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The node is the value of a property named after the id.
    Key,
    /// The node carries an id-like field equal to the id.
    Field,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphMatch<'a> {
    pub node: &'a Value,
    pub score: u8,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome<'a> {
    pub best: Option<GraphMatch<'a>>,
    pub counts: MatchCounts,
}

/// Follows `path` through nested objects.
pub(crate) fn value_at<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(node, |current, key| current.get(*key))
}

fn is_present(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !v.is_null())
}

fn has_stats_object(obj: &Map<String, Value>) -> bool {
    STATS_CONTAINER_KEYS
        .iter()
        .any(|key| obj.get(*key).is_some_and(Value::is_object))
}

/// Confidence that `node` is the full record for a video.
///
/// +3 for looking like a stats container (a stats sub-object or a bare
/// counter field), +2 for carrying a non-null stats field, +1 for content
/// descriptors such as `desc` or `author`. Non-objects score zero.
#[must_use]
pub fn score_node(node: &Value) -> u8 {
    let Some(obj) = node.as_object() else {
        return 0;
    };
    let mut score = 0;
    if has_stats_object(obj) || COUNTER_KEYS.iter().any(|k| obj.contains_key(*k)) {
        score += 3;
    }
    if STATS_CONTAINER_KEYS.iter().any(|k| is_present(obj.get(*k))) {
        score += 2;
    }
    if DESCRIPTOR_KEYS.iter().any(|k| obj.contains_key(*k)) {
        score += 1;
    }
    score
}

/// String form of the first id-like field present on `node`.
#[must_use]
pub fn node_id(node: &Value) -> Option<String> {
    let value = ID_FIELDS
        .iter()
        .filter_map(|path| value_at(node, path))
        .find(|v| !v.is_null())?;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Keeps `candidate` if it beats the current best; `true` once confident.
fn consider<'a>(candidate: GraphMatch<'a>, best: &mut Option<GraphMatch<'a>>) -> bool {
    if best.is_none_or(|b| candidate.score > b.score) {
        *best = Some(candidate);
    }
    best.is_some_and(|b| b.score >= CONFIDENT_SCORE)
}

/// Searches `root` breadth-first for the best-scoring node matching `target`.
///
/// Visits at most `budget` container nodes. Ties keep the earlier match.
#[must_use]
pub fn find_video_node<'a>(root: &'a Value, target: &str, budget: usize) -> SearchOutcome<'a> {
    let mut counts = MatchCounts::default();
    let mut best: Option<GraphMatch<'a>> = None;
    let mut queue: VecDeque<&'a Value> = VecDeque::from([root]);

    while counts.scanned_nodes < budget {
        let Some(node) = queue.pop_front() else {
            break;
        };
        counts.scanned_nodes += 1;

        match node {
            Value::Object(obj) => {
                if let Some(candidate) = obj.get(target) {
                    counts.key_match += 1;
                    if candidate.is_object() {
                        let hit = GraphMatch {
                            node: candidate,
                            score: score_node(candidate),
                            kind: MatchKind::Key,
                        };
                        if consider(hit, &mut best) {
                            break;
                        }
                    }
                }
                if node_id(node).as_deref() == Some(target) {
                    counts.id_match += 1;
                    let hit = GraphMatch {
                        node,
                        score: score_node(node),
                        kind: MatchKind::Field,
                    };
                    if consider(hit, &mut best) {
                        break;
                    }
                }
                queue.extend(obj.values().filter(|v| v.is_object() || v.is_array()));
            }
            Value::Array(items) => {
                queue.extend(items.iter().filter(|v| v.is_object() || v.is_array()));
            }
            _ => {}
        }
    }

    tracing::debug!(
        target_id = target,
        scanned = counts.scanned_nodes,
        key_match = counts.key_match,
        id_match = counts.id_match,
        best_score = best.map(|b| b.score),
        "graph search finished"
    );
    SearchOutcome { best, counts }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
