use super::*;
use serde_json::json;

#[test]
fn score_node_ranks_stats_shapes() {
    assert_eq!(score_node(&json!({"stats": {"playCount": 1}, "desc": "x"})), 6);
    assert_eq!(score_node(&json!({"stats": {"playCount": 1}})), 5);
    assert_eq!(score_node(&json!({"playCount": 1})), 3);
    assert_eq!(score_node(&json!({"stats": "n/a"})), 2);
    assert_eq!(score_node(&json!({"desc": "caption"})), 1);
    assert_eq!(score_node(&json!({"stats": null})), 0);
    assert_eq!(score_node(&json!([1, 2])), 0);
}

#[test]
fn node_id_takes_first_present_alias() {
    assert_eq!(node_id(&json!({"id": "7"})).as_deref(), Some("7"));
    assert_eq!(node_id(&json!({"awemeId": 7})).as_deref(), Some("7"));
    assert_eq!(
        node_id(&json!({"itemInfo": {"itemStruct": {"id": "9"}}})).as_deref(),
        Some("9")
    );
    assert_eq!(node_id(&json!({"id": null, "videoId": "3"})).as_deref(), Some("3"));
    assert_eq!(node_id(&json!({"name": "x"})), None);
}

#[test]
fn single_keyed_node_is_found_wherever_it_sits() {
    let tree = json!({
        "a": [{"b": {"c": {"111": {"desc": "deep"}}}}],
        "noise": {"222": {"stats": {"playCount": 5}}}
    });
    let outcome = find_video_node(&tree, "111", LISTING_NODE_BUDGET);
    let best = outcome.best.unwrap();
    assert_eq!(best.kind, MatchKind::Key);
    assert_eq!(best.node["desc"], "deep");
    assert_eq!(outcome.counts.key_match, 1);
}

#[test]
fn higher_score_wins_across_matches() {
    let tree = json!({
        "share": {"id": "42", "desc": "stub"},
        "detail": {"items": [{"id": "42", "stats": {"playCount": 900}}]}
    });
    let best = find_video_node(&tree, "42", DETAIL_NODE_BUDGET).best.unwrap();
    assert_eq!(best.kind, MatchKind::Field);
    assert_eq!(best.node["stats"]["playCount"], 900);
}

#[test]
fn equal_scores_keep_the_first_match() {
    let tree = json!({
        "first": {"id": "5", "desc": "one"},
        "second": {"id": "5", "desc": "two"}
    });
    let best = find_video_node(&tree, "5", DETAIL_NODE_BUDGET).best.unwrap();
    assert_eq!(best.node["desc"], "one");
}

#[test]
fn confident_match_stops_traversal() {
    let tree = json!({
        "ItemModule": {"8": {"id": "8", "stats": {"playCount": 1}}},
        "later": {"id": "8", "stats": {"playCount": 2}, "desc": "better"}
    });
    let outcome = find_video_node(&tree, "8", DETAIL_NODE_BUDGET);
    assert_eq!(outcome.best.unwrap().node["stats"]["playCount"], 1);
    // Root plus the ItemModule node; the sibling was never dequeued.
    assert_eq!(outcome.counts.scanned_nodes, 2);
}

#[test]
fn key_match_on_non_object_is_counted_but_ignored() {
    let tree = json!({"77": "just a label"});
    let outcome = find_video_node(&tree, "77", DETAIL_NODE_BUDGET);
    assert!(outcome.best.is_none());
    assert_eq!(outcome.counts.key_match, 1);
}

#[test]
fn never_visits_more_than_budget() {
    let wide: Vec<Value> = (0..500).map(|i| json!({"id": i.to_string()})).collect();
    let tree = json!({"items": wide});
    let outcome = find_video_node(&tree, "499", 50);
    assert_eq!(outcome.counts.scanned_nodes, 50);
    assert!(outcome.best.is_none());

    let unbounded = find_video_node(&tree, "499", LISTING_NODE_BUDGET);
    assert!(unbounded.best.is_some());
    assert!(unbounded.counts.scanned_nodes <= LISTING_NODE_BUDGET);
}

#[test]
fn zero_budget_visits_nothing() {
    let tree = json!({"1": {"stats": {}}});
    let outcome = find_video_node(&tree, "1", 0);
    assert!(outcome.best.is_none());
    assert_eq!(outcome.counts.scanned_nodes, 0);
}
