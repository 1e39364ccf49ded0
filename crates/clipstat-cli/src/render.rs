//! Plain-text views for the terminal.

use std::fmt::Write as _;

use clipstat_core::{
    aggregate, engagement_for, top_by_views, Comparison, ProfileSnapshot, ProfileSummary, Side,
    VideoDetail,
};

const MISSING: &str = "\u{2014}";

fn fmt_count(value: Option<u64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |n| n.to_string())
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |p| format!("{p:.2}%"))
}

fn fmt_winner(side: Option<Side>) -> &'static str {
    match side {
        Some(Side::A) => "A",
        Some(Side::B) => "B",
        None => "tie",
    }
}

/// Header, aggregate line, and the `top` highest-viewed videos.
pub(crate) fn render_snapshot(snapshot: &ProfileSnapshot, top: usize) -> String {
    let stats = aggregate(&snapshot.videos);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "@{}  followers {}",
        snapshot.profile_handle,
        fmt_count(snapshot.followers)
    );
    let _ = writeln!(
        out,
        "videos {}  avg views {}  max views {}  avg engagement {}  coverage {}",
        stats.total,
        fmt_count(stats.avg_views),
        fmt_count(stats.max_views),
        fmt_pct(stats.avg_engagement.map(|e| e * 100.0)),
        fmt_pct(stats.engagement_coverage_pct()),
    );

    let rows = top_by_views(&snapshot.videos, top);
    if rows.is_empty() {
        for hint in &snapshot.debug.hints {
            let _ = writeln!(out, "hint: {hint}");
        }
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:<22}{:>12}{:>10}{:>10}{:>12}",
        "VIDEO", "VIEWS", "LIKES", "COMMENTS", "ENGAGEMENT"
    );
    for video in &rows {
        let _ = writeln!(
            out,
            "{:<22}{:>12}{:>10}{:>10}{:>12}",
            video.video_id,
            fmt_count(video.views),
            fmt_count(video.likes),
            fmt_count(video.comments),
            fmt_pct(engagement_for(video).map(|e| e * 100.0)),
        );
    }
    out
}

pub(crate) fn render_video(detail: &VideoDetail) -> String {
    format!(
        "views {}  likes {}  comments {}  engagement {}\n",
        fmt_count(detail.views),
        fmt_count(detail.likes),
        fmt_count(detail.comments),
        fmt_pct(detail.engagement.map(|e| e * 100.0)),
    )
}

fn summary_row(label: &str, summary: &ProfileSummary) -> String {
    format!(
        "{:<3}{:<24}{:>12}{:>8}{:>12}{:>12}{:>12}{:>10}",
        label,
        format!("@{}", summary.handle),
        fmt_count(summary.followers),
        summary.total,
        fmt_count(summary.avg_views),
        fmt_count(summary.max_views),
        fmt_pct(summary.avg_engagement_pct),
        fmt_pct(summary.engagement_coverage_pct),
    )
}

pub(crate) fn render_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<3}{:<24}{:>12}{:>8}{:>12}{:>12}{:>12}{:>10}",
        "", "PROFILE", "FOLLOWERS", "VIDEOS", "AVG VIEWS", "MAX VIEWS", "AVG ENG", "COVERAGE"
    );
    let _ = writeln!(out, "{}", summary_row("A", &comparison.a));
    let _ = writeln!(out, "{}", summary_row("B", &comparison.b));
    let _ = writeln!(
        out,
        "\nwinners: avg views {}  max views {}  engagement {}",
        fmt_winner(comparison.avg_views_winner),
        fmt_winner(comparison.max_views_winner),
        fmt_winner(comparison.engagement_winner),
    );
    for hint in &comparison.hints {
        let _ = writeln!(out, "hint: {hint}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstat_core::{compare_profiles, DebugTrace, VideoRecord};

    fn snapshot(handle: &str, views: &[u64]) -> ProfileSnapshot {
        ProfileSnapshot {
            profile_handle: handle.to_string(),
            followers: Some(10),
            videos: views
                .iter()
                .enumerate()
                .map(|(i, v)| VideoRecord::listing(format!("https://x/video/{i}"), i.to_string(), Some(*v)))
                .collect(),
            debug: DebugTrace::default(),
        }
    }

    #[test]
    fn snapshot_table_is_capped_at_top() {
        let text = render_snapshot(&snapshot("maker", &[5, 50, 500]), 2);
        assert!(text.starts_with("@maker  followers 10\n"));
        assert!(text.contains("max views 500"));
        let rows: Vec<_> = text.lines().skip_while(|l| !l.starts_with("VIDEO")).skip(1).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with('2'));
    }

    #[test]
    fn empty_snapshot_shows_hints() {
        let mut snap = snapshot("maker", &[]);
        snap.debug.hint("No videos found");
        let text = render_snapshot(&snap, 10);
        assert!(text.contains("hint: No videos found"));
        assert!(!text.contains("VIDEO"));
    }

    #[test]
    fn comparison_names_winners() {
        let comparison = compare_profiles(&snapshot("old", &[10, 20]), &snapshot("new", &[30, 40]));
        let text = render_comparison(&comparison);
        assert!(text.contains("avg views B"));
        assert!(text.contains("engagement tie"));
        assert!(text.contains("hint: "));
    }

    #[test]
    fn missing_counts_render_as_dash() {
        let detail = VideoDetail::new("https://x/video/1", Some(100), None, None);
        assert_eq!(
            render_video(&detail),
            format!("views 100  likes {MISSING}  comments {MISSING}  engagement {MISSING}\n")
        );
    }
}
