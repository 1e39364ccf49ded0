//! Likes/comments for a single video page.

use std::sync::LazyLock;

use clipstat_core::{DebugTrace, VideoDetail};
use regex::Regex;

use crate::count::CountScale;
use crate::error::{ExtractError, ExtractFailure, Traced};
use crate::graph::{find_video_node, DETAIL_NODE_BUDGET};
use crate::page::PageSnapshot;
use crate::state::StateProbe;
use crate::stats::project_stats;

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/video/(\d+)").expect("valid regex"));
static VIEWS_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)views").expect("valid regex"));

/// Numeric video id from a URL or path containing `/video/<digits>`.
#[must_use]
pub fn video_id_from_url(url: &str) -> Option<String> {
    VIDEO_ID_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// `true` when the page is an authentication wall rather than content.
#[must_use]
pub fn is_login_wall(page: &PageSnapshot) -> bool {
    page.path().contains("/login")
}

/// Extracts view/like/comment counts from a rendered video page.
///
/// A login wall fails immediately without touching the state blob.
///
/// # Errors
///
/// [`ExtractError::LoginRequired`], [`ExtractError::NotReady`] when the URL
/// has no video id, [`ExtractError::NoStateFound`], or
/// [`ExtractError::NoStatsFound`]. The failure carries the trace so far.
pub fn extract_video_detail(page: &PageSnapshot) -> Result<Traced<VideoDetail>, ExtractFailure> {
    let url = page.url().to_string();
    let mut debug = DebugTrace::for_url(&url);

    if is_login_wall(page) {
        debug.hint("Redirected to a login page.");
        return Err(ExtractFailure::new(ExtractError::LoginRequired, debug));
    }

    let Some(video_id) = video_id_from_url(page.path()) else {
        return Err(ExtractFailure::new(
            ExtractError::not_ready("no video id in URL"),
            debug,
        ));
    };

    let probe = StateProbe::read(page);
    probe.record(&mut debug);
    let Some((schema, state)) = probe.primary() else {
        debug.hint("No embedded state scripts found.");
        return Err(ExtractFailure::new(ExtractError::NoStateFound, debug));
    };

    let outcome = find_video_node(state, &video_id, DETAIL_NODE_BUDGET);
    debug.match_counts.absorb(outcome.counts);
    debug.found_video_node = outcome.best.is_some();

    if let Some(best) = outcome.best {
        let stats = project_stats(best.node, CountScale::Detail);
        debug.found_stats_like = stats.has_any();
        tracing::debug!(
            %schema,
            video_id = %video_id,
            score = best.score,
            shape = ?stats.shape,
            "video node located"
        );
        if stats.has_any() {
            let detail = VideoDetail::new(url, stats.views, stats.likes, stats.comments);
            return Ok(Traced {
                value: detail,
                debug,
            });
        }
    }

    debug.dom_views_text = page
        .text_blocks()
        .iter()
        .find(|t| VIEWS_WORD_RE.is_match(t))
        .cloned();
    debug.hint("Embedded state found but stats were not extracted.");
    Err(ExtractFailure::new(ExtractError::NoStatsFound, debug))
}
