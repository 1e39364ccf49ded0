//! Profile page scan: video list with views, plus the follower count.
//!
//! Views come from two independent sources, the state blob (via graph
//! search per video id) and the visible tiles. Tile values win whenever both
//! exist; state fills the gaps.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use clipstat_core::{order_by_views, AppConfig, DebugTrace, ProfileSnapshot, VideoRecord};
use serde::{Deserialize, Serialize};

use crate::count::{count_from_value, CountScale};
use crate::dom::tile_views;
use crate::error::{ExtractError, ExtractFailure};
use crate::followers::extract_followers;
use crate::graph::{find_video_node, value_at, LISTING_NODE_BUDGET};
use crate::host::PageHost;
use crate::page::{AnchorTile, PageSnapshot};
use crate::state::{item_module, StateProbe};
use crate::stats::project_stats;
use crate::video::video_id_from_url;

/// Most videos a single scan returns.
pub const MAX_SCAN_VIDEOS: usize = 80;
pub const DEFAULT_SCROLL_PASSES: u32 = 6;
pub const MAX_SCROLL_PASSES: u32 = 20;
/// Smallest scroll step, for very short viewports.
const MIN_SCROLL_STEP: u32 = 600;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanOptions {
    pub deep: bool,
    pub auto_scroll: bool,
    /// Zero means [`DEFAULT_SCROLL_PASSES`].
    pub scroll_passes: u32,
    /// Stop scrolling once this many videos are visible. Zero disables.
    pub target_count: usize,
}

impl ScanOptions {
    /// Pass budget after defaulting and clamping.
    #[must_use]
    pub fn effective_scroll_passes(&self) -> u32 {
        if self.scroll_passes == 0 {
            DEFAULT_SCROLL_PASSES
        } else {
            self.scroll_passes.min(MAX_SCROLL_PASSES)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollTiming {
    /// Wait after each scroll for lazy tiles to render.
    pub settle: Duration,
    /// Wait after the last pass.
    pub final_settle: Duration,
}

impl ScrollTiming {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.scroll_settle_ms),
            final_settle: Duration::from_millis(500),
        }
    }

    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            final_settle: Duration::ZERO,
        }
    }
}

/// Handle from the first path segment, when it starts with `@`.
#[must_use]
pub fn profile_handle(page: &PageSnapshot) -> Option<String> {
    let first = page.path().split('/').find(|s| !s.is_empty())?;
    let handle = first.strip_prefix('@')?;
    (!handle.is_empty()).then(|| handle.to_string())
}

/// A video anchor belonging to the scanned profile.
#[derive(Debug, Clone)]
pub struct VideoTile<'a> {
    pub url: String,
    pub video_id: String,
    pub anchor: &'a AnchorTile,
}

/// Every anchor linking to one of `handle`'s videos, in document order.
///
/// Links to other profiles' videos (recommendation rails, duets) are
/// dropped so their ids cannot leak into this profile's list.
pub fn video_tiles<'a>(page: &'a PageSnapshot, handle: &str) -> Vec<VideoTile<'a>> {
    let own_prefix = format!("/@{handle}/video/");
    page.anchors()
        .iter()
        .filter_map(|anchor| {
            let url = page.absolute_url(&anchor.href)?;
            if !url.contains(&own_prefix) {
                return None;
            }
            let video_id = video_id_from_url(&url)?;
            Some(VideoTile {
                url,
                video_id,
                anchor,
            })
        })
        .collect()
}

/// [`video_tiles`] deduplicated by video id, first occurrence kept.
pub fn unique_video_tiles<'a>(page: &'a PageSnapshot, handle: &str) -> Vec<VideoTile<'a>> {
    let mut seen = HashSet::new();
    video_tiles(page, handle)
        .into_iter()
        .filter(|tile| seen.insert(tile.video_id.clone()))
        .collect()
}

/// Scrolls the profile grid to trigger lazy loading.
///
/// Returns the number of passes run and the most videos seen at once.
///
/// # Errors
///
/// Propagates host failures from scrolling or re-reading the document.
pub async fn auto_scroll(
    host: &dyn PageHost,
    handle: &str,
    options: &ScanOptions,
    timing: ScrollTiming,
) -> Result<(u32, usize), crate::error::HostError> {
    let passes = options.effective_scroll_passes();
    let mut best = 0usize;
    let mut ran = 0u32;

    for _ in 0..passes {
        let viewport = host.viewport_height().await;
        let step = (viewport / 10 * 9).max(MIN_SCROLL_STEP);
        host.scroll_by(step).await?;
        ran += 1;
        sleep(timing.settle).await;

        let page = host.document().await?;
        best = best.max(unique_video_tiles(&page, handle).len());
        if options.target_count > 0 && best >= options.target_count {
            break;
        }
    }

    sleep(timing.final_settle).await;
    tracing::debug!(handle, passes = ran, videos = best, "auto-scroll finished");
    Ok((ran, best))
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn state_views(state: &serde_json::Value, ids: &[&str]) -> (HashMap<String, u64>, DebugTrace) {
    let mut trace = DebugTrace::default();
    let mut views = HashMap::new();
    for id in ids {
        let outcome = find_video_node(state, id, LISTING_NODE_BUDGET);
        trace.match_counts.absorb(outcome.counts);
        let Some(best) = outcome.best else {
            continue;
        };
        trace.found_video_node = true;
        if let Some(v) = project_stats(best.node, CountScale::Listing).views {
            trace.found_stats_like = true;
            views.insert((*id).to_string(), v);
        }
    }
    (views, trace)
}

fn dom_views(tiles: &[VideoTile<'_>]) -> HashMap<String, u64> {
    let mut views = HashMap::new();
    for tile in tiles {
        // First anchor with a readable count wins for a repeated id.
        if views.contains_key(&tile.video_id) {
            continue;
        }
        if let Some((v, _source)) = tile_views(tile.anchor) {
            views.insert(tile.video_id.clone(), v);
        }
    }
    views
}

/// Records built from a state `ItemModule` when the grid has no anchors.
fn item_module_videos(probe: &StateProbe, page: &PageSnapshot, handle: &str) -> Vec<VideoRecord> {
    for (schema, data) in probe.iter() {
        let Some(module) = item_module(schema, data) else {
            continue;
        };
        let videos: Vec<VideoRecord> = module
            .iter()
            .filter_map(|(id, item)| {
                let url = page.absolute_url(&format!("/@{handle}/video/{id}"))?;
                let views = [&["stats", "playCount"][..], &["stats", "viewCount"][..]]
                    .into_iter()
                    .filter_map(|path| value_at(item, path))
                    .find(|v| !v.is_null())
                    .and_then(|v| count_from_value(v, CountScale::Listing));
                Some(VideoRecord::listing(url, id.clone(), views))
            })
            .collect();
        if !videos.is_empty() {
            tracing::debug!(%schema, count = videos.len(), "videos taken from item module");
            return videos;
        }
    }
    Vec::new()
}

/// Extracts a profile snapshot from an already-scrolled page.
///
/// # Errors
///
/// [`ExtractError::NotReady`] when the URL is not a profile URL.
pub fn extract_profile(
    page: &PageSnapshot,
    options: &ScanOptions,
) -> Result<ProfileSnapshot, ExtractFailure> {
    let mut debug = DebugTrace::for_url(page.url().as_str());
    debug.auto_scroll = options.auto_scroll;
    debug.target_count = options.target_count;

    let Some(handle) = profile_handle(page) else {
        return Err(ExtractFailure::new(
            ExtractError::not_ready("open a profile URL like https://www.tiktok.com/@handle"),
            debug,
        ));
    };

    let probe = StateProbe::read(page);
    probe.record(&mut debug);

    let tiles = unique_video_tiles(page, &handle);
    let mut videos: Vec<VideoRecord> = tiles
        .iter()
        .map(|t| VideoRecord::listing(t.url.clone(), t.video_id.clone(), None))
        .collect();

    if videos.is_empty() {
        videos = item_module_videos(&probe, page, &handle);
        if !videos.is_empty() {
            debug.hint("No video tiles on the page; list built from embedded state.");
            debug.views_from_state = videos.iter().filter(|v| v.views.is_some()).count();
            debug.views_attached = debug.views_from_state;
        }
    } else {
        let ids: Vec<&str> = videos.iter().map(|v| v.video_id.as_str()).collect();
        let (from_state, state_trace) = match probe.primary() {
            Some((_, state)) => state_views(state, &ids),
            None => (HashMap::new(), DebugTrace::default()),
        };
        debug.match_counts.absorb(state_trace.match_counts);
        debug.found_video_node = state_trace.found_video_node;
        debug.found_stats_like = state_trace.found_stats_like;

        // Tile text is what the viewer sees, so it outranks state.
        let all_tiles = video_tiles(page, &handle);
        let from_dom = dom_views(&all_tiles);
        for video in &mut videos {
            if let Some(v) = from_dom.get(&video.video_id) {
                video.views = Some(*v);
                debug.views_from_dom += 1;
            } else if let Some(v) = from_state.get(&video.video_id) {
                video.views = Some(*v);
                debug.views_from_state += 1;
            }
        }
        debug.views_attached = debug.views_from_dom + debug.views_from_state;
    }

    debug.videos_found = videos.len();
    if videos.is_empty() {
        debug.hint("No videos found; scroll the grid into view or enable auto-scroll.");
    }
    if probe.primary().is_none() {
        debug.hint("No embedded state found; views come from tiles only.");
    }

    let followers = extract_followers(&probe, page).map(|(n, source)| {
        debug.followers_source = Some(source.as_str().to_string());
        n
    });

    let mut videos = order_by_views(videos);
    videos.truncate(MAX_SCAN_VIDEOS);

    let (from_dom, from_state) = (debug.views_from_dom, debug.views_from_state);
    tracing::info!(
        handle = %handle,
        videos = videos.len(),
        from_dom,
        from_state,
        followers,
        "profile extracted"
    );

    Ok(ProfileSnapshot {
        profile_handle: handle,
        followers,
        videos,
        debug,
    })
}

/// Full profile scan: optional auto-scroll, then extraction.
///
/// # Errors
///
/// [`ExtractError::NotReady`] for non-profile pages and
/// [`ExtractError::ExtractorException`] when the host fails.
pub async fn scan_profile(
    host: &dyn PageHost,
    options: &ScanOptions,
    timing: ScrollTiming,
) -> Result<ProfileSnapshot, ExtractFailure> {
    let host_failure = |e: crate::error::HostError| {
        ExtractFailure::new(
            ExtractError::ExtractorException(e.to_string()),
            DebugTrace::default(),
        )
    };

    let mut page = host.document().await.map_err(host_failure)?;
    let mut scroll_passes = 0;

    if options.auto_scroll {
        let Some(handle) = profile_handle(&page) else {
            return extract_profile(&page, options);
        };
        let (ran, _) = auto_scroll(host, &handle, options, timing)
            .await
            .map_err(host_failure)?;
        scroll_passes = ran;
        page = host.document().await.map_err(host_failure)?;
    }

    let mut snapshot = extract_profile(&page, options)?;
    snapshot.debug.scroll_passes = scroll_passes;
    Ok(snapshot)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
