//! Profile-level summary statistics.
//!
//! Derived on demand from a [`VideoRecord`] list and never stored. Every
//! division guards its denominator, so empty input yields `None` rather than
//! NaN.

use serde::{Deserialize, Serialize};

use crate::records::VideoRecord;

/// Summary of a scanned video list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total: usize,
    /// Mean of known view counts, rounded to the nearest whole view.
    pub avg_views: Option<u64>,
    pub max_views: Option<u64>,
    /// Mean of per-video engagement ratios where engagement is known.
    pub avg_engagement: Option<f64>,
    /// Number of videos whose engagement could be computed.
    pub engagement_known: usize,
    /// `engagement_known / total`, in `0.0..=1.0`.
    pub engagement_coverage_ratio: Option<f64>,
}

impl AggregateStats {
    /// Coverage expressed as a percentage.
    #[must_use]
    pub fn engagement_coverage_pct(&self) -> Option<f64> {
        self.engagement_coverage_ratio.map(|r| r * 100.0)
    }
}

/// Engagement ratio for one video: `(likes + comments) / views`.
///
/// Requires views > 0 and at least one of likes/comments; a missing half
/// counts as zero once the other half is known.
#[must_use]
pub fn engagement_for(video: &VideoRecord) -> Option<f64> {
    let views = video.views.filter(|v| *v > 0)?;
    if video.likes.is_none() && video.comments.is_none() {
        return None;
    }
    let interactions = video
        .likes
        .unwrap_or(0)
        .saturating_add(video.comments.unwrap_or(0));
    #[allow(clippy::cast_precision_loss)]
    let ratio = interactions as f64 / views as f64;
    ratio.is_finite().then_some(ratio)
}

/// Computes [`AggregateStats`] over `videos`.
#[must_use]
pub fn aggregate(videos: &[VideoRecord]) -> AggregateStats {
    let views: Vec<u64> = videos.iter().filter_map(|v| v.views).collect();

    // View counts are far below 2^52, so the f64 sum is exact in practice.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let avg_views = (!views.is_empty()).then(|| {
        let sum: f64 = views.iter().map(|v| *v as f64).sum();
        (sum / views.len() as f64).round() as u64
    });
    let max_views = views.iter().copied().max();

    let engagements: Vec<f64> = videos.iter().filter_map(engagement_for).collect();
    #[allow(clippy::cast_precision_loss)]
    let avg_engagement = (!engagements.is_empty())
        .then(|| engagements.iter().sum::<f64>() / engagements.len() as f64);

    #[allow(clippy::cast_precision_loss)]
    let engagement_coverage_ratio =
        (!videos.is_empty()).then(|| engagements.len() as f64 / videos.len() as f64);

    AggregateStats {
        total: videos.len(),
        avg_views,
        max_views,
        avg_engagement,
        engagement_known: engagements.len(),
        engagement_coverage_ratio,
    }
}

/// Orders records views-known first (descending), then views-unknown in
/// their original order. The sort is stable, so ties keep input order.
#[must_use]
pub fn order_by_views(videos: Vec<VideoRecord>) -> Vec<VideoRecord> {
    let (mut known, unknown): (Vec<_>, Vec<_>) =
        videos.into_iter().partition(|v| v.views.is_some());
    known.sort_by(|a, b| b.views.cmp(&a.views));
    known.extend(unknown);
    known
}

/// The `n` highest-view records, unknown views last.
#[must_use]
pub fn top_by_views(videos: &[VideoRecord], n: usize) -> Vec<VideoRecord> {
    let mut ordered = order_by_views(videos.to_vec());
    ordered.truncate(n);
    ordered
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
