//! Side-by-side comparison of two profile snapshots.

use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::records::ProfileSnapshot;

/// Below this many videos on either side the comparison is flagged as thin.
const MIN_FAIR_SAMPLE: usize = 8;

/// Coverage percentage at or above which engagement averages are trusted.
const GOOD_COVERAGE_PCT: f64 = 30.0;
const WARN_COVERAGE_PCT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoverageTier {
    Good,
    Warn,
    Bad,
}

impl CoverageTier {
    #[must_use]
    pub fn from_pct(pct: Option<f64>) -> Self {
        match pct {
            Some(p) if p.is_finite() && p >= GOOD_COVERAGE_PCT => CoverageTier::Good,
            Some(p) if p.is_finite() && p >= WARN_COVERAGE_PCT => CoverageTier::Warn,
            _ => CoverageTier::Bad,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub handle: String,
    pub followers: Option<u64>,
    pub total: usize,
    pub avg_views: Option<u64>,
    pub max_views: Option<u64>,
    pub avg_engagement_pct: Option<f64>,
    pub engagement_coverage_pct: Option<f64>,
    pub coverage_tier: CoverageTier,
}

impl ProfileSummary {
    #[must_use]
    pub fn of(snapshot: &ProfileSnapshot) -> Self {
        let stats = aggregate(&snapshot.videos);
        let coverage = stats.engagement_coverage_pct();
        Self {
            handle: snapshot.profile_handle.clone(),
            followers: snapshot.followers,
            total: stats.total,
            avg_views: stats.avg_views,
            max_views: stats.max_views,
            avg_engagement_pct: stats.avg_engagement.map(|e| e * 100.0),
            engagement_coverage_pct: coverage,
            coverage_tier: CoverageTier::from_pct(coverage),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub a: ProfileSummary,
    pub b: ProfileSummary,
    pub avg_views_winner: Option<Side>,
    pub max_views_winner: Option<Side>,
    pub engagement_winner: Option<Side>,
    pub hints: Vec<String>,
}

fn winner<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Option<Side> {
    let (a, b) = (a?, b?);
    if a > b {
        Some(Side::A)
    } else if b > a {
        Some(Side::B)
    } else {
        None
    }
}

/// Compares snapshot `a` (saved earlier) against `b` (current).
#[must_use]
pub fn compare_profiles(a: &ProfileSnapshot, b: &ProfileSnapshot) -> Comparison {
    let a = ProfileSummary::of(a);
    let b = ProfileSummary::of(b);

    let mut hints = Vec::new();
    if a.total.min(b.total) < MIN_FAIR_SAMPLE {
        hints.push("Scroll each profile, then deep scan again for a fair comparison.".to_string());
    }
    let cov_a = a.engagement_coverage_pct.unwrap_or(0.0);
    let cov_b = b.engagement_coverage_pct.unwrap_or(0.0);
    if cov_a < GOOD_COVERAGE_PCT || cov_b < GOOD_COVERAGE_PCT {
        hints.push(
            "Low engagement coverage: average engagement may be unreliable until more videos are deep scanned."
                .to_string(),
        );
    }

    Comparison {
        avg_views_winner: winner(a.avg_views, b.avg_views),
        max_views_winner: winner(a.max_views, b.max_views),
        engagement_winner: winner(a.avg_engagement_pct, b.avg_engagement_pct),
        a,
        b,
        hints,
    }
}
