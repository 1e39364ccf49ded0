//! Records produced by a profile scan and a video-detail extraction.
//!
//! Everything here serialises with camelCase field names because the UI
//! collaborator consumes these shapes verbatim.

use serde::{Deserialize, Serialize};

/// Version tag stamped into every [`DebugTrace`].
pub const ENGINE_VERSION: &str = concat!("clipstat-engine-", env!("CARGO_PKG_VERSION"));

/// Which embedded state blob a page carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateSchema {
    /// `__UNIVERSAL_DATA_FOR_REHYDRATION__` (checked first).
    Universal,
    /// `SIGI_STATE` (legacy layout, checked second).
    Sigi,
}

impl StateSchema {
    /// Priority order in which schemas are probed.
    pub const PRIORITY: [StateSchema; 2] = [StateSchema::Universal, StateSchema::Sigi];

    /// Element id of the `<script>` carrying this schema.
    #[must_use]
    pub fn script_id(self) -> &'static str {
        match self {
            StateSchema::Universal => "__UNIVERSAL_DATA_FOR_REHYDRATION__",
            StateSchema::Sigi => "SIGI_STATE",
        }
    }
}

impl std::fmt::Display for StateSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateSchema::Universal => write!(f, "universal"),
            StateSchema::Sigi => write!(f, "sigi"),
        }
    }
}

/// One video discovered on a profile.
///
/// Identity is `video_id`; a scan never emits two records with the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub url: String,
    pub video_id: String,
    pub views: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub comments: Option<u64>,
}

impl VideoRecord {
    /// A views-only record as emitted by the profile listing.
    #[must_use]
    pub fn listing(url: impl Into<String>, video_id: impl Into<String>, views: Option<u64>) -> Self {
        Self {
            url: url.into(),
            video_id: video_id.into(),
            views,
            likes: None,
            comments: None,
        }
    }
}

/// Stats recovered from a single video page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub url: String,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    /// `(likes + comments) / views`; `None` unless views > 0.
    pub engagement: Option<f64>,
}

impl VideoDetail {
    /// Builds a detail record and derives its engagement ratio.
    ///
    /// Missing likes or comments count as zero here; the aggregate view in
    /// [`crate::aggregate`] is stricter.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        views: Option<u64>,
        likes: Option<u64>,
        comments: Option<u64>,
    ) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let engagement = views.filter(|v| *v > 0).map(|v| {
            let interactions = likes.unwrap_or(0).saturating_add(comments.unwrap_or(0));
            interactions as f64 / v as f64
        });
        Self {
            url: url.into(),
            views,
            likes,
            comments,
            engagement,
        }
    }

    /// `true` when at least one count was recovered.
    #[must_use]
    pub fn has_any_count(&self) -> bool {
        self.views.is_some() || self.likes.is_some() || self.comments.is_some()
    }
}

/// Graph search counters, summed over every search a scan performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCounts {
    pub key_match: usize,
    pub id_match: usize,
    pub scanned_nodes: usize,
}

impl MatchCounts {
    pub fn absorb(&mut self, other: MatchCounts) {
        self.key_match += other.key_match;
        self.id_match += other.id_match;
        self.scanned_nodes += other.scanned_nodes;
    }
}

/// Diagnostic record carried alongside every extraction result.
///
/// Reporting only: nothing in the engine branches on these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugTrace {
    pub engine_version: String,
    pub url: Option<String>,
    pub schema: Option<StateSchema>,
    pub has_universal: bool,
    pub has_sigi: bool,
    pub has_item_module: bool,
    pub found_video_node: bool,
    pub found_stats_like: bool,
    pub match_counts: MatchCounts,
    pub target_count: usize,
    pub auto_scroll: bool,
    pub scroll_passes: u32,
    pub videos_found: usize,
    pub views_attached: usize,
    pub views_from_dom: usize,
    pub views_from_state: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_views_text: Option<String>,
    pub hints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for DebugTrace {
    fn default() -> Self {
        Self {
            engine_version: ENGINE_VERSION.to_string(),
            url: None,
            schema: None,
            has_universal: false,
            has_sigi: false,
            has_item_module: false,
            found_video_node: false,
            found_stats_like: false,
            match_counts: MatchCounts::default(),
            target_count: 0,
            auto_scroll: false,
            scroll_passes: 0,
            videos_found: 0,
            views_attached: 0,
            views_from_dom: 0,
            views_from_state: 0,
            followers_source: None,
            dom_views_text: None,
            hints: Vec::new(),
            error: None,
        }
    }
}

impl DebugTrace {
    #[must_use]
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn hint(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }
}

/// Result of one profile scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub profile_handle: String,
    pub followers: Option<u64>,
    pub videos: Vec<VideoRecord>,
    pub debug: DebugTrace,
}
