//! Deep scan: opens each video in a background tab to recover likes and
//! comments the profile grid does not show.
//!
//! Videos are processed strictly one at a time, so at most one extra tab is
//! open at any instant. A tab is removed on every path out of the per-video
//! routine, including extractor panics.
//!
//! There is no abort signal: dropping the future mid-scan can leave the tab
//! being processed open.

mod fetch;

pub use fetch::FetchTabDriver;

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use clipstat_core::{AppConfig, DebugTrace, VideoDetail, VideoRecord};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::{ExtractError, ExtractFailure, Traced};
use crate::host::{ExecutionWorld, TabDriver, TabId, TabStatus};
use crate::page::PageSnapshot;
use crate::retry::RetryPolicy;
use crate::video::extract_video_detail;

pub const MIN_DEEP_LIMIT: usize = 1;
pub const MAX_DEEP_LIMIT: usize = 20;
pub const DEFAULT_DEEP_LIMIT: usize = 12;

/// Clamps a requested per-scan limit into `1..=20`.
#[must_use]
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(MIN_DEEP_LIMIT, MAX_DEEP_LIMIT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepScanConfig {
    pub tab_load_timeout: Duration,
    pub poll_interval: Duration,
    /// Delay before the second injection round and before the second pass.
    pub retry_delay: Duration,
}

impl DeepScanConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            tab_load_timeout: Duration::from_millis(config.tab_load_timeout_ms),
            poll_interval: Duration::from_millis(config.tab_poll_interval_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

impl Default for DeepScanConfig {
    fn default() -> Self {
        Self {
            tab_load_timeout: Duration::from_millis(15_000),
            poll_interval: Duration::from_millis(150),
            retry_delay: Duration::from_millis(900),
        }
    }
}

/// Outcome counts of one deep scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepScanSummary {
    /// Records inside the limit window that were attempted.
    pub attempted: usize,
    pub enriched: usize,
    pub failed: usize,
    /// Attempts answered from the per-scan URL cache.
    pub reused: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedCounts {
    views: Option<u64>,
    likes: Option<u64>,
    comments: Option<u64>,
}

impl CachedCounts {
    fn merge_into(self, video: &mut VideoRecord) {
        if video.views.is_none() {
            video.views = self.views;
        }
        video.likes = self.likes;
        video.comments = self.comments;
    }
}

/// Sequential deep-scan coordinator over a [`TabDriver`].
///
/// The URL cache lives exactly as long as one `DeepScanner`; create one per
/// scan.
pub struct DeepScanner<'a> {
    driver: &'a dyn TabDriver,
    config: DeepScanConfig,
    cache: HashMap<String, CachedCounts>,
}

impl<'a> DeepScanner<'a> {
    #[must_use]
    pub fn new(driver: &'a dyn TabDriver, config: DeepScanConfig) -> Self {
        Self {
            driver,
            config,
            cache: HashMap::new(),
        }
    }

    /// Enriches the first `limit` records (clamped) that have a URL.
    ///
    /// Records past the window, and records without a URL, pass through
    /// untouched and in place. A failed video keeps its original record.
    pub async fn run(
        &mut self,
        videos: Vec<VideoRecord>,
        limit: usize,
    ) -> (Vec<VideoRecord>, DeepScanSummary) {
        let limit = clamp_limit(limit);
        let mut summary = DeepScanSummary::default();
        let mut out = Vec::with_capacity(videos.len());

        for mut video in videos {
            if video.url.is_empty() || summary.attempted >= limit {
                out.push(video);
                continue;
            }
            summary.attempted += 1;

            if let Some(cached) = self.cache.get(&video.url) {
                cached.merge_into(&mut video);
                summary.reused += 1;
                summary.enriched += 1;
                out.push(video);
                continue;
            }

            match self.detail_for(&video.url).await {
                Ok(traced) => {
                    let counts = CachedCounts {
                        views: traced.value.views,
                        likes: traced.value.likes,
                        comments: traced.value.comments,
                    };
                    self.cache.insert(video.url.clone(), counts);
                    counts.merge_into(&mut video);
                    summary.enriched += 1;
                }
                Err(failure) => {
                    tracing::warn!(
                        url = %video.url,
                        error = failure.error.code(),
                        hints = ?failure.debug.hints,
                        "deep scan got no usable result; keeping listing record"
                    );
                    summary.failed += 1;
                }
            }
            out.push(video);
        }

        tracing::info!(
            attempted = summary.attempted,
            enriched = summary.enriched,
            failed = summary.failed,
            reused = summary.reused,
            "deep scan finished"
        );
        (out, summary)
    }

    /// One video, with a second full pass unless the first hit a login wall.
    ///
    /// # Errors
    ///
    /// The last pass's failure.
    pub async fn detail_for(&self, url: &str) -> Result<Traced<VideoDetail>, ExtractFailure> {
        RetryPolicy::once(self.config.retry_delay)
            .run(
                "deep-scan pass",
                |_| self.single_pass(url),
                |result| matches!(result, Err(f) if f.error != ExtractError::LoginRequired),
            )
            .await
    }

    async fn single_pass(&self, url: &str) -> Result<Traced<VideoDetail>, ExtractFailure> {
        let tab = self.driver.create_tab(url).await.map_err(|e| {
            ExtractFailure::new(
                ExtractError::ExtractorException(e.to_string()),
                DebugTrace::for_url(url),
            )
        })?;

        let result = self.extract_in_tab(tab, url).await;

        if let Err(e) = self.driver.remove(tab).await {
            tracing::warn!(tab, error = %e, "failed to remove deep-scan tab");
        }
        result
    }

    async fn extract_in_tab(&self, tab: TabId, url: &str) -> Result<Traced<VideoDetail>, ExtractFailure> {
        if !self.wait_for_complete(tab).await {
            // Not fatal: a slow page often has its state blob already.
            tracing::debug!(tab, url, "tab did not report complete before timeout");
        }

        let Some(page) = self.inject(tab).await else {
            let mut debug = DebugTrace::for_url(url);
            debug.hint("Injection returned no result in either world.");
            return Err(ExtractFailure::new(
                ExtractError::ExtractorException("injection returned no result".to_string()),
                debug,
            ));
        };

        catch_unwind(AssertUnwindSafe(|| extract_video_detail(&page))).unwrap_or_else(|panic| {
            let message = panic_message(panic.as_ref());
            tracing::warn!(url, message = %message, "video extractor panicked");
            let mut debug = DebugTrace::for_url(url);
            debug.hint("Extractor panicked; see error.");
            debug.error = Some(message.clone());
            Err(ExtractFailure::new(
                ExtractError::ExtractorException(message),
                debug,
            ))
        })
    }

    /// Polls until the tab reports complete; `false` on timeout or a gone tab.
    async fn wait_for_complete(&self, tab: TabId) -> bool {
        let deadline = Instant::now() + self.config.tab_load_timeout;
        loop {
            match self.driver.status(tab).await {
                Ok(TabStatus::Complete) => return true,
                Ok(TabStatus::Loading) => {}
                Err(e) => {
                    tracing::debug!(tab, error = %e, "tab status unavailable");
                    return false;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Isolated world first, then page-native; the pair is retried once.
    async fn inject(&self, tab: TabId) -> Option<PageSnapshot> {
        RetryPolicy::once(self.config.retry_delay)
            .run(
                "injection",
                |attempt| async move {
                    for world in ExecutionWorld::FALLBACK_ORDER {
                        if let Some(page) = self.driver.inject(tab, world).await {
                            tracing::debug!(tab, %world, attempt, "injection succeeded");
                            return Some(page);
                        }
                    }
                    None
                },
                Option::is_none,
            )
            .await
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "extractor panicked".to_string())
}

/// Convenience wrapper: one [`DeepScanner`] for one list.
pub async fn deep_scan(
    driver: &dyn TabDriver,
    videos: Vec<VideoRecord>,
    limit: usize,
    config: DeepScanConfig,
) -> (Vec<VideoRecord>, DeepScanSummary) {
    DeepScanner::new(driver, config).run(videos, limit).await
}

#[cfg(test)]
#[path = "deep_test.rs"]
mod tests;
