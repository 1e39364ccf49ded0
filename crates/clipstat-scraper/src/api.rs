//! Response-producing entry points for the UI collaborator.
//!
//! Nothing here returns `Err` or unwinds: every outcome, including a panic
//! inside an extractor, becomes an [`Envelope`].

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use clipstat_core::{AppConfig, DebugTrace, ProfileSnapshot, VideoDetail, VideoRecord};
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::deep::{panic_message, DeepScanConfig, DeepScanSummary, DeepScanner};
use crate::error::{ExtractError, ExtractFailure};
use crate::host::{PageHost, TabDriver};
use crate::profile::{scan_profile, ScanOptions, ScrollTiming};
use crate::retry::RetryPolicy;
use crate::video::extract_video_detail;

/// Shown when a deep scan was requested without entitlement.
pub const PRO_NOTE: &str = "Deep Scan is Pro (likes/comments). Upgrade to unlock full stats.";

/// `{ ok: true, data }` or `{ ok: false, error, message, debug }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Machine-readable code, see [`ExtractError::code`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Short human-readable explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugTrace>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
            message: None,
            debug: None,
        }
    }

    #[must_use]
    pub fn failure(failure: ExtractFailure) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(failure.error.code().to_string()),
            message: Some(failure.error.to_string()),
            debug: Some(failure.debug),
        }
    }

    fn from_result(result: Result<T, ExtractFailure>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(failure) => Self::failure(failure),
        }
    }
}

/// Payload of a successful `scan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanData {
    #[serde(flatten)]
    pub snapshot: ProfileSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_summary: Option<DeepScanSummary>,
}

/// Timing knobs for the entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub scroll: ScrollTiming,
    pub deep: DeepScanConfig,
    /// Delay before re-scanning a profile that came back empty.
    pub empty_retry_delay: Duration,
}

impl EngineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            scroll: ScrollTiming::from_config(config),
            deep: DeepScanConfig::from_app_config(config),
            empty_retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// No waiting anywhere. For tests and offline snapshots.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            scroll: ScrollTiming::immediate(),
            deep: DeepScanConfig {
                tab_load_timeout: Duration::ZERO,
                poll_interval: Duration::ZERO,
                retry_delay: Duration::ZERO,
            },
            empty_retry_delay: Duration::ZERO,
        }
    }
}

/// Runs `future`, turning a panic into [`ExtractError::ExtractorException`].
async fn guarded<T, F>(future: F) -> Result<T, ExtractFailure>
where
    F: Future<Output = Result<T, ExtractFailure>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(message = %message, "extractor panicked");
            let mut debug = DebugTrace::default();
            debug.error = Some(message.clone());
            debug.hint("Extractor threw an exception; see error.");
            Err(ExtractFailure::new(
                ExtractError::ExtractorException(message),
                debug,
            ))
        }
    }
}

/// Scans the profile open in `host`.
///
/// An empty first result is retried once after a delay (lazy grids often
/// render late). Deep scan runs only when requested *and* `pro`; otherwise
/// likes and comments are stripped from every record.
pub async fn scan(
    host: &dyn PageHost,
    tabs: &dyn TabDriver,
    options: &ScanOptions,
    deep_limit: usize,
    pro: bool,
    settings: &EngineSettings,
) -> Envelope<ScanData> {
    let deep = options.deep && pro;

    let result = guarded(async {
        let mut snapshot = RetryPolicy::once(settings.empty_retry_delay)
            .run(
                "profile scan",
                |_| scan_profile(host, options, settings.scroll),
                |result| matches!(result, Ok(s) if s.videos.is_empty()),
            )
            .await?;

        let mut deep_summary = None;
        if deep {
            let videos = std::mem::take(&mut snapshot.videos);
            let (videos, summary) = DeepScanner::new(tabs, settings.deep)
                .run(videos, deep_limit)
                .await;
            snapshot.videos = videos;
            deep_summary = Some(summary);
        } else {
            for video in &mut snapshot.videos {
                video.likes = None;
                video.comments = None;
            }
        }

        let pro_note = (options.deep && !pro).then(|| PRO_NOTE.to_string());
        Ok::<_, ExtractFailure>(ScanData {
            snapshot,
            pro_note,
            deep_summary,
        })
    })
    .await;

    if let Err(failure) = &result {
        tracing::warn!(error = failure.error.code(), "profile scan failed");
    }
    Envelope::from_result(result)
}

/// Enriches `videos` with likes/comments; see [`DeepScanner::run`].
///
/// A panic mid-scan returns the input unchanged.
pub async fn deep_scan(
    tabs: &dyn TabDriver,
    videos: Vec<VideoRecord>,
    limit: usize,
    settings: &EngineSettings,
) -> Vec<VideoRecord> {
    let fallback = videos.clone();
    let result = guarded(async {
        let (videos, _) = DeepScanner::new(tabs, settings.deep).run(videos, limit).await;
        Ok::<_, ExtractFailure>(videos)
    })
    .await;
    result.unwrap_or(fallback)
}

/// Reads the video page open in `host`.
pub async fn video_detail(host: &dyn PageHost) -> Envelope<VideoDetail> {
    let result = guarded(async {
        let page = host.document().await.map_err(|e| {
            ExtractFailure::new(
                ExtractError::ExtractorException(e.to_string()),
                DebugTrace::default(),
            )
        })?;
        extract_video_detail(&page).map(|traced| traced.value)
    })
    .await;
    Envelope::from_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_envelope_carries_code_and_message() {
        let env: Envelope<()> = Envelope::failure(ExtractFailure::new(
            ExtractError::LoginRequired,
            DebugTrace::default(),
        ));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["error"], json!("LoginRequired"));
        assert!(value["message"].as_str().unwrap().contains("login"));
        assert!(value.get("data").is_none());
        assert_eq!(value["debug"]["error"], json!("LoginRequired"));
    }

    #[test]
    fn success_envelope_omits_error_fields() {
        let value = serde_json::to_value(Envelope::success(5)).unwrap();
        assert_eq!(value, json!({"ok": true, "data": 5}));
    }

    #[test]
    fn scan_envelopes_read_back() {
        let snapshot = ProfileSnapshot {
            profile_handle: "maker".to_string(),
            followers: Some(7),
            videos: vec![VideoRecord::listing("https://www.tiktok.com/@maker/video/1", "1", Some(3))],
            debug: DebugTrace::default(),
        };
        let sent = Envelope::success(ScanData {
            snapshot,
            pro_note: Some(PRO_NOTE.to_string()),
            deep_summary: None,
        });
        let text = serde_json::to_string(&sent).unwrap();
        let read: Envelope<ScanData> = serde_json::from_str(&text).unwrap();
        assert_eq!(read, sent);

        let failed: Envelope<ScanData> =
            serde_json::from_str(r#"{"ok": false, "error": "NotReady"}"#).unwrap();
        assert!(failed.data.is_none());
        assert_eq!(failed.error.as_deref(), Some("NotReady"));
    }

    fn explode() -> Result<(), ExtractFailure> {
        panic!("state tree exploded")
    }

    #[tokio::test]
    async fn panics_become_extractor_exceptions() {
        let result = guarded(async { explode() }).await;
        let failure = result.unwrap_err();
        assert_eq!(failure.error.code(), "ExtractorException");
        assert_eq!(failure.debug.error.as_deref(), Some("state tree exploded"));
    }
}
