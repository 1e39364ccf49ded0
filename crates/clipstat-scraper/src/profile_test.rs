use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use super::*;
use crate::error::HostError;
use crate::host::StaticPageHost;

const PROFILE_URL: &str = "https://www.tiktok.com/@maker";

fn universal(json: &str) -> String {
    format!(r#"<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__" type="application/json">{json}</script>"#)
}

fn anchor(handle: &str, id: &str, label: &str) -> String {
    format!(r#"<a href="/@{handle}/video/{id}"><div><strong>{label}</strong></div></a>"#)
}

fn page(head: &str, body: &str) -> PageSnapshot {
    PageSnapshot::parse(
        PROFILE_URL,
        &format!("<html><head>{head}</head><body>{body}</body></html>"),
    )
    .unwrap()
}

const THREE_VIDEOS: &str = r#"{"__DEFAULT_SCOPE__":{"ItemModule":{
    "1":{"id":"1","desc":"a","stats":{"playCount":100}},
    "2":{"id":"2","desc":"b","stats":{"playCount":200}},
    "3":{"id":"3","desc":"c","stats":{"playCount":300}}
}}}"#;

#[test]
fn handle_comes_from_first_path_segment() {
    assert_eq!(profile_handle(&page("", "")).as_deref(), Some("maker"));
    let other = PageSnapshot::parse("https://www.tiktok.com/explore", "<html></html>").unwrap();
    assert_eq!(profile_handle(&other), None);
}

#[test]
fn non_profile_page_is_not_ready() {
    let p = PageSnapshot::parse("https://www.tiktok.com/foryou", "<html></html>").unwrap();
    let failure = extract_profile(&p, &ScanOptions::default()).unwrap_err();
    assert_eq!(failure.error.code(), "NotReady");
}

#[test]
fn state_views_sorted_descending_when_tiles_are_blank() {
    let body = ["1", "2", "3"]
        .iter()
        .map(|id| anchor("maker", id, ""))
        .collect::<String>();
    let snapshot = extract_profile(&page(&universal(THREE_VIDEOS), &body), &ScanOptions::default())
        .unwrap();
    let views: Vec<_> = snapshot.videos.iter().map(|v| v.views).collect();
    assert_eq!(views, vec![Some(300), Some(200), Some(100)]);
    assert_eq!(snapshot.debug.views_from_state, 3);
    assert_eq!(snapshot.debug.views_from_dom, 0);
    assert!(snapshot.debug.found_video_node);
}

#[test]
fn item_module_fills_in_when_no_tiles_exist() {
    let snapshot = extract_profile(&page(&universal(THREE_VIDEOS), ""), &ScanOptions::default())
        .unwrap();
    let views: Vec<_> = snapshot.videos.iter().map(|v| v.views).collect();
    assert_eq!(views, vec![Some(300), Some(200), Some(100)]);
    assert_eq!(
        snapshot.videos[0].url,
        "https://www.tiktok.com/@maker/video/3"
    );
    assert!(snapshot.debug.has_item_module);
}

#[test]
fn tile_text_outranks_state() {
    let body = anchor("maker", "1", "9.9K") + &anchor("maker", "2", "");
    let snapshot = extract_profile(&page(&universal(THREE_VIDEOS), &body), &ScanOptions::default())
        .unwrap();
    let one = snapshot.videos.iter().find(|v| v.video_id == "1").unwrap();
    let two = snapshot.videos.iter().find(|v| v.video_id == "2").unwrap();
    assert_eq!(one.views, Some(9_900));
    assert_eq!(two.views, Some(200));
    assert_eq!(snapshot.debug.views_from_dom, 1);
    assert_eq!(snapshot.debug.views_from_state, 1);
    assert_eq!(snapshot.debug.views_attached, 2);
}

#[test]
fn aria_label_with_separators_matches_state() {
    let state = r#"{"__DEFAULT_SCOPE__":{"ItemModule":{"1":{"id":"1","stats":{"playCount":1234}}}}}"#;
    let body = r#"<a href="/@maker/video/1" aria-label="Video, 1,234 views"></a>"#;
    let snapshot = extract_profile(&page(&universal(state), body), &ScanOptions::default())
        .unwrap();
    assert_eq!(snapshot.videos[0].views, Some(1234));
    assert_eq!(snapshot.debug.views_from_dom, 1);
}

#[test]
fn other_profiles_and_duplicates_are_dropped() {
    let body = anchor("maker", "1", "5")
        + &anchor("maker", "1", "6")
        + &anchor("someone_else", "2", "7")
        + r#"<a href="/@maker/photo/3">photo</a>"#;
    let snapshot = extract_profile(&page("", &body), &ScanOptions::default()).unwrap();
    assert_eq!(snapshot.videos.len(), 1);
    assert_eq!(snapshot.videos[0].video_id, "1");
    assert_eq!(snapshot.videos[0].views, Some(5));
}

#[test]
fn unknown_views_go_last_in_original_order() {
    let body = anchor("maker", "10", "")
        + &anchor("maker", "11", "3")
        + &anchor("maker", "12", "")
        + &anchor("maker", "13", "8");
    let snapshot = extract_profile(&page("", &body), &ScanOptions::default()).unwrap();
    let ids: Vec<_> = snapshot.videos.iter().map(|v| v.video_id.as_str()).collect();
    assert_eq!(ids, vec!["13", "11", "10", "12"]);
    assert!(snapshot
        .debug
        .hints
        .iter()
        .any(|h| h.contains("No embedded state")));
}

#[test]
fn result_is_capped() {
    let body: String = (0..100)
        .map(|i| anchor("maker", &format!("{}", 1000 + i), &i.to_string()))
        .collect();
    let snapshot = extract_profile(&page("", &body), &ScanOptions::default()).unwrap();
    assert_eq!(snapshot.videos.len(), MAX_SCAN_VIDEOS);
    assert_eq!(snapshot.videos[0].views, Some(99));
    assert_eq!(snapshot.debug.videos_found, 100);
}

#[test]
fn followers_from_state_then_text() {
    let state = r#"{"__DEFAULT_SCOPE__":{"webapp":{"UserModule":{
        "users":{"maker":{"id":"55"}},"stats":{"55":{"followerCount":4200}}}}}}"#;
    let snapshot = extract_profile(&page(&universal(state), ""), &ScanOptions::default()).unwrap();
    assert_eq!(snapshot.followers, Some(4200));
    assert_eq!(snapshot.debug.followers_source.as_deref(), Some("userModule"));

    let snapshot = extract_profile(&page("", "<h3>1.5M Followers</h3>"), &ScanOptions::default())
        .unwrap();
    assert_eq!(snapshot.followers, Some(1_500_000));
}

#[test]
fn scroll_passes_default_and_clamp() {
    let mut options = ScanOptions::default();
    assert_eq!(options.effective_scroll_passes(), DEFAULT_SCROLL_PASSES);
    options.scroll_passes = 50;
    assert_eq!(options.effective_scroll_passes(), MAX_SCROLL_PASSES);
    options.scroll_passes = 3;
    assert_eq!(options.effective_scroll_passes(), 3);
}

/// Grid that reveals two more tiles after each scroll.
struct GrowingGrid {
    scrolls: AtomicU32,
    last_step: AtomicU32,
}

#[async_trait]
impl PageHost for GrowingGrid {
    async fn document(&self) -> Result<PageSnapshot, HostError> {
        let visible = (self.scrolls.load(Ordering::SeqCst) + 1) * 2;
        let body: String = (0..visible)
            .map(|i| anchor("maker", &(100 + i).to_string(), "1K"))
            .collect();
        Ok(page("", &body))
    }

    async fn scroll_by(&self, pixels: u32) -> Result<(), HostError> {
        self.last_step.store(pixels, Ordering::SeqCst);
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn viewport_height(&self) -> u32 {
        1000
    }
}

#[tokio::test]
async fn auto_scroll_stops_at_target() {
    let host = GrowingGrid {
        scrolls: AtomicU32::new(0),
        last_step: AtomicU32::new(0),
    };
    let options = ScanOptions {
        auto_scroll: true,
        scroll_passes: 10,
        target_count: 6,
        ..ScanOptions::default()
    };
    let snapshot = scan_profile(&host, &options, ScrollTiming::immediate())
        .await
        .unwrap();
    // 4, 6 visible after passes one and two.
    assert_eq!(host.scrolls.load(Ordering::SeqCst), 2);
    assert_eq!(host.last_step.load(Ordering::SeqCst), 900);
    assert_eq!(snapshot.debug.scroll_passes, 2);
    assert_eq!(snapshot.videos.len(), 6);
}

#[tokio::test]
async fn static_host_scrolls_full_budget_with_minimum_step() {
    let host = StaticPageHost::new(page("", &anchor("maker", "1", "2"))).with_viewport_height(300);
    let options = ScanOptions {
        auto_scroll: true,
        target_count: 50,
        ..ScanOptions::default()
    };
    let snapshot = scan_profile(&host, &options, ScrollTiming::immediate())
        .await
        .unwrap();
    assert_eq!(host.scrolls(), DEFAULT_SCROLL_PASSES);
    assert_eq!(snapshot.debug.scroll_passes, DEFAULT_SCROLL_PASSES);
    assert!(snapshot.debug.auto_scroll);
}

#[tokio::test]
async fn no_scroll_without_auto_scroll() {
    let host = StaticPageHost::new(page("", ""));
    scan_profile(&host, &ScanOptions::default(), ScrollTiming::immediate())
        .await
        .unwrap();
    assert_eq!(host.scrolls(), 0);
}
