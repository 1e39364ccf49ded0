//! CSV rendering of a profile snapshot.

use clipstat_core::ProfileSnapshot;

const HEADER: &str = "profile,followers,url,views,likes,comments";

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn cell(value: Option<u64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

/// One row per video; unknown counts are empty cells.
pub(crate) fn render_csv(snapshot: &ProfileSnapshot) -> String {
    let handle = quoted(&snapshot.profile_handle);
    let followers = cell(snapshot.followers);

    let mut rows = vec![HEADER.to_string()];
    rows.extend(snapshot.videos.iter().map(|video| {
        [
            handle.clone(),
            followers.clone(),
            quoted(&video.url),
            cell(video.views),
            cell(video.likes),
            cell(video.comments),
        ]
        .join(",")
    }));
    rows.join("\n")
}
