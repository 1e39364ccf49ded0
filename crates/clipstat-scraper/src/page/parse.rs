use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use super::{AnchorTile, PageSnapshot};

static SCRIPT_WITH_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[id]").expect("valid selector"));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static TILE_TEXT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span, strong, p, div").expect("valid selector"));
static TEXT_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span, strong, div").expect("valid selector"));
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("valid selector"));

/// Blocks longer than this are layout containers, not labels.
const MAX_TEXT_BLOCK_CHARS: usize = 200;

pub(super) fn snapshot_from_html(url: Url, html: &str) -> PageSnapshot {
    let document = Html::parse_document(html);

    let mut scripts = HashMap::new();
    for script in document.select(&SCRIPT_WITH_ID) {
        if let Some(id) = script.value().id() {
            scripts
                .entry(id.to_string())
                .or_insert_with(|| script.text().collect::<String>());
        }
    }

    let anchors = document
        .select(&ANCHOR)
        .map(|a| AnchorTile {
            href: a.value().attr("href").unwrap_or_default().trim().to_string(),
            aria_label: a.value().attr("aria-label").map(str::to_string),
            text: visible_text(a),
            descendant_texts: a.select(&TILE_TEXT).map(visible_text).collect(),
        })
        .collect();

    let body_text = document
        .select(&BODY)
        .next()
        .map(visible_text)
        .unwrap_or_default();

    let text_blocks = document
        .select(&TEXT_BLOCK)
        .map(visible_text)
        .filter(|t| !t.is_empty() && t.chars().count() <= MAX_TEXT_BLOCK_CHARS)
        .collect();

    PageSnapshot {
        url,
        scripts,
        anchors,
        body_text,
        text_blocks,
    }
}

fn is_hidden_container(name: &str) -> bool {
    matches!(name, "script" | "style" | "noscript" | "template")
}

/// Text nodes under `root`, trimmed and joined with single spaces.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| is_hidden_container(el.name())))
            .unwrap_or(false);
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}
