//! Owned, read-only view of a rendered page.
//!
//! The HTML is parsed once into plain data (script bodies by id, anchor
//! tiles, visible text) so every extractor works on a `Send` value and the
//! parser's DOM never crosses an `.await`.

mod parse;

use std::collections::HashMap;

use url::Url;

/// One `<a href>` element, as the DOM fallback sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorTile {
    /// Raw `href` attribute, possibly relative.
    pub href: String,
    pub aria_label: Option<String>,
    /// Visible text of the anchor, text nodes joined by single spaces.
    pub text: String,
    /// Visible text of each `span`/`strong`/`p`/`div` descendant, in
    /// document order.
    pub descendant_texts: Vec<String>,
}

/// Errors building a [`PageSnapshot`].
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("invalid page URL \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone)]
pub struct PageSnapshot {
    url: Url,
    scripts: HashMap<String, String>,
    anchors: Vec<AnchorTile>,
    body_text: String,
    text_blocks: Vec<String>,
}

impl PageSnapshot {
    /// Parses `html` as the document currently shown at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidUrl`] if `url` is not an absolute URL.
    pub fn parse(url: &str, html: &str) -> Result<Self, PageError> {
        let url = Url::parse(url).map_err(|source| PageError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(parse::snapshot_from_html(url, html))
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Text content of the first `<script>` carrying `id`.
    #[must_use]
    pub fn script_text(&self, id: &str) -> Option<&str> {
        self.scripts.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn anchors(&self) -> &[AnchorTile] {
        &self.anchors
    }

    /// Visible text of `<body>`, script and style content excluded.
    #[must_use]
    pub fn body_text(&self) -> &str {
        &self.body_text
    }

    /// Short visible text blocks (`span`, `strong`, `div`) in document order.
    #[must_use]
    pub fn text_blocks(&self) -> &[String] {
        &self.text_blocks
    }

    /// Resolves an anchor `href` against the page URL.
    #[must_use]
    pub fn absolute_url(&self, href: &str) -> Option<String> {
        if href.is_empty() {
            return None;
        }
        self.url.join(href).ok().map(String::from)
    }
}
