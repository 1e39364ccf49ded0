use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use clipstat_scraper::{FetchTabDriver, PageSnapshot};

/// Where the page comes from: fetched live, or a saved HTML file.
#[derive(Debug, Clone, Args)]
pub(crate) struct PageSource {
    /// Page URL, e.g. https://www.tiktok.com/@handle
    pub url: String,
    /// Read this saved HTML instead of fetching `url`
    #[arg(long)]
    pub html: Option<PathBuf>,
}

impl PageSource {
    pub(crate) async fn load(&self, driver: &FetchTabDriver) -> anyhow::Result<PageSnapshot> {
        match &self.html {
            Some(path) => {
                let html = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok(PageSnapshot::parse(&self.url, &html)?)
            }
            None => driver
                .fetch_page(&self.url)
                .await
                .with_context(|| format!("failed to fetch {}", self.url)),
        }
    }
}
