//! A [`TabDriver`] that "opens a tab" by fetching the URL over HTTP.
//!
//! The fetched HTML is the server-rendered page, which on this site already
//! embeds the state blob. Both execution worlds read the same snapshot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use clipstat_core::AppConfig;

use crate::error::HostError;
use crate::host::{ExecutionWorld, TabDriver, TabId, TabStatus};
use crate::page::PageSnapshot;

pub struct FetchTabDriver {
    client: reqwest::Client,
    user_agent: String,
    next_id: AtomicU64,
    tabs: Mutex<HashMap<TabId, PageSnapshot>>,
}

impl FetchTabDriver {
    /// # Errors
    ///
    /// Returns [`HostError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Result<Self, HostError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            user_agent: user_agent.into(),
            next_id: AtomicU64::new(1),
            tabs: Mutex::new(HashMap::new()),
        })
    }

    /// # Errors
    ///
    /// Returns [`HostError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, HostError> {
        Self::new(
            Duration::from_secs(config.request_timeout_secs),
            config.user_agent.clone(),
        )
    }

    /// Fetches `url` and parses it as the page found at the final,
    /// post-redirect URL.
    ///
    /// # Errors
    ///
    /// [`HostError::Http`] on transport failure, [`HostError::TabCreate`] on
    /// a non-success status, [`HostError::Page`] if the final URL is invalid.
    pub async fn fetch_page(&self, url: &str) -> Result<PageSnapshot, HostError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostError::TabCreate {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;
        tracing::debug!(url, final_url = %final_url, bytes = body.len(), "page fetched");
        Ok(PageSnapshot::parse(&final_url, &body)?)
    }

    /// Number of tabs currently held open.
    #[must_use]
    pub fn open_tabs(&self) -> usize {
        self.tabs.lock().map_or(0, |tabs| tabs.len())
    }
}

#[async_trait]
impl TabDriver for FetchTabDriver {
    async fn create_tab(&self, url: &str) -> Result<TabId, HostError> {
        let page = self.fetch_page(url).await?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut tabs) = self.tabs.lock() {
            tabs.insert(id, page);
        }
        Ok(id)
    }

    async fn status(&self, tab: TabId) -> Result<TabStatus, HostError> {
        let open = self
            .tabs
            .lock()
            .is_ok_and(|tabs| tabs.contains_key(&tab));
        if open {
            Ok(TabStatus::Complete)
        } else {
            Err(HostError::TabGone(tab))
        }
    }

    async fn inject(&self, tab: TabId, _world: ExecutionWorld) -> Option<PageSnapshot> {
        self.tabs.lock().ok()?.get(&tab).cloned()
    }

    async fn remove(&self, tab: TabId) -> Result<(), HostError> {
        if let Ok(mut tabs) = self.tabs.lock() {
            tabs.remove(&tab);
        }
        Ok(())
    }
}
