//! Collaborators the engine drives but does not own: the page being scanned
//! and the background tabs opened for deep scans.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::error::HostError;
use crate::page::PageSnapshot;

pub type TabId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabStatus {
    Loading,
    Complete,
}

/// Script isolation level used when reading a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionWorld {
    /// Extension-private context; survives most page script breakage.
    Isolated,
    /// The page's own JavaScript context.
    PageNative,
}

impl ExecutionWorld {
    /// Order in which worlds are tried.
    pub const FALLBACK_ORDER: [ExecutionWorld; 2] =
        [ExecutionWorld::Isolated, ExecutionWorld::PageNative];
}

impl std::fmt::Display for ExecutionWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionWorld::Isolated => write!(f, "isolated"),
            ExecutionWorld::PageNative => write!(f, "page-native"),
        }
    }
}

/// The page a profile scan runs against.
#[async_trait]
pub trait PageHost: Send + Sync {
    /// Current rendering of the document. Re-read after every scroll.
    async fn document(&self) -> Result<PageSnapshot, HostError>;

    async fn scroll_by(&self, pixels: u32) -> Result<(), HostError>;

    async fn viewport_height(&self) -> u32;
}

/// Background tab lifecycle plus the cross-context injection primitive.
///
/// Implementations must tolerate `remove` on a tab that already closed.
#[async_trait]
pub trait TabDriver: Send + Sync {
    async fn create_tab(&self, url: &str) -> Result<TabId, HostError>;

    async fn status(&self, tab: TabId) -> Result<TabStatus, HostError>;

    /// Runs the page reader inside `tab` in the given world.
    ///
    /// `None` means the injection produced no result, which is routine while
    /// a page is still hydrating.
    async fn inject(&self, tab: TabId, world: ExecutionWorld) -> Option<PageSnapshot>;

    async fn remove(&self, tab: TabId) -> Result<(), HostError>;
}

const DEFAULT_VIEWPORT_HEIGHT: u32 = 900;

/// A page that never changes: one fetched or saved document.
///
/// Scrolling is accepted and counted but loads nothing new.
#[derive(Debug)]
pub struct StaticPageHost {
    page: PageSnapshot,
    viewport_height: u32,
    scrolls: AtomicU32,
}

impl StaticPageHost {
    #[must_use]
    pub fn new(page: PageSnapshot) -> Self {
        Self {
            page,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scrolls: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn with_viewport_height(mut self, height: u32) -> Self {
        self.viewport_height = height;
        self
    }

    /// Number of `scroll_by` calls received.
    #[must_use]
    pub fn scrolls(&self) -> u32 {
        self.scrolls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PageHost for StaticPageHost {
    async fn document(&self) -> Result<PageSnapshot, HostError> {
        Ok(self.page.clone())
    }

    async fn scroll_by(&self, _pixels: u32) -> Result<(), HostError> {
        self.scrolls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn viewport_height(&self) -> u32 {
        self.viewport_height
    }
}
