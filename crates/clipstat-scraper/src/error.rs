use clipstat_core::DebugTrace;
use thiserror::Error;

/// Why an extraction produced no data.
///
/// Display strings are short enough to show to a user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Analyzer not ready: {reason}")]
    NotReady { reason: String },

    #[error("The site redirected to a login page; try a public profile you can view")]
    LoginRequired,

    #[error("No embedded page state was found")]
    NoStateFound,

    #[error("Page state was found but no stats could be extracted")]
    NoStatsFound,

    #[error("Extractor failed unexpectedly: {0}")]
    ExtractorException(String),
}

impl ExtractError {
    /// Stable machine-readable code, used as the `error` field of responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ExtractError::NotReady { .. } => "NotReady",
            ExtractError::LoginRequired => "LoginRequired",
            ExtractError::NoStateFound => "NoStateFound",
            ExtractError::NoStatsFound => "NoStatsFound",
            ExtractError::ExtractorException(_) => "ExtractorException",
        }
    }

    pub(crate) fn not_ready(reason: impl Into<String>) -> Self {
        ExtractError::NotReady {
            reason: reason.into(),
        }
    }
}

/// A failed extraction together with the trace gathered before it failed.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct ExtractFailure {
    pub error: ExtractError,
    pub debug: DebugTrace,
}

impl ExtractFailure {
    pub(crate) fn new(error: ExtractError, mut debug: DebugTrace) -> Self {
        debug.error.get_or_insert_with(|| error.code().to_string());
        Self { error, debug }
    }
}

/// A successful extraction with its diagnostic trace.
#[derive(Debug, Clone)]
pub struct Traced<T> {
    pub value: T,
    pub debug: DebugTrace,
}

/// Failures of the page/tab host collaborators.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("tab {0} no longer exists")]
    TabGone(u64),

    #[error("could not open tab for {url}: {reason}")]
    TabCreate { url: String, reason: String },

    #[error("HTTP error loading page: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Page(#[from] crate::page::PageError),
}
