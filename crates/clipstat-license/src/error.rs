use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the license client and its storage.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Network or TLS failure, or a non-2xx status from the validation endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The validation URL could not be parsed.
    #[error("invalid validation URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A body (response or stored file) did not have the expected shape.
    #[error("JSON error for {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("license store I/O error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
