//! Persistence for the license token and the last validation result.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LicenseError;

/// Last known entitlement and when it was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProCache {
    pub pro: bool,
    pub checked_at: DateTime<Utc>,
}

/// Everything the gate persists between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseState {
    pub token: Option<String>,
    pub cache: Option<ProCache>,
}

#[async_trait]
pub trait LicenseStore: Send + Sync {
    async fn load(&self) -> Result<LicenseState, LicenseError>;
    async fn save(&self, state: &LicenseState) -> Result<(), LicenseError>;
}

/// Process-local store; state is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<LicenseState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(state: LicenseState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> LicenseState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LicenseStore for MemoryStore {
    async fn load(&self) -> Result<LicenseState, LicenseError> {
        Ok(self.snapshot())
    }

    async fn save(&self, state: &LicenseState) -> Result<(), LicenseError> {
        if let Ok(mut guard) = self.state.lock() {
            *guard = state.clone();
        }
        Ok(())
    }
}

/// JSON file store. A missing file reads as the empty state.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, source: std::io::Error) -> LicenseError {
        LicenseError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl LicenseStore for FileStore {
    async fn load(&self) -> Result<LicenseState, LicenseError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LicenseState::default());
            }
            Err(e) => return Err(self.storage_error(e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| LicenseError::Json {
            context: self.path.display().to_string(),
            source: e,
        })
    }

    async fn save(&self, state: &LicenseState) -> Result<(), LicenseError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.storage_error(e))?;
        }
        let body = serde_json::to_vec_pretty(state).map_err(|e| LicenseError::Json {
            context: self.path.display().to_string(),
            source: e,
        })?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| self.storage_error(e))
    }
}
