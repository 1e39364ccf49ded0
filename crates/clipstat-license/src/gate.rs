//! Pro entitlement, checked against the server at most once per TTL.

use std::time::Duration;

use chrono::{DateTime, Utc};
use clipstat_core::AppConfig;
use serde::{Deserialize, Serialize};

use crate::client::LicenseClient;
use crate::error::LicenseError;
use crate::store::{FileStore, LicenseState, LicenseStore, ProCache};

/// Where a [`ProStatus`] answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProSource {
    NoToken,
    Cache,
    Server,
}

impl ProSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoToken => "noToken",
            Self::Cache => "cache",
            Self::Server => "server",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProStatus {
    pub pro: bool,
    pub source: ProSource,
}

/// `true` when `cache` was written less than `ttl` ago. A timestamp in the
/// future is treated as stale.
#[must_use]
pub fn is_fresh(cache: &ProCache, now: DateTime<Utc>, ttl: Duration) -> bool {
    (now - cache.checked_at)
        .to_std()
        .is_ok_and(|age| age < ttl)
}

pub struct LicenseGate<S> {
    client: LicenseClient,
    store: S,
    ttl: Duration,
}

impl LicenseGate<FileStore> {
    /// Gate backed by the JSON file at `license_store_path`.
    ///
    /// # Errors
    ///
    /// Propagates [`LicenseClient::new`] failures.
    pub fn from_config(config: &AppConfig) -> Result<Self, LicenseError> {
        let client = LicenseClient::new(
            &config.license_validate_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        Ok(Self::new(
            client,
            FileStore::new(&config.license_store_path),
            Duration::from_secs(config.license_ttl_secs),
        ))
    }
}

impl<S: LicenseStore> LicenseGate<S> {
    pub fn new(client: LicenseClient, store: S, ttl: Duration) -> Self {
        Self { client, store, ttl }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current entitlement.
    ///
    /// Without a token the answer is `false` and the cache is overwritten to
    /// match. A fresh cache answers unless `force_refresh`. Otherwise the
    /// server is asked; any failure there counts as not Pro.
    ///
    /// # Errors
    ///
    /// Only storage failures. Validation failures degrade to `pro: false`.
    pub async fn pro_status(&self, force_refresh: bool) -> Result<ProStatus, LicenseError> {
        let mut state = self.store.load().await?;
        let now = Utc::now();

        let Some(token) = state.token.clone().filter(|t| !t.is_empty()) else {
            state.cache = Some(ProCache {
                pro: false,
                checked_at: now,
            });
            self.store.save(&state).await?;
            return Ok(ProStatus {
                pro: false,
                source: ProSource::NoToken,
            });
        };

        if !force_refresh {
            if let Some(cache) = state.cache.filter(|c| is_fresh(c, now, self.ttl)) {
                tracing::debug!(pro = cache.pro, "license answered from cache");
                return Ok(ProStatus {
                    pro: cache.pro,
                    source: ProSource::Cache,
                });
            }
        }

        let pro = match self.client.validate(&token).await {
            Ok(response) => response.pro,
            Err(e) => {
                tracing::warn!(error = %e, "license validation failed; treating as not pro");
                false
            }
        };
        tracing::info!(pro, "license validated");

        state.cache = Some(ProCache {
            pro,
            checked_at: Utc::now(),
        });
        self.store.save(&state).await?;
        Ok(ProStatus {
            pro,
            source: ProSource::Server,
        })
    }

    /// Stores the trimmed token and re-validates immediately.
    ///
    /// # Errors
    ///
    /// Storage failures, as for [`Self::pro_status`].
    pub async fn set_token(&self, token: &str) -> Result<ProStatus, LicenseError> {
        let token = token.trim();
        let mut state: LicenseState = self.store.load().await?;
        state.token = (!token.is_empty()).then(|| token.to_string());
        self.store.save(&state).await?;
        self.pro_status(true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_is_bounded_by_ttl() {
        let now = Utc::now();
        let ttl = Duration::from_secs(6 * 3600);
        let at = |secs_ago: i64| ProCache {
            pro: true,
            checked_at: now - chrono::Duration::seconds(secs_ago),
        };
        assert!(is_fresh(&at(0), now, ttl));
        assert!(is_fresh(&at(6 * 3600 - 1), now, ttl));
        assert!(!is_fresh(&at(6 * 3600), now, ttl));
        assert!(!is_fresh(&at(-60), now, ttl));
    }

    #[test]
    fn source_serializes_camel_case() {
        let status = ProStatus {
            pro: false,
            source: ProSource::NoToken,
        };
        assert_eq!(
            serde_json::to_value(status).unwrap(),
            serde_json::json!({"pro": false, "source": "noToken"})
        );
        assert_eq!(ProSource::Server.as_str(), "server");
    }
}
