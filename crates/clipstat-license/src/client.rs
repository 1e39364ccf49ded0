//! HTTP client for the license validation endpoint.
//!
//! The endpoint takes `POST {"token": "..."}` and answers
//! `{"ok": true, "pro": true|false}`. Anything else is treated as an error by
//! [`LicenseClient::validate`]; callers decide how to degrade.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::LicenseError;

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    token: &'a str,
}

/// Body returned by the validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidateResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub pro: bool,
    #[serde(default)]
    pub error: Option<String>,
}

pub struct LicenseClient {
    client: Client,
    validate_url: Url,
}

impl LicenseClient {
    /// # Errors
    ///
    /// Returns [`LicenseError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`LicenseError::InvalidUrl`] if `validate_url` does not parse.
    pub fn new(
        validate_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LicenseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let validate_url = Url::parse(validate_url).map_err(|e| LicenseError::InvalidUrl {
            url: validate_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            validate_url,
        })
    }

    /// Asks the server whether `token` carries Pro entitlement.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::Http`] on network failure or non-2xx status.
    /// - [`LicenseError::Json`] if the body is not the expected JSON object.
    pub async fn validate(&self, token: &str) -> Result<ValidateResponse, LicenseError> {
        let response = self
            .client
            .post(self.validate_url.clone())
            .json(&ValidateRequest { token })
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let parsed: ValidateResponse =
            serde_json::from_slice(&body).map_err(|e| LicenseError::Json {
                context: "license validation response".to_string(),
                source: e,
            })?;

        if let Some(error) = &parsed.error {
            tracing::debug!(error = %error, "validation endpoint reported an error");
        }
        Ok(parsed)
    }
}
