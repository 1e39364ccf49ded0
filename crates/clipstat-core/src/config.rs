use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let log_level = or_default("CLIPSTAT_LOG_LEVEL", "info");
    let license_validate_url = or_default(
        "CLIPSTAT_LICENSE_VALIDATE_URL",
        "http://localhost:3000/api/license/validate",
    );
    if !(license_validate_url.starts_with("http://") || license_validate_url.starts_with("https://"))
    {
        return Err(ConfigError::InvalidEnvVar {
            var: "CLIPSTAT_LICENSE_VALIDATE_URL".to_string(),
            reason: "must be an http(s) URL".to_string(),
        });
    }
    let license_store_path = PathBuf::from(or_default(
        "CLIPSTAT_LICENSE_STORE_PATH",
        "./.clipstat/license.json",
    ));
    let license_ttl_secs = parse_u64("CLIPSTAT_LICENSE_TTL_SECS", "21600")?;

    let request_timeout_secs = parse_u64("CLIPSTAT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CLIPSTAT_USER_AGENT", "clipstat/0.1 (profile-analytics)");

    let tab_load_timeout_ms = parse_u64("CLIPSTAT_TAB_LOAD_TIMEOUT_MS", "15000")?;
    let tab_poll_interval_ms = parse_u64("CLIPSTAT_TAB_POLL_INTERVAL_MS", "150")?;
    let retry_delay_ms = parse_u64("CLIPSTAT_RETRY_DELAY_MS", "900")?;
    let scroll_settle_ms = parse_u64("CLIPSTAT_SCROLL_SETTLE_MS", "800")?;
    let deep_limit = parse_usize("CLIPSTAT_DEEP_LIMIT", "12")?;

    Ok(AppConfig {
        log_level,
        license_validate_url,
        license_store_path,
        license_ttl_secs,
        request_timeout_secs,
        user_agent,
        tab_load_timeout_ms,
        tab_poll_interval_ms,
        retry_delay_ms,
        scroll_settle_ms,
        deep_limit,
    })
}
