use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub license_validate_url: String,
    pub license_store_path: PathBuf,
    pub license_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub tab_load_timeout_ms: u64,
    pub tab_poll_interval_ms: u64,
    pub retry_delay_ms: u64,
    pub scroll_settle_ms: u64,
    pub deep_limit: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The validation endpoint may carry an access key in its query string.
        let validate_url = self
            .license_validate_url
            .split_once('?')
            .map_or(self.license_validate_url.as_str(), |(base, _)| base);
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("license_validate_url", &validate_url)
            .field("license_store_path", &self.license_store_path)
            .field("license_ttl_secs", &self.license_ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("tab_load_timeout_ms", &self.tab_load_timeout_ms)
            .field("tab_poll_interval_ms", &self.tab_poll_interval_ms)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("scroll_settle_ms", &self.scroll_settle_ms)
            .field("deep_limit", &self.deep_limit)
            .finish()
    }
}
