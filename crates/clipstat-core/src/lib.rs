pub mod aggregate;
pub mod app_config;
pub mod compare;
pub mod config;
pub mod records;

pub use aggregate::{aggregate, engagement_for, order_by_views, top_by_views, AggregateStats};
pub use app_config::AppConfig;
pub use compare::{compare_profiles, Comparison, CoverageTier, ProfileSummary, Side};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{
    DebugTrace, MatchCounts, ProfileSnapshot, StateSchema, VideoDetail, VideoRecord,
    ENGINE_VERSION,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
