//! Shared domain types and configuration for MSH Map analytics.

pub mod analytics_config;
pub mod app_config;
pub mod config;
pub mod slug;
pub mod types;

use thiserror::Error;

pub use analytics_config::{
    load_analytics_config, load_analytics_config_or_default, parse_analytics_config,
    AnalyticsConfig, CategoryGapRule, CategoryTarget, CityProfile, CoverageConfig, FamilyConfig,
    InsightConfig, PlaygroundDesertConfig,
};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use slug::slugify;
pub use types::{
    CategoryDistribution, CityStats, Coordinates, Gap, GapType, Insight, InsightKind,
    LocationRecord, RegionOverview, Severity,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read analytics config {path}: {source}")]
    AnalyticsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse analytics config: {0}")]
    AnalyticsFileParse(#[from] serde_yaml::Error),

    #[error("invalid analytics config: {0}")]
    Validation(String),
}
