use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional YAML override for the city registry and target tables.
    pub analytics_config_path: Option<PathBuf>,
    /// Bearer tokens accepted by the recalculation and report triggers.
    pub trigger_tokens: Vec<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scheduler_enabled: bool,
    pub daily_cron: String,
    pub weekly_cron: String,
    /// Zone the cron expressions are evaluated in.
    pub schedule_timezone: chrono_tz::Tz,
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("analytics_config_path", &self.analytics_config_path)
            .field("database_url", &"[redacted]")
            .field(
                "trigger_tokens",
                &format_args!("[{} redacted]", self.trigger_tokens.len()),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("scheduler_enabled", &self.scheduler_enabled)
            .field("daily_cron", &self.daily_cron)
            .field("weekly_cron", &self.weekly_cron)
            .field("schedule_timezone", &self.schedule_timezone)
            .finish()
    }
}
