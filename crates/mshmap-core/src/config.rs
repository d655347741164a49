use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("MSHMAP_ENV", "development"))?;

    let bind_addr = parse_addr("MSHMAP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("MSHMAP_LOG_LEVEL", "info");
    let analytics_config_path = lookup("MSHMAP_ANALYTICS_CONFIG")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let trigger_tokens = parse_token_list(&or_default("MSHMAP_TRIGGER_TOKENS", ""));

    let db_max_connections = parse_u32("MSHMAP_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("MSHMAP_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("MSHMAP_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scheduler_enabled = parse_bool("MSHMAP_SCHEDULER_ENABLED", "true")?;
    let daily_cron = or_default("MSHMAP_DAILY_CRON", "0 0 3 * * *");
    let weekly_cron = or_default("MSHMAP_WEEKLY_CRON", "0 0 6 * * Sun");
    let schedule_timezone = or_default("MSHMAP_SCHEDULE_TZ", "Europe/Berlin")
        .trim()
        .parse::<chrono_tz::Tz>()
        .map_err(|e| invalid("MSHMAP_SCHEDULE_TZ", e.to_string()))?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        analytics_config_path,
        trigger_tokens,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scheduler_enabled,
        daily_cron,
        weekly_cron,
        schedule_timezone,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MSHMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_token_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
