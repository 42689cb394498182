use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Batch size used by imports when `INVDB_IMPORT_BATCH_SIZE` is not set.
pub const DEFAULT_IMPORT_BATCH_SIZE: usize = 100;

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
/// Decoupled from the process environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(value)
    };

    let api_endpoint = require("INVDB_API_ENDPOINT")?
        .trim_end_matches('/')
        .to_string();

    let env = parse_environment(&or_default("INVDB_ENV", "development"))?;
    let log_level = or_default("INVDB_LOG_LEVEL", "info");

    let import_batch_size = parse_positive_usize(
        "INVDB_IMPORT_BATCH_SIZE",
        &DEFAULT_IMPORT_BATCH_SIZE.to_string(),
    )?;
    let request_timeout_secs = parse_u64("INVDB_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("INVDB_USER_AGENT", "invdb/0.1 (device-inventory)");
    let write_max_retries = parse_u32("INVDB_WRITE_MAX_RETRIES", "0")?;
    let retry_backoff_base_ms = parse_u64("INVDB_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        api_endpoint,
        env,
        log_level,
        import_batch_size,
        request_timeout_secs,
        user_agent,
        write_max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "INVDB_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
