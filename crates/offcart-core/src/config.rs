use std::path::PathBuf;

use crate::app_config::{AppConfig, OutputFormat};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if an env var carries an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if an env var carries an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed. Every variable has a default; nothing is
/// required.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let output_format = or_default("OFFCART_OUTPUT_FORMAT", "jsonl")
        .parse::<OutputFormat>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "OFFCART_OUTPUT_FORMAT".to_string(),
            reason: e.to_string(),
        })?;

    Ok(AppConfig {
        request_delay_ms: parse_u64("OFFCART_REQUEST_DELAY_MS", "1000")?,
        request_timeout_secs: parse_u64("OFFCART_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: or_default(
            "OFFCART_USER_AGENT",
            "offcart/0.1 (+contact@offcart.example)",
        ),
        max_retries: parse_u32("OFFCART_MAX_RETRIES", "3")?,
        retry_backoff_base_secs: parse_u64("OFFCART_RETRY_BACKOFF_BASE_SECS", "1")?,
        output_format,
        output_dir: PathBuf::from(or_default("OFFCART_OUTPUT_DIR", "out")),
        world_base_url: or_default(
            "OFFCART_WORLD_BASE_URL",
            "https://world.openfoodfacts.org",
        ),
        french_base_url: or_default("OFFCART_FRENCH_BASE_URL", "https://fr.openfoodfacts.org"),
    })
}
