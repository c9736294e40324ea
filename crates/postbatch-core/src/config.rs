use std::path::PathBuf;

use crate::app_config::{AppConfig, DEFAULT_ASSET_URL_TEMPLATE};
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
/// Unlike [`load_app_config`], this does not read `.env` files. Use it when
/// the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so tests can pass a `HashMap` lookup instead of mutating the process env.
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

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let access_token = require("POSTBATCH_ACCESS_TOKEN")?;

    let directory_base_url = or_default(
        "POSTBATCH_DIRECTORY_BASE_URL",
        "https://mybusiness.googleapis.com/v4/",
    );
    let request_timeout_secs = parse_u64("POSTBATCH_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("POSTBATCH_USER_AGENT", "postbatch/0.1 (listing-publisher)");

    let storage_root = PathBuf::from(or_default("POSTBATCH_STORAGE_ROOT", "./storage"));
    let inbox_folder = or_default("POSTBATCH_INBOX_FOLDER", "inbox");
    let image_root = optional("POSTBATCH_IMAGE_ROOT");
    let store_registry_path = optional("POSTBATCH_STORE_REGISTRY").map(PathBuf::from);

    let row_delay_ms = parse_u64("POSTBATCH_ROW_DELAY_MS", "1000")?;
    let page_delay_ms = parse_u64("POSTBATCH_PAGE_DELAY_MS", "200")?;

    let asset_url_template = or_default("POSTBATCH_ASSET_URL_TEMPLATE", DEFAULT_ASSET_URL_TEMPLATE);
    if !asset_url_template.contains("{id}") {
        return Err(ConfigError::InvalidEnvVar {
            var: "POSTBATCH_ASSET_URL_TEMPLATE".to_string(),
            reason: "template must contain the {id} placeholder".to_string(),
        });
    }

    let language_code = or_default("POSTBATCH_LANGUAGE_CODE", "en");
    let currency_code = parse_currency_code(&or_default("POSTBATCH_CURRENCY_CODE", "USD"))?;
    let log_level = or_default("POSTBATCH_LOG_LEVEL", "info");

    Ok(AppConfig {
        access_token,
        directory_base_url,
        request_timeout_secs,
        user_agent,
        storage_root,
        inbox_folder,
        image_root,
        store_registry_path,
        row_delay_ms,
        page_delay_ms,
        asset_url_template,
        language_code,
        currency_code,
        log_level,
    })
}

/// Currency codes are ISO 4217: exactly three ASCII letters, stored upper-case.
fn parse_currency_code(raw: &str) -> Result<String, ConfigError> {
    let code = raw.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: "POSTBATCH_CURRENCY_CODE".to_string(),
            reason: format!("\"{raw}\" is not a three-letter currency code"),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
