use chrono::FixedOffset;

use crate::app_config::{AppConfig, SmtpConfig};
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
/// Decoupled from the process environment so tests can drive it with a
/// `HashMap` lookup.
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

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        match raw.parse::<usize>() {
            Ok(0) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            }),
            Ok(n) => Ok(n),
            Err(e) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let api_token = require("VQSTATS_API_TOKEN")?;
    let api_base_url = or_default("VQSTATS_API_BASE_URL", "https://api.virtuoso.qa/api");
    let log_level = or_default("VQSTATS_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("VQSTATS_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("VQSTATS_USER_AGENT", "vqstats/0.1 (execution-report)");
    let max_pages = parse_positive_usize("VQSTATS_MAX_PAGES", "50")?;
    let page_size = parse_positive_usize("VQSTATS_PAGE_SIZE", "20")?;
    let tz_offset = parse_tz_offset(&or_default("VQSTATS_TZ_OFFSET", "+00:00"))?;

    let smtp = match lookup("VQSTATS_SMTP_HOST") {
        Ok(host) if !host.trim().is_empty() => {
            let raw_port = or_default("VQSTATS_SMTP_PORT", "587");
            let port = raw_port
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "VQSTATS_SMTP_PORT".to_string(),
                    reason: e.to_string(),
                })?;
            Some(SmtpConfig {
                host,
                port,
                user: require("VQSTATS_SMTP_USER")?,
                password: require("VQSTATS_SMTP_PASSWORD")?,
                to: require("VQSTATS_EMAIL_TO")?,
                subject: or_default("VQSTATS_EMAIL_SUBJECT", "Test Execution Results"),
                body: or_default(
                    "VQSTATS_EMAIL_BODY",
                    "Please find attached the test execution results.",
                ),
            })
        }
        _ => None,
    };

    Ok(AppConfig {
        api_token,
        api_base_url,
        log_level,
        request_timeout_secs,
        user_agent,
        max_pages,
        page_size,
        tz_offset,
        smtp,
    })
}

/// Parse a `+HH:MM` / `-HH:MM` offset string.
fn parse_tz_offset(raw: &str) -> Result<FixedOffset, ConfigError> {
    raw.trim()
        .parse::<FixedOffset>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "VQSTATS_TZ_OFFSET".to_string(),
            reason: format!("'{raw}': {e}"),
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
