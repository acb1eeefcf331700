use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

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

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let trimmed = raw.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(invalid(var, format!("'{raw}' is not an http(s) URL")));
        }
        Ok(trimmed.to_string())
    };

    let parse_language = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let code = raw.trim();
        let valid = (2..=8).contains(&code.len())
            && code.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
        if !valid {
            return Err(invalid(var, format!("'{raw}' is not a language code")));
        }
        Ok(code.to_string())
    };

    let env = parse_environment(&or_default("NEWSVOX_ENV", "development"))?;
    let bind_addr = parse_addr("NEWSVOX_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("NEWSVOX_LOG_LEVEL", "info");

    let search_base_url = parse_url("NEWSVOX_SEARCH_BASE_URL", "https://news.search.yahoo.com")?;
    let translate_base_url = parse_url(
        "NEWSVOX_TRANSLATE_BASE_URL",
        "https://translate.googleapis.com",
    )?;
    let tts_base_url = parse_url("NEWSVOX_TTS_BASE_URL", "https://translate.google.com")?;
    let user_agent = or_default("NEWSVOX_USER_AGENT", "Mozilla/5.0");

    let source_language = parse_language("NEWSVOX_SOURCE_LANGUAGE", "en")?;
    let target_language = parse_language("NEWSVOX_TARGET_LANGUAGE", "hi")?;

    let max_items = parse_positive_usize("NEWSVOX_MAX_ITEMS", "5")?;
    let item_concurrency = parse_positive_usize("NEWSVOX_ITEM_CONCURRENCY", "4")?;
    let request_timeout_secs = parse_u64("NEWSVOX_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("NEWSVOX_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("NEWSVOX_RETRY_BACKOFF_BASE_MS", "500")?;

    let audio_dir = PathBuf::from(or_default("NEWSVOX_AUDIO_DIR", "./audio"));
    let audio_retain_files = parse_positive_usize("NEWSVOX_AUDIO_RETAIN_FILES", "50")?;
    let audio_file = PathBuf::from(or_default("NEWSVOX_AUDIO_FILE", "news_audio.mp3"));
    let rate_limit_per_minute = parse_positive_usize("NEWSVOX_RATE_LIMIT_PER_MINUTE", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        search_base_url,
        translate_base_url,
        tts_base_url,
        user_agent,
        source_language,
        target_language,
        max_items,
        item_concurrency,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        audio_dir,
        audio_retain_files,
        audio_file,
        rate_limit_per_minute,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NEWSVOX_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
