use crate::app_config::{AnalyticsConfig, AppConfig, Environment};
use crate::ConfigError;

/// Upper bound for `VOICELOG_PERIOD_DAYS`, ten years.
const MAX_PERIOD_DAYS: i64 = 3650;

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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i32 = |var: &str, default: &str| -> Result<i32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i32>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("VOICELOG_ENV", "development"))?;
    let log_level = or_default("VOICELOG_LOG_LEVEL", "info");
    let vocabulary_path = lookup("VOICELOG_VOCABULARY_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let shrinkage_k = parse_f64("VOICELOG_SHRINKAGE_K", "10")?;
    if !shrinkage_k.is_finite() || shrinkage_k <= 0.0 {
        return Err(invalid(
            "VOICELOG_SHRINKAGE_K",
            format!("must be a positive finite number, got {shrinkage_k}"),
        ));
    }

    let min_bucket_n = parse_usize("VOICELOG_MIN_BUCKET_N", "5")?;
    let min_tag_n = parse_usize("VOICELOG_MIN_TAG_N", "5")?;

    let baseline_window = parse_usize("VOICELOG_BASELINE_WINDOW", "30")?;
    let min_baseline = parse_usize("VOICELOG_MIN_BASELINE", "10")?;
    if min_baseline == 0 {
        return Err(invalid("VOICELOG_MIN_BASELINE", "must be at least 1".into()));
    }
    if min_baseline > baseline_window {
        return Err(invalid(
            "VOICELOG_MIN_BASELINE",
            format!("({min_baseline}) must not exceed VOICELOG_BASELINE_WINDOW ({baseline_window})"),
        ));
    }

    let period_days = parse_i64("VOICELOG_PERIOD_DAYS", "28")?;
    if !(1..=MAX_PERIOD_DAYS).contains(&period_days) {
        return Err(invalid(
            "VOICELOG_PERIOD_DAYS",
            format!("must be between 1 and {MAX_PERIOD_DAYS}, got {period_days}"),
        ));
    }

    let min_period_posts = parse_usize("VOICELOG_MIN_PERIOD_POSTS", "3")?;
    let min_trend_posts = parse_usize("VOICELOG_MIN_TREND_POSTS", "4")?;
    if min_trend_posts < 2 {
        return Err(invalid(
            "VOICELOG_MIN_TREND_POSTS",
            format!("must be at least 2 so both halves are populated, got {min_trend_posts}"),
        ));
    }

    let utc_offset_minutes = parse_i32("VOICELOG_UTC_OFFSET_MINUTES", "0")?;
    if utc_offset_minutes.abs() >= 24 * 60 {
        return Err(invalid(
            "VOICELOG_UTC_OFFSET_MINUTES",
            format!("must be within ±1439 minutes, got {utc_offset_minutes}"),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        vocabulary_path,
        analytics: AnalyticsConfig {
            shrinkage_k,
            min_bucket_n,
            min_tag_n,
            baseline_window,
            min_baseline,
            period_days,
            min_period_posts,
            min_trend_posts,
            utc_offset_minutes,
        },
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VOICELOG_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
