use crate::app_config::{AppConfig, ConfigError, RateLimitConfig, ScrapingConfig};

const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com";
const DEFAULT_SCRAPE_BASE_URL: &str = "https://www.google.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
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
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected true/false, got \"{other}\""),
            }),
        }
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

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    // Blank credentials are treated as absent so an empty var in a .env
    // template does not masquerade as a configured key.
    let places_api_key = lookup("LEADSCOUT_PLACES_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    let prefer_api = parse_bool("LEADSCOUT_PREFER_API", "true")?;
    let places_base_url = or_default("LEADSCOUT_PLACES_BASE_URL", DEFAULT_PLACES_BASE_URL);
    let places_timeout_secs = parse_u64("LEADSCOUT_PLACES_TIMEOUT_SECS", "30")?;

    let scraping = ScrapingConfig {
        enabled: parse_bool("LEADSCOUT_SCRAPING_ENABLED", "true")?,
        base_url: or_default("LEADSCOUT_SCRAPE_BASE_URL", DEFAULT_SCRAPE_BASE_URL),
        headless: parse_bool("LEADSCOUT_SCRAPE_HEADLESS", "true")?,
        timeout_ms: parse_u64("LEADSCOUT_SCRAPE_TIMEOUT_MS", "30000")?,
        max_retries: parse_u32("LEADSCOUT_SCRAPE_MAX_RETRIES", "2")?,
        respect_robots: parse_bool("LEADSCOUT_SCRAPE_RESPECT_ROBOTS", "true")?,
        user_agent: or_default(
            "LEADSCOUT_SCRAPE_USER_AGENT",
            "leadscout/0.1 (prospect-discovery)",
        ),
        viewport_width: parse_u32("LEADSCOUT_SCRAPE_VIEWPORT_WIDTH", "1366")?,
        viewport_height: parse_u32("LEADSCOUT_SCRAPE_VIEWPORT_HEIGHT", "768")?,
    };

    let requests_per_second = parse_f64("LEADSCOUT_RATE_LIMIT_RPS", "2")?;
    if requests_per_second <= 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADSCOUT_RATE_LIMIT_RPS".to_string(),
            reason: format!("must be positive, got {requests_per_second}"),
        });
    }

    let backoff_multiplier = parse_f64("LEADSCOUT_RATE_LIMIT_BACKOFF_MULTIPLIER", "2")?;
    if backoff_multiplier < 1.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADSCOUT_RATE_LIMIT_BACKOFF_MULTIPLIER".to_string(),
            reason: format!("must be >= 1, got {backoff_multiplier}"),
        });
    }

    let rate_limit = RateLimitConfig {
        requests_per_second,
        max_retries: parse_u32("LEADSCOUT_RATE_LIMIT_MAX_RETRIES", "3")?,
        base_delay_ms: parse_u64("LEADSCOUT_RATE_LIMIT_BASE_DELAY_MS", "1000")?,
        max_delay_ms: parse_u64("LEADSCOUT_RATE_LIMIT_MAX_DELAY_MS", "30000")?,
        backoff_multiplier,
    };

    Ok(AppConfig {
        places_api_key,
        prefer_api,
        places_base_url,
        places_timeout_secs,
        scraping,
        rate_limit,
    })
}
