//! Application configuration types.
//!
//! Built once by [`crate::config::load_app_config`] and passed by value to the
//! pipeline at construction; nothing reads the environment after load.

use thiserror::Error;

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Credential for the structured places source. `None` disables that
    /// client entirely.
    pub places_api_key: Option<String>,
    /// Default source preference when a call does not override it.
    pub prefer_api: bool,
    pub places_base_url: String,
    pub places_timeout_secs: u64,
    pub scraping: ScrapingConfig,
    pub rate_limit: RateLimitConfig,
}

/// Scraping-source client configuration.
#[derive(Debug, Clone)]
pub struct ScrapingConfig {
    pub enabled: bool,
    pub base_url: String,
    pub headless: bool,
    /// Upper bound on waiting for page content to render.
    pub timeout_ms: u64,
    /// Retry cap for the scraping path in the orchestrator.
    pub max_retries: u32,
    pub respect_robots: bool,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

/// Shared pacing-queue and backoff configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Queue drain rate; callers are released every `1000 / rps` ms.
    /// Must be positive.
    pub requests_per_second: f64,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

/// Errors raised while loading configuration from the environment. Every
/// variable has a default, so only present-but-invalid values fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
