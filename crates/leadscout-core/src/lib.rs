//! Shared domain types, configuration, and retry classification for the
//! leadscout workspace.

pub mod app_config;
pub mod business;
pub mod classify;
pub mod config;
pub mod pacing;

pub use app_config::{AppConfig, ConfigError, RateLimitConfig, ScrapingConfig};
pub use business::{BusinessDetails, BusinessRecord, ReviewExcerpt, SearchSource};
pub use classify::{ErrorClass, Retryable};
pub use config::{load_app_config, load_app_config_from_env};
pub use pacing::RequestPacer;
