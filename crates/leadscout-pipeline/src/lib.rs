//! Unified search pipeline: shared request pacing, exponential backoff, and
//! single-shot fallback between the places API client and the map scraper.

pub mod error;
pub mod orchestrator;
pub mod rate_limit;
pub mod retry;

pub use error::PipelineError;
pub use orchestrator::{SearchOptions, SearchPipeline};
pub use rate_limit::{QueueStatus, RateLimiter};
pub use retry::{backoff_delay, retry_with_backoff, RetryPolicy};
