use leadscout_core::{ErrorClass, Retryable};
use leadscout_places::PlacesError;
use leadscout_scraper::ScrapeError;
use thiserror::Error;

/// Errors surfaced by the unified pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required argument was empty or blank; raised before any I/O.
    #[error("required field is empty: {field}")]
    EmptyField { field: &'static str },

    /// No API key is configured and scraping is disabled.
    #[error("no search methods available: configure an API key or enable scraping")]
    NoSearchMethods,

    /// The given detail identifier has no client able to serve it.
    #[error("no details source available: {reason}")]
    NoDetailsSource { reason: &'static str },

    #[error(transparent)]
    Places(#[from] PlacesError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

impl Retryable for PipelineError {
    fn error_class(&self) -> ErrorClass {
        match self {
            PipelineError::Places(e) => e.error_class(),
            PipelineError::Scrape(e) => e.error_class(),
            PipelineError::EmptyField { .. }
            | PipelineError::NoSearchMethods
            | PipelineError::NoDetailsSource { .. } => ErrorClass::Permanent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_class() {
        let err = PipelineError::from(PlacesError::RateLimited);
        assert_eq!(err.error_class(), ErrorClass::TransientRateLimit);

        let err = PipelineError::from(ScrapeError::PolicyDenied {
            path: "/maps".to_string(),
        });
        assert_eq!(err.error_class(), ErrorClass::Permanent);
    }

    #[test]
    fn pipeline_level_failures_are_permanent() {
        assert_eq!(
            PipelineError::NoSearchMethods.error_class(),
            ErrorClass::Permanent
        );
        assert_eq!(
            PipelineError::EmptyField { field: "query" }.error_class(),
            ErrorClass::Permanent
        );
    }
}
