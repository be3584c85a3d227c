use leadscout_core::{ErrorClass, Retryable};
use thiserror::Error;

/// Errors returned by the scraping client.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A required argument was empty or blank; raised before any I/O.
    #[error("required field is empty: {field}")]
    EmptyField { field: &'static str },

    /// The site's robots policy disallows the path we would scrape.
    #[error("scraping disallowed by robots policy (Disallow: {path})")]
    PolicyDenied { path: String },

    /// Failure building the HTTP client used for the robots fetch.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Browser or CDP failure; the class is assigned from the raw message at
    /// the point of translation.
    #[error("browser error: {message}")]
    Browser { message: String, class: ErrorClass },

    /// Navigation to a concrete URL failed.
    #[error("navigation to {url} failed: {message}")]
    Navigation {
        url: String,
        message: String,
        class: ErrorClass,
    },

    /// The awaited selector never appeared within the configured window.
    #[error("timeout after {waited_ms}ms waiting for selector \"{selector}\"")]
    Timeout {
        selector: &'static str,
        waited_ms: u64,
    },

    /// The detail page rendered but yielded no business name.
    #[error("no business details found at {url}")]
    DetailsNotFound { url: String },
}

impl ScrapeError {
    pub(crate) fn browser(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        let class = classify_message(&message);
        ScrapeError::Browser { message, class }
    }

    pub(crate) fn navigation(url: &str, err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        let class = classify_message(&message);
        ScrapeError::Navigation {
            url: url.to_string(),
            message,
            class,
        }
    }
}

// Substring matching is case-sensitive: CDP and transport layers emit these
// tokens lowercased.
fn classify_message(message: &str) -> ErrorClass {
    if message.contains("timeout") || message.contains("network") {
        ErrorClass::TransientNetwork
    } else {
        ErrorClass::Permanent
    }
}

impl Retryable for ScrapeError {
    fn error_class(&self) -> ErrorClass {
        match self {
            ScrapeError::Timeout { .. } => ErrorClass::TransientNetwork,
            ScrapeError::Browser { class, .. } | ScrapeError::Navigation { class, .. } => *class,
            ScrapeError::EmptyField { .. }
            | ScrapeError::PolicyDenied { .. }
            | ScrapeError::Http(_)
            | ScrapeError::DetailsNotFound { .. } => ErrorClass::Permanent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_timeout_is_transient() {
        let err = ScrapeError::Timeout {
            selector: "div[role='feed']",
            waited_ms: 30_000,
        };
        assert_eq!(err.error_class(), ErrorClass::TransientNetwork);
    }

    #[test]
    fn browser_message_with_timeout_token_is_transient() {
        let err = ScrapeError::browser("request timeout reached");
        assert_eq!(err.error_class(), ErrorClass::TransientNetwork);
    }

    #[test]
    fn browser_message_with_network_token_is_transient() {
        let err = ScrapeError::navigation("https://example.com", "network change detected");
        assert_eq!(err.error_class(), ErrorClass::TransientNetwork);
    }

    #[test]
    fn token_match_is_case_sensitive() {
        let err = ScrapeError::browser("Timeout reached");
        assert_eq!(err.error_class(), ErrorClass::Permanent);
    }

    #[test]
    fn policy_denial_is_permanent() {
        let err = ScrapeError::PolicyDenied {
            path: "/maps".to_string(),
        };
        assert_eq!(err.error_class(), ErrorClass::Permanent);
    }

    #[test]
    fn missing_details_are_permanent() {
        let err = ScrapeError::DetailsNotFound {
            url: "https://example.com/maps/place/x".to_string(),
        };
        assert_eq!(err.error_class(), ErrorClass::Permanent);
    }
}
