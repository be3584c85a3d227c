use leadscout_core::{ErrorClass, Retryable};
use thiserror::Error;

/// Fixed user-facing message for rate-limit rejections, regardless of whether
/// they arrived as HTTP 429 or as an API-level over-quota status.
pub const RATE_LIMIT_MESSAGE: &str = "places API rate limit exceeded — slow down requests";

/// Errors returned by the places API client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Construction was attempted with an empty or blank credential.
    #[error("places API key is missing or empty")]
    MissingApiKey,

    /// A required argument was empty or blank; raised before any I/O.
    #[error("required field is empty: {field}")]
    EmptyField { field: &'static str },

    /// Construction was attempted with an unparseable base URL.
    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429 or API status `OVER_QUERY_LIMIT`, normalized to one message.
    #[error("{RATE_LIMIT_MESSAGE}")]
    RateLimited,

    /// The source denied the request; carries the source's own message.
    #[error("places API request denied: {message}")]
    RequestDenied { message: String },

    /// Details lookup for an unknown place.
    #[error("place not found: {place_id}")]
    NotFound { place_id: String },

    /// Any other non-success API-level status.
    #[error("unexpected places API status \"{status}\"")]
    UnexpectedStatus { status: String },

    /// Non-2xx HTTP response that is not a rate limit.
    #[error("unexpected HTTP status {status} from {url}")]
    TransportStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Retryable for PlacesError {
    fn error_class(&self) -> ErrorClass {
        match self {
            PlacesError::RateLimited => ErrorClass::TransientRateLimit,
            PlacesError::Http(e) if e.is_timeout() || e.is_connect() => {
                ErrorClass::TransientNetwork
            }
            // 503/504 are transient infrastructure failures; other statuses
            // (auth, 4xx) will not change on retry.
            PlacesError::TransportStatus { status: 503 | 504, .. } => ErrorClass::TransientNetwork,
            PlacesError::MissingApiKey
            | PlacesError::EmptyField { .. }
            | PlacesError::InvalidBaseUrl { .. }
            | PlacesError::Http(_)
            | PlacesError::RequestDenied { .. }
            | PlacesError::NotFound { .. }
            | PlacesError::UnexpectedStatus { .. }
            | PlacesError::TransportStatus { .. }
            | PlacesError::Deserialize { .. } => ErrorClass::Permanent,
        }
    }
}
