//! HTTP client for the structured places API.
//!
//! Wraps `reqwest` with places-specific error handling, credential
//! management, and typed response deserialization. Every endpoint checks the
//! `"status"` field in the JSON envelope and surfaces API-level failures as
//! typed [`PlacesError`] variants; HTTP 429 is folded into the same
//! normalized rate-limit error as the API's own over-quota status.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leadscout_core::{BusinessDetails, BusinessRecord, RequestPacer};
use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::error::PlacesError;
use crate::normalize::{details_from_raw, record_from_raw};
use crate::types::{DetailsResponse, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const SEARCH_PATH: &str = "maps/api/place/textsearch/json";
const DETAILS_PATH: &str = "maps/api/place/details/json";

/// Minimum spacing applied by the private fallback pacer when no shared
/// limiter is injected.
const FALLBACK_MIN_INTERVAL_MS: u64 = 200;

/// Client for the structured places API.
///
/// Manages the HTTP client, credential, base URL and pacing dependency. Use
/// [`PlacesClient::new`] for production, [`PlacesClient::with_base_url`] to
/// point at a mock server in tests, and [`PlacesClient::with_pacer`] to share
/// the pipeline-wide rate limiter.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    pacer: Arc<dyn RequestPacer>,
}

impl PlacesClient {
    /// Creates a new client pointed at the production places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::MissingApiKey`] if the credential is empty or
    /// blank, or [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::new`], plus [`PlacesError::UnexpectedStatus`]
    /// if `base_url` is not parseable.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        if api_key.trim().is_empty() {
            return Err(PlacesError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("leadscout/0.1 (prospect-discovery)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so path
        // joins land under the root rather than replacing a segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            pacer: Arc::new(MinIntervalPacer::new(Duration::from_millis(
                FALLBACK_MIN_INTERVAL_MS,
            ))),
        })
    }

    /// Replaces the private fallback pacer with an injected one, typically
    /// the pipeline's shared rate limiter.
    #[must_use]
    pub fn with_pacer(mut self, pacer: Arc<dyn RequestPacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Searches for businesses matching `query` near `location`.
    ///
    /// The two arguments are combined into a single `"{query} in {location}"`
    /// search string. Hits missing any of {identifier, name, address, both
    /// coordinates} are silently dropped.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::EmptyField`] if either argument is blank (no I/O).
    /// - [`PlacesError::RequestDenied`] with the source's message on
    ///   `REQUEST_DENIED`.
    /// - [`PlacesError::RateLimited`] on HTTP 429 or `OVER_QUERY_LIMIT`.
    /// - [`PlacesError::UnexpectedStatus`] on any other non-success status.
    /// - [`PlacesError::Http`] / [`PlacesError::TransportStatus`] /
    ///   [`PlacesError::Deserialize`] on transport and decoding failures.
    ///
    /// `ZERO_RESULTS` is not an error: it yields an empty list.
    pub async fn search_businesses(
        &self,
        query: &str,
        location: &str,
    ) -> Result<Vec<BusinessRecord>, PlacesError> {
        if query.trim().is_empty() {
            return Err(PlacesError::EmptyField { field: "query" });
        }
        if location.trim().is_empty() {
            return Err(PlacesError::EmptyField { field: "location" });
        }

        self.pacer.await_turn().await;

        let search_term = format!("{query} in {location}");
        let url = self.build_url(SEARCH_PATH, &[("query", &search_term), ("type", "establishment")]);
        let body = self.request_json(url.clone()).await?;

        let envelope: SearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("text search for \"{search_term}\""),
                source: e,
            })?;

        match envelope.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            "REQUEST_DENIED" => {
                return Err(PlacesError::RequestDenied {
                    message: envelope
                        .error_message
                        .unwrap_or_else(|| "no error message provided".to_string()),
                });
            }
            "OVER_QUERY_LIMIT" => return Err(PlacesError::RateLimited),
            other => {
                return Err(PlacesError::UnexpectedStatus {
                    status: other.to_string(),
                });
            }
        }

        let total = envelope.results.len();
        let records: Vec<BusinessRecord> = envelope
            .results
            .into_iter()
            .filter_map(record_from_raw)
            .collect();

        if records.len() < total {
            tracing::debug!(
                dropped = total - records.len(),
                kept = records.len(),
                "dropped search hits missing minimum viable fields"
            );
        }

        Ok(records)
    }

    /// Fetches full details for a place by its identifier.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::EmptyField`] if `place_id` is blank (no I/O).
    /// - [`PlacesError::NotFound`] on API status `NOT_FOUND`, or when the
    ///   payload lacks a usable name/address.
    /// - [`PlacesError::RequestDenied`] with the source's message on
    ///   `REQUEST_DENIED`.
    /// - [`PlacesError::RateLimited`] on HTTP 429 or `OVER_QUERY_LIMIT`.
    /// - [`PlacesError::UnexpectedStatus`] on any other non-success status.
    pub async fn get_business_details(
        &self,
        place_id: &str,
    ) -> Result<BusinessDetails, PlacesError> {
        if place_id.trim().is_empty() {
            return Err(PlacesError::EmptyField { field: "place_id" });
        }

        self.pacer.await_turn().await;

        let url = self.build_url(DETAILS_PATH, &[("place_id", place_id)]);
        let body = self.request_json(url).await?;

        let envelope: DetailsResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details for place {place_id}"),
                source: e,
            })?;

        match envelope.status.as_str() {
            "OK" => {}
            "NOT_FOUND" => {
                return Err(PlacesError::NotFound {
                    place_id: place_id.to_string(),
                });
            }
            "REQUEST_DENIED" => {
                return Err(PlacesError::RequestDenied {
                    message: envelope
                        .error_message
                        .unwrap_or_else(|| "no error message provided".to_string()),
                });
            }
            "OVER_QUERY_LIMIT" => return Err(PlacesError::RateLimited),
            other => {
                return Err(PlacesError::UnexpectedStatus {
                    status: other.to_string(),
                });
            }
        }

        envelope
            .result
            .and_then(|raw| details_from_raw(raw, place_id))
            .ok_or_else(|| PlacesError::NotFound {
                place_id: place_id.to_string(),
            })
    }

    /// Builds the full request URL with the credential and percent-encoded
    /// query parameters.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        // The base URL is normalised to end with '/', so join cannot fail on
        // these fixed relative paths.
        if let Ok(joined) = url.join(path) {
            url = joined;
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
        }
        url
    }

    /// Issues the GET and translates transport-level failures into typed
    /// errors. 429 becomes the normalized rate-limit error here, distinct
    /// from other non-2xx statuses.
    async fn request_json(&self, url: Url) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PlacesError::RateLimited);
        }
        if !status.is_success() {
            return Err(PlacesError::TransportStatus {
                status: status.as_u16(),
                url: redact_key(url.as_str()),
            });
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}

/// Strips the credential query value before a URL lands in an error message.
fn redact_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let filtered: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    if k == "key" {
                        (k.into_owned(), "REDACTED".to_string())
                    } else {
                        (k.into_owned(), v.into_owned())
                    }
                })
                .collect();
            parsed.query_pairs_mut().clear().extend_pairs(filtered);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// Private minimal pacing strategy: spaces requests by a fixed interval.
///
/// Used only when no shared limiter is injected, so the client stays
/// independently testable without implicit global state.
struct MinIntervalPacer {
    last: Mutex<Option<tokio::time::Instant>>,
    min_interval: Duration,
}

impl MinIntervalPacer {
    fn new(min_interval: Duration) -> Self {
        Self {
            last: Mutex::new(None),
            min_interval,
        }
    }
}

#[async_trait]
impl RequestPacer for MinIntervalPacer {
    async fn await_turn(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            tokio::time::sleep_until(prev + self.min_interval).await;
        }
        *last = Some(tokio::time::Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_fails_construction() {
        assert!(matches!(
            PlacesClient::new("", 30),
            Err(PlacesError::MissingApiKey)
        ));
        assert!(matches!(
            PlacesClient::new("   ", 30),
            Err(PlacesError::MissingApiKey)
        ));
    }

    #[test]
    fn build_url_appends_key_and_params() {
        let client = PlacesClient::with_base_url("test-key", 30, "https://example.com").unwrap();
        let url = client.build_url(SEARCH_PATH, &[("query", "coffee in Portland, OR")]);
        let query = url.query().unwrap();
        assert!(query.contains("key=test-key"));
        assert!(query.contains("query=coffee+in+Portland%2C+OR"));
        assert!(url.path().ends_with("/maps/api/place/textsearch/json"));
    }

    #[test]
    fn redact_key_hides_credential() {
        let redacted = redact_key("https://example.com/api?key=secret&query=coffee");
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("key=REDACTED"));
        assert!(redacted.contains("query=coffee"));
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_pacer_spaces_requests() {
        let pacer = MinIntervalPacer::new(Duration::from_millis(200));
        let start = tokio::time::Instant::now();
        pacer.await_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO, "first turn is immediate");
        pacer.await_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
