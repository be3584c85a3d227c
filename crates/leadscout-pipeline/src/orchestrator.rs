//! The unified search pipeline.
//!
//! Owns both sub-clients, a shared FIFO limiter, and the fallback decision:
//! one primary attempt (with its own retry cap), at most one hop to the
//! other source, and the final error propagated verbatim when both fail.

use std::sync::Arc;

use leadscout_core::{AppConfig, BusinessDetails, BusinessRecord, SearchSource};
use leadscout_places::PlacesClient;
use leadscout_scraper::{MapScraper, ScrapeError};

use crate::error::PipelineError;
use crate::rate_limit::{QueueStatus, RateLimiter};
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Default cap on returned search results.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Per-call knobs for a pipeline search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Overrides the configured source preference when set.
    pub prefer_api: Option<bool>,
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            prefer_api: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Unified entry point over the places API client and the map scraper.
pub struct SearchPipeline {
    config: AppConfig,
    limiter: RateLimiter,
    places: Option<PlacesClient>,
    scraper: Option<MapScraper>,
    api_retry: RetryPolicy,
    scrape_retry: RetryPolicy,
}

impl SearchPipeline {
    /// Wires up whichever sub-clients the config enables. A missing API key
    /// simply leaves the API client out; construction only fails on invalid
    /// client configuration.
    pub fn new(config: AppConfig) -> Result<Self, PipelineError> {
        let limiter = RateLimiter::new(config.rate_limit.requests_per_second);
        let pacer: Arc<dyn leadscout_core::RequestPacer> = Arc::new(limiter.clone());

        let places = match config.places_api_key.as_deref() {
            Some(key) => Some(
                PlacesClient::with_base_url(key, config.places_timeout_secs, &config.places_base_url)?
                    .with_pacer(Arc::clone(&pacer)),
            ),
            None => None,
        };
        let scraper = if config.scraping.enabled {
            Some(MapScraper::new(config.scraping.clone())?.with_pacer(Arc::clone(&pacer)))
        } else {
            None
        };

        let api_retry = RetryPolicy::from_config(&config.rate_limit);
        let scrape_retry = api_retry.clone().with_max_retries(config.scraping.max_retries);

        tracing::info!(
            api_enabled = places.is_some(),
            scraping_enabled = scraper.is_some(),
            prefer_api = config.prefer_api,
            "search pipeline ready"
        );

        Ok(Self {
            config,
            limiter,
            places,
            scraper,
            api_retry,
            scrape_retry,
        })
    }

    /// Searches for businesses matching `query` in `location`, trying the
    /// preferred source first and falling back to the other at most once.
    pub async fn search_businesses(
        &self,
        query: &str,
        location: &str,
        options: &SearchOptions,
    ) -> Result<Vec<BusinessRecord>, PipelineError> {
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyField { field: "query" });
        }
        if location.trim().is_empty() {
            return Err(PipelineError::EmptyField { field: "location" });
        }

        let prefer_api = options.prefer_api.unwrap_or(self.config.prefer_api);
        let plan = fallback_plan(prefer_api, self.places.is_some(), self.scraper.is_some());
        if plan.is_empty() {
            return Err(PipelineError::NoSearchMethods);
        }

        let mut last_err: Option<PipelineError> = None;
        for (index, source) in plan.iter().enumerate() {
            let result = match source {
                SearchSource::Api => self.search_via_api(query, location).await,
                SearchSource::Scraper => self.search_via_scraper(query, location).await,
            };
            match result {
                Ok(mut records) => {
                    records.truncate(options.max_results);
                    tracing::info!(
                        source = ?source,
                        count = records.len(),
                        "search completed"
                    );
                    return Ok(records);
                }
                Err(err) => {
                    // A robots denial is a deliberate refusal, not a source
                    // failure; it propagates without trying the other source.
                    if matches!(err, PipelineError::Scrape(ScrapeError::PolicyDenied { .. })) {
                        return Err(err);
                    }
                    if index + 1 < plan.len() {
                        tracing::warn!(
                            source = ?source,
                            next = ?plan[index + 1],
                            error = %err,
                            "search source failed; falling back"
                        );
                    }
                    last_err = Some(err);
                }
            }
        }
        // The plan was non-empty, so at least one attempt recorded an error.
        Err(last_err.unwrap_or(PipelineError::NoSearchMethods))
    }

    /// Looks up details for one business. A `place_id` routes to the API
    /// client first; on its failure the scrape path is attempted, but only
    /// when a detail-page `url` was also supplied and scraping is enabled.
    pub async fn get_business_details(
        &self,
        place_id: Option<&str>,
        url: Option<&str>,
    ) -> Result<BusinessDetails, PipelineError> {
        let place_id = place_id.filter(|id| !id.trim().is_empty());
        let url = url.filter(|u| !u.trim().is_empty());
        if place_id.is_none() && url.is_none() {
            return Err(PipelineError::EmptyField {
                field: "place_id or url",
            });
        }

        if let (Some(id), Some(client)) = (place_id, self.places.as_ref()) {
            match retry_with_backoff(&self.api_retry, || client.get_business_details(id)).await {
                Ok(details) => return Ok(details),
                Err(err) => {
                    if url.is_none() || self.scraper.is_none() {
                        return Err(err.into());
                    }
                    tracing::warn!(
                        error = %err,
                        "API details lookup failed; falling back to page scrape"
                    );
                }
            }
        }

        match (url, self.scraper.as_ref()) {
            (Some(url), Some(scraper)) => {
                let details =
                    retry_with_backoff(&self.scrape_retry, || scraper.get_business_details(url))
                        .await?;
                Ok(details)
            }
            (Some(_), None) => Err(PipelineError::NoDetailsSource {
                reason: "URL lookups need scraping enabled",
            }),
            (None, _) => Err(PipelineError::NoDetailsSource {
                reason: "place id lookups need a configured API key",
            }),
        }
    }

    /// Tears down the scraper's browser session, if one was launched.
    pub async fn cleanup(&self) {
        if let Some(scraper) = self.scraper.as_ref() {
            scraper.cleanup().await;
        }
    }

    /// Snapshot of the shared limiter queue.
    #[must_use]
    pub fn queue_status(&self) -> QueueStatus {
        self.limiter.queue_status()
    }

    async fn search_via_api(
        &self,
        query: &str,
        location: &str,
    ) -> Result<Vec<BusinessRecord>, PipelineError> {
        let Some(client) = self.places.as_ref() else {
            return Err(PipelineError::NoSearchMethods);
        };
        let records =
            retry_with_backoff(&self.api_retry, || client.search_businesses(query, location))
                .await?;
        Ok(records)
    }

    async fn search_via_scraper(
        &self,
        query: &str,
        location: &str,
    ) -> Result<Vec<BusinessRecord>, PipelineError> {
        let Some(scraper) = self.scraper.as_ref() else {
            return Err(PipelineError::NoSearchMethods);
        };
        let records = retry_with_backoff(&self.scrape_retry, || {
            scraper.search_businesses(query, location)
        })
        .await?;
        Ok(records)
    }
}

/// Attempt ordering for one search: the preferred available source first,
/// the other as the single fallback hop.
fn fallback_plan(prefer_api: bool, has_api: bool, has_scraper: bool) -> Vec<SearchSource> {
    match (has_api, has_scraper) {
        (false, false) => Vec::new(),
        (true, false) => vec![SearchSource::Api],
        (false, true) => vec![SearchSource::Scraper],
        (true, true) if prefer_api => vec![SearchSource::Api, SearchSource::Scraper],
        (true, true) => vec![SearchSource::Scraper, SearchSource::Api],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_preference_puts_api_first() {
        assert_eq!(
            fallback_plan(true, true, true),
            vec![SearchSource::Api, SearchSource::Scraper]
        );
    }

    #[test]
    fn scraper_preference_keeps_api_as_last_resort() {
        assert_eq!(
            fallback_plan(false, true, true),
            vec![SearchSource::Scraper, SearchSource::Api]
        );
    }

    #[test]
    fn missing_source_is_never_planned() {
        assert_eq!(fallback_plan(true, true, false), vec![SearchSource::Api]);
        assert_eq!(fallback_plan(false, true, false), vec![SearchSource::Api]);
        assert_eq!(fallback_plan(true, false, true), vec![SearchSource::Scraper]);
        assert!(fallback_plan(true, false, false).is_empty());
    }
}
