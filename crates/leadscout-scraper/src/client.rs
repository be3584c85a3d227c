//! Scraping client for map search results and business detail pages.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use leadscout_core::{
    BusinessDetails, BusinessRecord, RequestPacer, ScrapingConfig, SearchSource,
};
use tokio::sync::Mutex;

use crate::error::ScrapeError;
use crate::extract;
use crate::robots;
use crate::session::BrowserSession;

/// Paths whose exact-match disallowance blocks all scraping.
const BLOCKING_PATHS: &[&str] = &["/maps", "/"];

/// Polling step while waiting for a selector to appear.
const SELECTOR_POLL_MS: u64 = 250;

/// Headless-browser client for map searches.
///
/// The Chromium session launches lazily on first use and is reused across
/// operations; each operation runs on its own page. `cleanup` tears the
/// session down.
pub struct MapScraper {
    config: ScrapingConfig,
    base_url: String,
    http: reqwest::Client,
    pacer: Arc<dyn RequestPacer>,
    // Lock doubles as the single-flight launch guard: concurrent first
    // callers queue on it instead of racing a check-then-launch.
    session: Mutex<Option<BrowserSession>>,
}

impl MapScraper {
    /// Builds a scraper from the scraping section of the app config.
    pub fn new(config: ScrapingConfig) -> Result<Self, ScrapeError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            config,
            base_url,
            http,
            pacer: Arc::new(PassivePacer),
            session: Mutex::new(None),
        })
    }

    /// Replaces the pacer, typically with the orchestrator's shared limiter.
    #[must_use]
    pub fn with_pacer(mut self, pacer: Arc<dyn RequestPacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Searches the map results page for `query` in `location` and extracts
    /// one record per result card. Cards without both a name and an address
    /// are dropped.
    pub async fn search_businesses(
        &self,
        query: &str,
        location: &str,
    ) -> Result<Vec<BusinessRecord>, ScrapeError> {
        if query.trim().is_empty() {
            return Err(ScrapeError::EmptyField { field: "query" });
        }
        if location.trim().is_empty() {
            return Err(ScrapeError::EmptyField { field: "location" });
        }
        self.check_robots().await?;
        self.pacer.await_turn().await;

        let url = extract::search_url(&self.base_url, query, location);
        tracing::info!(%url, "scraping map search results");
        let page = self.open_page().await?;
        let result = self.run_search(&page, &url).await;
        if let Err(error) = page.close().await {
            tracing::debug!(%error, "page close failed after search");
        }
        result
    }

    /// Navigates straight to a business detail page and extracts one record.
    pub async fn get_business_details(&self, url: &str) -> Result<BusinessDetails, ScrapeError> {
        if url.trim().is_empty() {
            return Err(ScrapeError::EmptyField { field: "url" });
        }
        self.check_robots().await?;
        self.pacer.await_turn().await;

        tracing::info!(%url, "scraping business detail page");
        let page = self.open_page().await?;
        let result = self.run_details(&page, url).await;
        if let Err(error) = page.close().await {
            tracing::debug!(%error, "page close failed after details");
        }
        result
    }

    /// Shuts the browser session down. Safe to call repeatedly; the next
    /// operation relaunches on demand.
    pub async fn cleanup(&self) {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.take() {
            session.shutdown().await;
            tracing::info!("browser session closed");
        }
    }

    /// Fetches and evaluates robots.txt. Denial is permanent; a failed fetch
    /// is fail-open.
    pub(crate) async fn check_robots(&self) -> Result<(), ScrapeError> {
        if !self.config.respect_robots {
            return Ok(());
        }
        let robots_url = format!("{}/robots.txt", self.base_url);
        let body = match self.fetch_robots(&robots_url).await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(%error, url = %robots_url, "robots.txt fetch failed; proceeding");
                return Ok(());
            }
        };
        let policy = robots::parse_robots(&body);
        if let Some(path) = policy.blocks(&self.config.user_agent, BLOCKING_PATHS) {
            return Err(ScrapeError::PolicyDenied { path });
        }
        Ok(())
    }

    async fn fetch_robots(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        response.text().await
    }

    async fn open_page(&self) -> Result<Page, ScrapeError> {
        let mut guard = self.session.lock().await;
        let session = match guard.as_mut() {
            Some(session) => session,
            None => {
                tracing::info!(headless = self.config.headless, "launching browser session");
                guard.insert(BrowserSession::launch(&self.config).await?)
            }
        };
        session.open_page(&self.config.user_agent).await
    }

    async fn run_search(
        &self,
        page: &Page,
        url: &str,
    ) -> Result<Vec<BusinessRecord>, ScrapeError> {
        page.goto(url)
            .await
            .map_err(|e| ScrapeError::navigation(url, e))?;
        wait_for_selector(page, extract::RESULTS_FEED, self.config.timeout_ms).await?;

        let cards = page
            .find_elements(extract::RESULT_CARD)
            .await
            .map_err(ScrapeError::browser)?;
        let mut records = Vec::new();
        for card in cards {
            let Ok(Some(text)) = card.inner_text().await else {
                continue;
            };
            let Some(fields) = extract::parse_card_text(&text) else {
                tracing::debug!("dropping result card without name and address");
                continue;
            };
            records.push(BusinessRecord {
                place_id: None,
                name: fields.name,
                address: fields.address,
                latitude: None,
                longitude: None,
                rating: fields.rating,
                review_count: fields.review_count,
                phone: None,
                website: None,
                categories: fields.categories,
                business_status: None,
                price_level: fields.price_level,
                source: SearchSource::Scraper,
            });
        }
        tracing::info!(count = records.len(), "extracted scraped records");
        Ok(records)
    }

    async fn run_details(&self, page: &Page, url: &str) -> Result<BusinessDetails, ScrapeError> {
        page.goto(url)
            .await
            .map_err(|e| ScrapeError::navigation(url, e))?;
        wait_for_selector(page, extract::DETAIL_NAME, self.config.timeout_ms).await?;

        let name = element_text(page, extract::DETAIL_NAME).await;
        let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
            return Err(ScrapeError::DetailsNotFound {
                url: url.to_string(),
            });
        };

        let address = element_text(page, extract::DETAIL_ADDRESS)
            .await
            .unwrap_or_default();
        let phone = element_text(page, extract::DETAIL_PHONE).await;
        let website = element_attribute(page, extract::DETAIL_WEBSITE, "href").await;
        let rating = element_attribute(page, extract::DETAIL_RATING, "aria-label")
            .await
            .as_deref()
            .and_then(extract::parse_rating)
            .filter(|r| (0.0..=5.0).contains(r));

        Ok(BusinessDetails {
            record: BusinessRecord {
                place_id: None,
                name,
                address,
                latitude: None,
                longitude: None,
                rating,
                review_count: None,
                phone,
                website,
                categories: Vec::new(),
                business_status: None,
                price_level: None,
                source: SearchSource::Scraper,
            },
            opening_hours: Vec::new(),
            open_now: None,
            reviews: Vec::new(),
            photos: Vec::new(),
        })
    }
}

/// Polls for a selector until it appears or the deadline passes. A miss is a
/// `Timeout` failure; this function never retries past the deadline.
async fn wait_for_selector(
    page: &Page,
    selector: &'static str,
    timeout_ms: u64,
) -> Result<(), ScrapeError> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        if page.find_element(selector).await.is_ok() {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(ScrapeError::Timeout {
                selector,
                waited_ms: timeout_ms,
            });
        }
        tokio::time::sleep(Duration::from_millis(SELECTOR_POLL_MS)).await;
    }
}

async fn element_text(page: &Page, selector: &str) -> Option<String> {
    let element: Element = page.find_element(selector).await.ok()?;
    element
        .inner_text()
        .await
        .ok()
        .flatten()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

async fn element_attribute(page: &Page, selector: &str, attribute: &str) -> Option<String> {
    let element: Element = page.find_element(selector).await.ok()?;
    element
        .attribute(attribute)
        .await
        .ok()
        .flatten()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Default pacer when no shared limiter is wired in: navigation is already
/// the slow path, so it imposes no delay.
struct PassivePacer;

#[async_trait]
impl RequestPacer for PassivePacer {
    async fn await_turn(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(base_url: &str, respect_robots: bool) -> ScrapingConfig {
        ScrapingConfig {
            enabled: true,
            base_url: base_url.to_string(),
            headless: true,
            timeout_ms: 5_000,
            max_retries: 2,
            respect_robots,
            user_agent: "leadscout/0.1 (prospect-discovery)".to_string(),
            viewport_width: 1366,
            viewport_height: 768,
        }
    }

    #[tokio::test]
    async fn robots_disallow_denies_before_any_navigation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /maps\n"),
            )
            .mount(&server)
            .await;

        let scraper = MapScraper::new(config_for(&server.uri(), true)).expect("client builds");
        let err = scraper.check_robots().await.expect_err("must be denied");
        assert!(
            matches!(err, ScrapeError::PolicyDenied { ref path } if path == "/maps"),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn robots_for_other_agents_does_not_deny() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("User-agent: Googlebot\nDisallow: /maps\n"),
            )
            .mount(&server)
            .await;

        let scraper = MapScraper::new(config_for(&server.uri(), true)).expect("client builds");
        scraper.check_robots().await.expect("should pass the gate");
    }

    #[tokio::test]
    async fn robots_fetch_failure_is_fail_open() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let scraper = MapScraper::new(config_for(&server.uri(), true)).expect("client builds");
        scraper.check_robots().await.expect("404 must fail open");
    }

    #[tokio::test]
    async fn robots_check_is_skipped_when_disabled() {
        let server = MockServer::start().await;
        // A fetch reaching the server fails the test on drop.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let scraper = MapScraper::new(config_for(&server.uri(), false)).expect("client builds");
        scraper.check_robots().await.expect("gate disabled");
    }
}
