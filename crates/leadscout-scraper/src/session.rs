//! Chromium session lifecycle: launch, page setup, teardown.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetBlockedUrLsParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use leadscout_core::ScrapingConfig;
use tokio::task::JoinHandle;

use crate::error::ScrapeError;

/// Heavy static assets are blocked on every page; only the DOM matters here.
const BLOCKED_URL_PATTERNS: &[&str] = &[
    "*.png",
    "*.jpg",
    "*.jpeg",
    "*.gif",
    "*.webp",
    "*.svg",
    "*.css",
    "*.woff",
    "*.woff2",
    "*.ttf",
    "*.mp4",
    "*.webm",
];

/// A launched browser plus the task pumping its CDP event stream.
pub(crate) struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub(crate) async fn launch(config: &ScrapingConfig) -> Result<Self, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(ScrapeError::browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(ScrapeError::browser)?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Opens a fresh page with the configured user-agent and asset blocking
    /// applied. Pages are per-operation; the session itself is reused.
    pub(crate) async fn open_page(&self, user_agent: &str) -> Result<Page, ScrapeError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(ScrapeError::browser)?;
        page.set_user_agent(user_agent)
            .await
            .map_err(ScrapeError::browser)?;
        let patterns = BLOCKED_URL_PATTERNS
            .iter()
            .map(|p| (*p).to_string())
            .collect();
        page.execute(SetBlockedUrLsParams::new(patterns))
            .await
            .map_err(ScrapeError::browser)?;
        Ok(page)
    }

    pub(crate) async fn shutdown(mut self) {
        if let Err(error) = self.browser.close().await {
            tracing::debug!(%error, "browser close failed during shutdown");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}
