//! Headless-browser scraping client for map search results.
//!
//! Drives a Chromium session over CDP to run map searches and detail-page
//! lookups when no structured API is available. Honors the target site's
//! robots policy before any navigation happens.

pub mod client;
pub mod error;
mod extract;
mod robots;
mod session;

pub use client::MapScraper;
pub use error::ScrapeError;
