//! Selectors and text parsing for map search result cards and detail pages.
//!
//! The DOM side of extraction lives in the client; everything here is pure
//! string work so it can be tested without a browser.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Container that signals the results page has rendered.
pub(crate) const RESULTS_FEED: &str = "div[role='feed']";
/// One result card inside the feed.
pub(crate) const RESULT_CARD: &str = "div[role='article']";
/// Detail page anchor; its absence means no business at the URL.
pub(crate) const DETAIL_NAME: &str = "h1";
pub(crate) const DETAIL_ADDRESS: &str = "button[data-item-id='address']";
pub(crate) const DETAIL_PHONE: &str = "button[data-item-id^='phone']";
pub(crate) const DETAIL_WEBSITE: &str = "a[data-item-id='authority']";
pub(crate) const DETAIL_RATING: &str = "span[role='img']";

/// Fields parsed out of one result card's visible text.
#[derive(Debug, PartialEq)]
pub(crate) struct CardFields {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub categories: Vec<String>,
    pub price_level: Option<u8>,
}

/// Builds the maps search URL for a query/location pair. The two are
/// space-joined, percent-encoded, and spaces render as `+`.
pub(crate) fn search_url(base_url: &str, query: &str, location: &str) -> String {
    let term = format!("{} {}", query.trim(), location.trim());
    let encoded = utf8_percent_encode(&term, NON_ALPHANUMERIC)
        .to_string()
        .replace("%20", "+");
    format!("{base_url}/maps/search/{encoded}")
}

/// Parses a leading decimal number, e.g. `"4.6 stars"` -> `4.6`.
pub(crate) fn parse_rating(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Parses a review count from noisy text by keeping only digits, so
/// `"(1,234)"` -> `1234`. No digits at all yields `None`, never zero.
pub(crate) fn parse_review_count(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parses the visible text of one result card. The first line is the name;
/// the rating line looks like `4.6(310) · $$ · Breakfast`; the address is the
/// first remaining line mixing digits and letters. Cards without both a name
/// and an address yield `None`.
pub(crate) fn parse_card_text(text: &str) -> Option<CardFields> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let name = (*lines.first()?).to_string();
    let address = pick_address_line(&lines)?;

    let rating_line = lines.iter().copied().find(|line| is_rating_line(line));
    let rating = rating_line.and_then(parse_rating);
    let review_count = rating_line
        .and_then(|line| line.split_once('('))
        .and_then(|(_, rest)| parse_review_count(rest));
    let categories = rating_line
        .map(|line| {
            line.split('·')
                .skip(1)
                .map(str::trim)
                .filter(|seg| !seg.is_empty() && seg.chars().any(char::is_alphabetic))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let price_level = rating_line.and_then(|line| {
        line.split('·')
            .map(str::trim)
            .find(|seg| !seg.is_empty() && seg.chars().all(|c| c == '$'))
            .and_then(|seg| u8::try_from(seg.len()).ok())
    });

    Some(CardFields {
        name,
        address,
        rating,
        review_count,
        categories,
        price_level,
    })
}

fn is_rating_line(line: &str) -> bool {
    line.contains('(') && matches!(parse_rating(line), Some(r) if (0.0..=5.0).contains(&r))
}

fn pick_address_line(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .skip(1)
        .copied()
        .filter(|line| !is_rating_line(line))
        .find(|line| {
            line.chars().any(|c| c.is_ascii_digit()) && line.chars().any(char::is_alphabetic)
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_joins_and_encodes() {
        let url = search_url("https://www.google.com", "coffee shops", "Portland, OR");
        assert_eq!(
            url,
            "https://www.google.com/maps/search/coffee+shops+Portland%2C+OR"
        );
    }

    #[test]
    fn search_url_renders_spaces_as_plus_only() {
        let url = search_url("https://www.google.com", "bars & grills", "Austin TX");
        assert!(!url.contains("%20"));
        assert!(url.contains("bars+%26+grills"));
    }

    #[test]
    fn rating_parses_leading_float() {
        assert_eq!(parse_rating("4.6 stars"), Some(4.6));
        assert_eq!(parse_rating("4.6(310) · Breakfast"), Some(4.6));
        assert_eq!(parse_rating("Breakfast"), None);
        assert_eq!(parse_rating(""), None);
    }

    #[test]
    fn review_count_strips_noise() {
        assert_eq!(parse_review_count("(1,234)"), Some(1234));
        assert_eq!(parse_review_count("310 reviews"), Some(310));
        assert_eq!(parse_review_count("no reviews yet"), None);
        assert_eq!(parse_review_count(""), None);
    }

    #[test]
    fn card_text_parses_all_fields() {
        let text = "Griddle House\n4.6(310) · $$ · Breakfast\n12 Oak St\nOpen · Closes 2 PM";
        let fields = parse_card_text(text).expect("complete card should parse");
        assert_eq!(fields.name, "Griddle House");
        assert_eq!(fields.address, "12 Oak St");
        assert_eq!(fields.rating, Some(4.6));
        assert_eq!(fields.review_count, Some(310));
        assert_eq!(fields.categories, vec!["Breakfast".to_string()]);
        assert_eq!(fields.price_level, Some(2));
    }

    #[test]
    fn card_without_address_yields_none() {
        assert!(parse_card_text("Griddle House\n4.6(310) · Breakfast").is_none());
        assert!(parse_card_text("").is_none());
    }

    #[test]
    fn card_without_rating_line_still_parses() {
        let fields = parse_card_text("Griddle House\n12 Oak St").expect("should parse");
        assert_eq!(fields.rating, None);
        assert_eq!(fields.review_count, None);
        assert!(fields.categories.is_empty());
    }

    #[test]
    fn address_line_with_low_street_number_is_not_a_rating() {
        let text = "Corner Cafe\n4.0(12) · Cafe\n4 Elm St";
        let fields = parse_card_text(text).expect("should parse");
        assert_eq!(fields.address, "4 Elm St");
        assert_eq!(fields.rating, Some(4.0));
    }
}
