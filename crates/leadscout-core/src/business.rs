//! Canonical business shapes shared by both retrieval sources.
//!
//! ## Field presence
//! `name` and `address` are always present and non-empty — both source
//! clients drop raw entries that cannot satisfy that before mapping.
//! Everything else is best-effort: the structured API fills identifiers and
//! coordinates reliably but never phone/website on search hits, while the
//! scraper fills whatever the rendered page exposed. Absent means the source
//! did not return it; fields are never fabricated across sources.

use serde::{Deserialize, Serialize};

/// Which retrieval path produced a record.
///
/// Serializes to `"api"` / `"scraper"` so downstream consumers can key on
/// provenance without knowing the client types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Api,
    Scraper,
}

/// A single candidate business, normalized from either source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRecord {
    /// Stable identifier from the structured source. `None` for scraped hits.
    pub place_id: Option<String>,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// 0–5 scale; exact semantics depend on the source.
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Source-native status string, e.g. `"OPERATIONAL"`.
    pub business_status: Option<String>,
    pub price_level: Option<u8>,
    pub source: SearchSource,
}

/// A full detail record: the summary fields plus hours, review excerpts and
/// photo references. Only populated with what the originating source
/// actually returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessDetails {
    #[serde(flatten)]
    pub record: BusinessRecord,
    #[serde(default)]
    pub opening_hours: Vec<String>,
    pub open_now: Option<bool>,
    #[serde(default)]
    pub reviews: Vec<ReviewExcerpt>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// A review excerpt copied verbatim from the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewExcerpt {
    pub rating: Option<f64>,
    pub text: String,
    /// Unix seconds, when the source provided a timestamp.
    pub time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: SearchSource) -> BusinessRecord {
        BusinessRecord {
            place_id: None,
            name: "Blue Bottle Coffee".to_string(),
            address: "300 Webster St, Oakland, CA".to_string(),
            latitude: Some(37.8),
            longitude: Some(-122.27),
            rating: Some(4.5),
            review_count: Some(812),
            phone: None,
            website: None,
            categories: vec!["cafe".to_string()],
            business_status: None,
            price_level: None,
            source,
        }
    }

    #[test]
    fn source_tag_serializes_lowercase() {
        let api = serde_json::to_value(record(SearchSource::Api)).unwrap();
        assert_eq!(api["source"], "api");
        let scraped = serde_json::to_value(record(SearchSource::Scraper)).unwrap();
        assert_eq!(scraped["source"], "scraper");
    }

    #[test]
    fn details_flatten_summary_fields() {
        let details = BusinessDetails {
            record: record(SearchSource::Api),
            opening_hours: vec!["Monday: 7 AM – 5 PM".to_string()],
            open_now: Some(true),
            reviews: vec![ReviewExcerpt {
                rating: Some(5.0),
                text: "great pour-over".to_string(),
                time: Some(1_700_000_000),
            }],
            photos: vec![],
        };
        let value = serde_json::to_value(&details).unwrap();
        // Summary fields sit at the top level, not under a nested key.
        assert_eq!(value["name"], "Blue Bottle Coffee");
        assert_eq!(value["open_now"], true);
        assert_eq!(value["reviews"][0]["text"], "great pour-over");
    }
}
