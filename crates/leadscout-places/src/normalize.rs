//! Normalization from raw places API shapes to the canonical record types.
//!
//! Search hits missing any of the minimum viable fields (identifier, name,
//! formatted address, both coordinates) are dropped silently — the caller
//! gets the survivors, never partial records.

use leadscout_core::{BusinessDetails, BusinessRecord, ReviewExcerpt, SearchSource};

use crate::types::{RawPlace, RawPlaceDetails};

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Maps a raw search hit into a canonical record, or `None` when the hit
/// lacks the minimum viable field set.
pub(crate) fn record_from_raw(raw: RawPlace) -> Option<BusinessRecord> {
    let place_id = non_blank(raw.place_id)?;
    let name = non_blank(raw.name)?;
    let address = non_blank(raw.formatted_address)?;
    let location = raw.geometry?.location?;
    let latitude = location.lat?;
    let longitude = location.lng?;

    Some(BusinessRecord {
        place_id: Some(place_id),
        name,
        address,
        latitude: Some(latitude),
        longitude: Some(longitude),
        rating: raw.rating,
        review_count: raw.user_ratings_total,
        phone: None,
        website: None,
        categories: raw.types,
        business_status: raw.business_status,
        price_level: raw.price_level,
        source: SearchSource::Api,
    })
}

/// Maps a raw details payload into the canonical details shape, or `None`
/// when the payload lacks a usable name or address.
pub(crate) fn details_from_raw(raw: RawPlaceDetails, place_id: &str) -> Option<BusinessDetails> {
    let name = non_blank(raw.name)?;
    let address = non_blank(raw.formatted_address)?;
    let location = raw.geometry.and_then(|g| g.location);
    let (latitude, longitude) = location
        .map(|l| (l.lat, l.lng))
        .unwrap_or((None, None));

    let (open_now, opening_hours) = match raw.opening_hours {
        Some(hours) => (hours.open_now, hours.weekday_text),
        None => (None, Vec::new()),
    };

    // Review excerpts are copied verbatim; entries with no text carry an
    // empty string rather than being dropped, matching the source payload.
    let reviews = raw
        .reviews
        .into_iter()
        .map(|r| ReviewExcerpt {
            rating: r.rating,
            text: r.text.unwrap_or_default(),
            time: r.time,
        })
        .collect();

    let photos = raw
        .photos
        .into_iter()
        .filter_map(|p| non_blank(p.photo_reference))
        .collect();

    Some(BusinessDetails {
        record: BusinessRecord {
            place_id: Some(non_blank(raw.place_id).unwrap_or_else(|| place_id.to_string())),
            name,
            address,
            latitude,
            longitude,
            rating: raw.rating,
            review_count: raw.user_ratings_total,
            phone: non_blank(raw.formatted_phone_number),
            website: non_blank(raw.website),
            categories: raw.types,
            business_status: raw.business_status,
            price_level: raw.price_level,
            source: SearchSource::Api,
        },
        opening_hours,
        open_now,
        reviews,
        photos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawGeometry, RawLatLng, RawOpeningHours, RawPhoto, RawReview};

    fn full_raw() -> RawPlace {
        RawPlace {
            place_id: Some("pid-1".to_string()),
            name: Some("Griddle House".to_string()),
            formatted_address: Some("12 Oak St, Denver, CO".to_string()),
            geometry: Some(RawGeometry {
                location: Some(RawLatLng {
                    lat: Some(39.74),
                    lng: Some(-104.99),
                }),
            }),
            rating: Some(4.2),
            user_ratings_total: Some(310),
            types: vec!["restaurant".to_string()],
            business_status: Some("OPERATIONAL".to_string()),
            price_level: Some(2),
        }
    }

    #[test]
    fn maps_complete_hit_field_for_field() {
        let record = record_from_raw(full_raw()).expect("viable hit should map");
        assert_eq!(record.place_id.as_deref(), Some("pid-1"));
        assert_eq!(record.name, "Griddle House");
        assert_eq!(record.address, "12 Oak St, Denver, CO");
        assert_eq!(record.latitude, Some(39.74));
        assert_eq!(record.longitude, Some(-104.99));
        assert_eq!(record.rating, Some(4.2));
        assert_eq!(record.review_count, Some(310));
        assert_eq!(record.categories, vec!["restaurant".to_string()]);
        assert_eq!(record.source, SearchSource::Api);
    }

    #[test]
    fn drops_hit_without_place_id() {
        let mut raw = full_raw();
        raw.place_id = None;
        assert!(record_from_raw(raw).is_none());
    }

    #[test]
    fn drops_hit_with_blank_name() {
        let mut raw = full_raw();
        raw.name = Some("   ".to_string());
        assert!(record_from_raw(raw).is_none());
    }

    #[test]
    fn drops_hit_missing_one_coordinate() {
        let mut raw = full_raw();
        raw.geometry = Some(RawGeometry {
            location: Some(RawLatLng {
                lat: Some(39.74),
                lng: None,
            }),
        });
        assert!(record_from_raw(raw).is_none());
    }

    #[test]
    fn details_copy_reviews_and_hours_verbatim() {
        let raw = RawPlaceDetails {
            place_id: Some("pid-9".to_string()),
            name: Some("Griddle House".to_string()),
            formatted_address: Some("12 Oak St, Denver, CO".to_string()),
            geometry: None,
            rating: Some(4.2),
            user_ratings_total: Some(310),
            types: vec![],
            business_status: None,
            price_level: None,
            formatted_phone_number: Some("(303) 555-0110".to_string()),
            website: Some("https://griddlehouse.example".to_string()),
            opening_hours: Some(RawOpeningHours {
                open_now: Some(false),
                weekday_text: vec!["Monday: 7 AM – 2 PM".to_string()],
            }),
            reviews: vec![RawReview {
                rating: Some(5.0),
                text: Some("best hash browns in town".to_string()),
                time: Some(1_690_000_000),
            }],
            photos: vec![RawPhoto {
                photo_reference: Some("photo-ref-1".to_string()),
            }],
        };

        let details = details_from_raw(raw, "pid-9").expect("should map");
        assert_eq!(details.record.phone.as_deref(), Some("(303) 555-0110"));
        assert_eq!(details.open_now, Some(false));
        assert_eq!(details.opening_hours.len(), 1);
        assert_eq!(details.reviews[0].text, "best hash browns in town");
        assert_eq!(details.reviews[0].time, Some(1_690_000_000));
        assert_eq!(details.photos, vec!["photo-ref-1".to_string()]);
    }

    #[test]
    fn details_without_name_yield_none() {
        let raw = RawPlaceDetails {
            place_id: None,
            name: None,
            formatted_address: Some("12 Oak St".to_string()),
            geometry: None,
            rating: None,
            user_ratings_total: None,
            types: vec![],
            business_status: None,
            price_level: None,
            formatted_phone_number: None,
            website: None,
            opening_hours: None,
            reviews: vec![],
            photos: vec![],
        };
        assert!(details_from_raw(raw, "pid-9").is_none());
    }
}
