use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Neighbourhood labels used to group clubs on the map.
pub const ZONES: [&str; 9] = [
    "alquoz",
    "beach",
    "downtown",
    "marina",
    "palm",
    "deira",
    "meydan",
    "sportscity",
    "barsha",
];

/// Highest value on the rating and price-level scales.
pub const SCALE_MAX: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub zone: String,
}

impl ClubLocation {
    /// Human-readable zone name, e.g. "sportscity" -> "Sports City".
    pub fn zone_display(&self) -> String {
        zone_display_name(&self.zone)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub author: String,
    pub rating: u8,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub text: String,
}

impl Review {
    /// Filled and empty stars, e.g. 4 -> "★★★★☆".
    pub fn stars(&self) -> String {
        let filled = self.rating.min(SCALE_MAX) as usize;
        format!(
            "{}{}",
            "★".repeat(filled),
            "☆".repeat(SCALE_MAX as usize - filled)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: String,
    pub name: String,
    pub location: ClubLocation,
    pub rating: f64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub reviews_count: u32,
    pub price_per_hour: u32,
    pub price_level: u8,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub amenities: Vec<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub socials: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub booking_url: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub reviews: Vec<Review>,
}

impl Club {
    pub fn instagram(&self) -> Option<&str> {
        self.socials
            .get("instagram")
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    pub fn has_booking(&self) -> bool {
        !self.booking_url.trim().is_empty()
    }

    /// Price tier as dollar signs out of five: (active, inactive).
    pub fn price_level_marks(&self) -> (String, String) {
        let active = self.price_level.min(SCALE_MAX) as usize;
        ("$".repeat(active), "$".repeat(SCALE_MAX as usize - active))
    }

    pub fn price_display(&self) -> String {
        format!("~{} AED/hour", self.price_per_hour)
    }
}

pub fn zone_display_name(zone: &str) -> String {
    match zone {
        "alquoz" => "Al Quoz".to_string(),
        "sportscity" => "Sports City".to_string(),
        "barsha" => "Al Barsha".to_string(),
        "palm" => "Palm Jumeirah".to_string(),
        "beach" => "Jumeirah Beach".to_string(),
        "" => "Unassigned".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_club() -> Club {
        serde_json::from_str(
            r#"{
                "id": "club-1",
                "name": "Padel Pro",
                "location": {"lat": 25.13, "lng": 55.22, "address": "Al Quoz 1", "zone": "alquoz"},
                "rating": 4.7,
                "reviews_count": 120,
                "price_per_hour": 300,
                "price_level": 4,
                "amenities": ["indoor", "cafe"],
                "socials": {"instagram": "https://instagram.com/padelpro"},
                "booking_url": "https://playtomic.io/padel-pro"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let club = sample_club();
        assert!(club.images.is_empty());
        assert!(club.reviews.is_empty());
        assert_eq!(club.amenities, vec!["indoor", "cafe"]);
    }

    #[test]
    fn test_null_columns_become_defaults() {
        let club: Club = serde_json::from_str(
            r#"{
                "id": "club-2",
                "name": "Nulls Padel",
                "location": {"lat": 25.0, "lng": 55.1, "address": null, "zone": null},
                "rating": 4.0,
                "reviews_count": null,
                "price_per_hour": 200,
                "price_level": 2,
                "amenities": null,
                "images": null,
                "socials": null,
                "booking_url": null,
                "reviews": [{"author": null, "rating": 5, "text": null}]
            }"#,
        )
        .unwrap();
        assert_eq!(club.reviews_count, 0);
        assert!(club.amenities.is_empty());
        assert!(club.images.is_empty());
        assert!(club.socials.is_empty());
        assert!(!club.has_booking());
        assert!(club.location.zone.is_empty());
        assert_eq!(club.reviews[0].author, "");
        assert_eq!(club.reviews[0].rating, 5);
    }

    #[test]
    fn test_instagram_lookup() {
        let mut club = sample_club();
        assert_eq!(club.instagram(), Some("https://instagram.com/padelpro"));
        club.socials.insert("instagram".to_string(), String::new());
        assert_eq!(club.instagram(), None);
    }

    #[test]
    fn test_price_level_marks() {
        let club = sample_club();
        assert_eq!(club.price_level_marks(), ("$$$$".to_string(), "$".to_string()));
        assert_eq!(club.price_display(), "~300 AED/hour");
    }

    #[test]
    fn test_review_stars() {
        let review = Review { author: "Sam".into(), rating: 4, text: String::new() };
        assert_eq!(review.stars(), "★★★★☆");
        let overflow = Review { author: "Sam".into(), rating: 9, text: String::new() };
        assert_eq!(overflow.stars(), "★★★★★");
    }

    #[test]
    fn test_zone_display_name() {
        assert_eq!(zone_display_name("alquoz"), "Al Quoz");
        assert_eq!(zone_display_name("marina"), "Marina");
        assert_eq!(zone_display_name(""), "Unassigned");
    }
}
