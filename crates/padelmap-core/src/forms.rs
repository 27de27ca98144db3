//! Edit-form drafts for clubs and communities.
//!
//! A draft holds every editable field as text, the way the admin screen
//! shows it, and parses back into a record on save. List-valued fields use
//! the formats the admin screen has always used: amenities comma separated,
//! image URLs one per line, reviews one per line as `author|rating|text`.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    Club, ClubLocation, Community, Coordinates, Platform, Review, SCALE_MAX, ZONES,
};

/// Default map position for new records (central Dubai).
const DEFAULT_LAT: f64 = 25.12;
const DEFAULT_LNG: f64 = 55.20;
const DEFAULT_ZONE: &str = "alquoz";
const DEFAULT_RATING: f64 = 4.5;
const DEFAULT_PRICE_PER_HOUR: u32 = 250;
const DEFAULT_PRICE_LEVEL: u8 = 3;
const DEFAULT_COUNTRY: &str = "AE";

/// Review rating used when a review line has no parsable rating.
const DEFAULT_REVIEW_RATING: u8 = 5;

pub const PLATFORM_CHOICES: [&str; 6] = ["Telegram", "WhatsApp", "Facebook", "App", "Meetup", "Discord"];
pub const COUNTRY_CHOICES: [&str; 10] = ["AE", "RU", "GB", "US", "ES", "FR", "DE", "IT", "IN", "PK"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("Name is required")]
    MissingName,

    #[error("{field} must be a number (got '{value}')")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: &'static str, min: f64, max: f64 },

    #[error("Unknown zone '{0}'")]
    UnknownZone(String),

    #[error("Unknown platform '{0}'")]
    UnknownPlatform(String),

    #[error("Latitude and longitude must both be set or both be blank")]
    PartialLocation,
}

/// Uniform field access so one editor widget can drive either draft.
pub trait DraftFields {
    fn title(&self) -> String;
    fn field_count(&self) -> usize;
    fn label(&self, index: usize) -> &'static str;
    fn value(&self, index: usize) -> &str;
    fn value_mut(&mut self, index: usize) -> &mut String;

    /// Fixed choices for selector fields; `None` for free text.
    fn choices(&self, _index: usize) -> Option<&'static [&'static str]> {
        None
    }

    fn is_multiline(&self, _index: usize) -> bool {
        false
    }
}

/// Replace `current` with the next (or previous) entry of `choices`.
pub fn cycle_choice(current: &str, choices: &[&str], forward: bool) -> String {
    if choices.is_empty() {
        return current.to_string();
    }
    let len = choices.len();
    let next = match choices.iter().position(|c| c.eq_ignore_ascii_case(current)) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    choices[next].to_string()
}

// ============================================================================
// Club draft
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClubField {
    Name,
    Address,
    Zone,
    Latitude,
    Longitude,
    Rating,
    PricePerHour,
    PriceLevel,
    BookingUrl,
    Instagram,
    Amenities,
    Images,
    Reviews,
}

impl ClubField {
    pub const ALL: [ClubField; 13] = [
        ClubField::Name,
        ClubField::Address,
        ClubField::Zone,
        ClubField::Latitude,
        ClubField::Longitude,
        ClubField::Rating,
        ClubField::PricePerHour,
        ClubField::PriceLevel,
        ClubField::BookingUrl,
        ClubField::Instagram,
        ClubField::Amenities,
        ClubField::Images,
        ClubField::Reviews,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClubField::Name => "Name",
            ClubField::Address => "Address",
            ClubField::Zone => "Zone",
            ClubField::Latitude => "Latitude",
            ClubField::Longitude => "Longitude",
            ClubField::Rating => "Rating (1-5)",
            ClubField::PricePerHour => "Price/Hour (AED)",
            ClubField::PriceLevel => "Price level (1-5)",
            ClubField::BookingUrl => "Booking URL",
            ClubField::Instagram => "Instagram",
            ClubField::Amenities => "Amenities (comma separated)",
            ClubField::Images => "Images (one URL per line)",
            ClubField::Reviews => "Reviews (Author|Rating|Text per line)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClubDraft {
    pub is_new: bool,
    values: Vec<String>,
    /// Record being edited; keeps fields the form does not expose.
    base: Club,
}

impl ClubDraft {
    /// Draft for a new club with the default position and pricing.
    pub fn blank(now: DateTime<Utc>) -> Self {
        let club = Club {
            id: format!("club-{}", now.timestamp_millis()),
            name: String::new(),
            location: ClubLocation {
                lat: DEFAULT_LAT,
                lng: DEFAULT_LNG,
                address: String::new(),
                zone: DEFAULT_ZONE.to_string(),
            },
            rating: DEFAULT_RATING,
            reviews_count: 0,
            price_per_hour: DEFAULT_PRICE_PER_HOUR,
            price_level: DEFAULT_PRICE_LEVEL,
            amenities: Vec::new(),
            images: Vec::new(),
            socials: Default::default(),
            booking_url: String::new(),
            reviews: Vec::new(),
        };
        let mut draft = Self::from_club(&club);
        draft.is_new = true;
        draft
    }

    pub fn from_club(club: &Club) -> Self {
        let values = ClubField::ALL
            .iter()
            .map(|field| match field {
                ClubField::Name => club.name.clone(),
                ClubField::Address => club.location.address.clone(),
                ClubField::Zone => club.location.zone.clone(),
                ClubField::Latitude => club.location.lat.to_string(),
                ClubField::Longitude => club.location.lng.to_string(),
                ClubField::Rating => club.rating.to_string(),
                ClubField::PricePerHour => club.price_per_hour.to_string(),
                ClubField::PriceLevel => club.price_level.to_string(),
                ClubField::BookingUrl => club.booking_url.clone(),
                ClubField::Instagram => club.instagram().unwrap_or_default().to_string(),
                ClubField::Amenities => club.amenities.join(", "),
                ClubField::Images => club.images.join("\n"),
                ClubField::Reviews => club
                    .reviews
                    .iter()
                    .map(|r| format!("{}|{}|{}", r.author, r.rating, r.text))
                    .collect::<Vec<_>>()
                    .join("\n"),
            })
            .collect();

        Self {
            is_new: false,
            values,
            base: club.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }

    pub fn get(&self, field: ClubField) -> &str {
        &self.values[field as usize]
    }

    pub fn set(&mut self, field: ClubField, value: impl Into<String>) {
        self.values[field as usize] = value.into();
    }

    /// Parse the form back into a club.
    pub fn to_club(&self) -> Result<Club, FormError> {
        let name = self.get(ClubField::Name).trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let zone = self.get(ClubField::Zone).trim().to_lowercase();
        if !ZONES.contains(&zone.as_str()) {
            return Err(FormError::UnknownZone(zone));
        }

        let lat = parse_in_range("Latitude", self.get(ClubField::Latitude), -90.0, 90.0)?;
        let lng = parse_in_range("Longitude", self.get(ClubField::Longitude), -180.0, 180.0)?;
        let rating = parse_in_range("Rating", self.get(ClubField::Rating), 1.0, SCALE_MAX as f64)?;
        let price_per_hour = parse_number::<u32>("Price/Hour", self.get(ClubField::PricePerHour))?;
        let price_level = parse_number::<u8>("Price level", self.get(ClubField::PriceLevel))?;
        if !(1..=SCALE_MAX).contains(&price_level) {
            return Err(FormError::OutOfRange {
                field: "Price level",
                min: 1.0,
                max: SCALE_MAX as f64,
            });
        }

        let mut socials = self.base.socials.clone();
        let instagram = self.get(ClubField::Instagram).trim();
        if instagram.is_empty() {
            socials.remove("instagram");
        } else {
            socials.insert("instagram".to_string(), instagram.to_string());
        }

        Ok(Club {
            id: self.base.id.clone(),
            name: name.to_string(),
            location: ClubLocation {
                lat,
                lng,
                address: self.get(ClubField::Address).trim().to_string(),
                zone,
            },
            rating: (rating * 10.0).round() / 10.0,
            reviews_count: self.base.reviews_count,
            price_per_hour,
            price_level,
            amenities: parse_amenities(self.get(ClubField::Amenities)),
            images: parse_lines(self.get(ClubField::Images)),
            socials,
            booking_url: self.get(ClubField::BookingUrl).trim().to_string(),
            reviews: parse_reviews(self.get(ClubField::Reviews)),
        })
    }
}

impl DraftFields for ClubDraft {
    fn title(&self) -> String {
        let title = if self.is_new { "Add Club" } else { "Edit Club" };
        title.to_string()
    }

    fn field_count(&self) -> usize {
        ClubField::ALL.len()
    }

    fn label(&self, index: usize) -> &'static str {
        ClubField::ALL[index].label()
    }

    fn value(&self, index: usize) -> &str {
        &self.values[index]
    }

    fn value_mut(&mut self, index: usize) -> &mut String {
        &mut self.values[index]
    }

    fn choices(&self, index: usize) -> Option<&'static [&'static str]> {
        match ClubField::ALL[index] {
            ClubField::Zone => Some(&ZONES),
            _ => None,
        }
    }

    fn is_multiline(&self, index: usize) -> bool {
        matches!(ClubField::ALL[index], ClubField::Images | ClubField::Reviews)
    }
}

// ============================================================================
// Community draft
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunityField {
    Name,
    Platform,
    Members,
    Link,
    Description,
    Country,
    Latitude,
    Longitude,
}

impl CommunityField {
    pub const ALL: [CommunityField; 8] = [
        CommunityField::Name,
        CommunityField::Platform,
        CommunityField::Members,
        CommunityField::Link,
        CommunityField::Description,
        CommunityField::Country,
        CommunityField::Latitude,
        CommunityField::Longitude,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CommunityField::Name => "Name",
            CommunityField::Platform => "Platform",
            CommunityField::Members => "Members",
            CommunityField::Link => "Join link",
            CommunityField::Description => "Description",
            CommunityField::Country => "Country",
            CommunityField::Latitude => "Latitude (blank for none)",
            CommunityField::Longitude => "Longitude (blank for none)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommunityDraft {
    pub is_new: bool,
    id: String,
    values: Vec<String>,
}

impl CommunityDraft {
    pub fn blank(now: DateTime<Utc>) -> Self {
        let community = Community {
            id: format!("community-{}", now.timestamp_millis()),
            name: String::new(),
            platform: Platform::Telegram,
            members: 0,
            link: String::new(),
            description: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            location: Some(Coordinates {
                lat: DEFAULT_LAT,
                lng: DEFAULT_LNG,
            }),
        };
        let mut draft = Self::from_community(&community);
        draft.is_new = true;
        draft
    }

    pub fn from_community(community: &Community) -> Self {
        let values = CommunityField::ALL
            .iter()
            .map(|field| match field {
                CommunityField::Name => community.name.clone(),
                CommunityField::Platform => community.platform.to_string(),
                CommunityField::Members => community.members.to_string(),
                CommunityField::Link => community.link.clone(),
                CommunityField::Description => community.description.clone(),
                CommunityField::Country => community.country.clone(),
                CommunityField::Latitude => community
                    .location
                    .map(|l| l.lat.to_string())
                    .unwrap_or_default(),
                CommunityField::Longitude => community
                    .location
                    .map(|l| l.lng.to_string())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            is_new: false,
            id: community.id.clone(),
            values,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, field: CommunityField) -> &str {
        &self.values[field as usize]
    }

    pub fn set(&mut self, field: CommunityField, value: impl Into<String>) {
        self.values[field as usize] = value.into();
    }

    pub fn to_community(&self) -> Result<Community, FormError> {
        let name = self.get(CommunityField::Name).trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let platform_text = self.get(CommunityField::Platform).trim();
        let platform = Platform::parse_known(platform_text)
            .ok_or_else(|| FormError::UnknownPlatform(platform_text.to_string()))?;

        let members = parse_members(self.get(CommunityField::Members));

        let lat_text = self.get(CommunityField::Latitude).trim();
        let lng_text = self.get(CommunityField::Longitude).trim();
        let location = match (lat_text.is_empty(), lng_text.is_empty()) {
            (true, true) => None,
            (false, false) => Some(Coordinates {
                lat: parse_in_range("Latitude", lat_text, -90.0, 90.0)?,
                lng: parse_in_range("Longitude", lng_text, -180.0, 180.0)?,
            }),
            _ => return Err(FormError::PartialLocation),
        };

        Ok(Community {
            id: self.id.clone(),
            name: name.to_string(),
            platform,
            members,
            link: self.get(CommunityField::Link).trim().to_string(),
            description: self.get(CommunityField::Description).trim().to_string(),
            country: self.get(CommunityField::Country).trim().to_uppercase(),
            location,
        })
    }
}

impl DraftFields for CommunityDraft {
    fn title(&self) -> String {
        let title = if self.is_new { "Add Community" } else { "Edit Community" };
        title.to_string()
    }

    fn field_count(&self) -> usize {
        CommunityField::ALL.len()
    }

    fn label(&self, index: usize) -> &'static str {
        CommunityField::ALL[index].label()
    }

    fn value(&self, index: usize) -> &str {
        &self.values[index]
    }

    fn value_mut(&mut self, index: usize) -> &mut String {
        &mut self.values[index]
    }

    fn choices(&self, index: usize) -> Option<&'static [&'static str]> {
        match CommunityField::ALL[index] {
            CommunityField::Platform => Some(&PLATFORM_CHOICES),
            CommunityField::Country => Some(&COUNTRY_CHOICES),
            _ => None,
        }
    }
}

// ============================================================================
// Field parsing
// ============================================================================

fn parse_number<T: std::str::FromStr>(field: &'static str, text: &str) -> Result<T, FormError> {
    text.trim().parse::<T>().map_err(|_| FormError::InvalidNumber {
        field,
        value: text.trim().to_string(),
    })
}

/// Leading digits of the text, or 0 when there are none: "1.2k" -> 1, "" -> 0.
fn parse_members(text: &str) -> u32 {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

fn parse_in_range(field: &'static str, text: &str, min: f64, max: f64) -> Result<f64, FormError> {
    let value = parse_number::<f64>(field, text)?;
    if !value.is_finite() || value < min || value > max {
        return Err(FormError::OutOfRange { field, min, max });
    }
    Ok(value)
}

/// "indoor, parking,, cafe" -> ["indoor", "parking", "cafe"]
pub fn parse_amenities(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Non-blank lines, trimmed.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One review per line as `author|rating|text`. Everything after the second
/// `|` is review text; an unparsable rating becomes 5.
pub fn parse_reviews(text: &str) -> Vec<Review> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.splitn(3, '|');
            let author = parts.next().unwrap_or_default().trim().to_string();
            let rating = parts
                .next()
                .and_then(|r| r.trim().parse::<u8>().ok())
                .filter(|r| *r > 0)
                .unwrap_or(DEFAULT_REVIEW_RATING)
                .min(SCALE_MAX);
            let text = parts.next().unwrap_or_default().trim().to_string();
            Review { author, rating, text }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn test_blank_club_defaults() {
        let draft = ClubDraft::blank(fixed_now());
        assert!(draft.is_new);
        assert_eq!(draft.id(), "club-1700000000123");
        assert_eq!(draft.get(ClubField::Zone), "alquoz");
        assert_eq!(draft.get(ClubField::Rating), "4.5");
        assert_eq!(draft.get(ClubField::PricePerHour), "250");
        assert_eq!(draft.title(), "Add Club");
        // Name is still empty
        assert_eq!(draft.to_club(), Err(FormError::MissingName));
    }

    #[test]
    fn test_club_form_parses_lists() {
        let mut draft = ClubDraft::blank(fixed_now());
        draft.set(ClubField::Name, "  New Courts ");
        draft.set(ClubField::Amenities, "indoor, parking,, cafe ");
        draft.set(ClubField::Images, "https://img/1.jpg\n\n  https://img/2.jpg ");
        draft.set(ClubField::Reviews, "John|5|Great courts!\nAnna|x|Nice | friendly\n\n");
        draft.set(ClubField::Instagram, "https://instagram.com/new");

        let club = draft.to_club().unwrap();
        assert_eq!(club.name, "New Courts");
        assert_eq!(club.amenities, vec!["indoor", "parking", "cafe"]);
        assert_eq!(club.images, vec!["https://img/1.jpg", "https://img/2.jpg"]);
        assert_eq!(club.reviews.len(), 2);
        assert_eq!(club.reviews[1].rating, 5);
        assert_eq!(club.reviews[1].text, "Nice | friendly");
        assert_eq!(club.instagram(), Some("https://instagram.com/new"));
    }

    #[test]
    fn test_club_round_trip_keeps_hidden_fields() {
        let mut original = ClubDraft::blank(fixed_now());
        original.set(ClubField::Name, "Keep");
        let mut club = original.to_club().unwrap();
        club.reviews_count = 77;
        club.socials.insert("tiktok".to_string(), "https://tiktok.com/@keep".to_string());

        let edited = ClubDraft::from_club(&club).to_club().unwrap();
        assert_eq!(edited, club);
    }

    #[test]
    fn test_club_validation_errors() {
        let mut draft = ClubDraft::blank(fixed_now());
        draft.set(ClubField::Name, "X");

        draft.set(ClubField::Rating, "6");
        assert!(matches!(draft.to_club(), Err(FormError::OutOfRange { field: "Rating", .. })));

        draft.set(ClubField::Rating, "4");
        draft.set(ClubField::Latitude, "north");
        assert!(matches!(draft.to_club(), Err(FormError::InvalidNumber { field: "Latitude", .. })));

        draft.set(ClubField::Latitude, "25.1");
        draft.set(ClubField::Zone, "atlantis");
        assert_eq!(draft.to_club(), Err(FormError::UnknownZone("atlantis".to_string())));

        draft.set(ClubField::Zone, "Marina");
        draft.set(ClubField::PriceLevel, "0");
        assert!(matches!(draft.to_club(), Err(FormError::OutOfRange { field: "Price level", .. })));
    }

    #[test]
    fn test_community_location_optional() {
        let mut draft = CommunityDraft::blank(fixed_now());
        assert_eq!(draft.id(), "community-1700000000123");
        draft.set(CommunityField::Name, "Padel Friends");
        draft.set(CommunityField::Members, "42");

        let with_location = draft.to_community().unwrap();
        assert_eq!(with_location.location, Some(Coordinates { lat: 25.12, lng: 55.20 }));
        assert_eq!(with_location.platform, Platform::Telegram);

        draft.set(CommunityField::Latitude, "");
        draft.set(CommunityField::Longitude, "");
        assert_eq!(draft.to_community().unwrap().location, None);

        draft.set(CommunityField::Latitude, "25.0");
        assert_eq!(draft.to_community(), Err(FormError::PartialLocation));
    }

    #[test]
    fn test_community_members_default_to_zero() {
        let mut draft = CommunityDraft::blank(fixed_now());
        draft.set(CommunityField::Name, "Quiet Group");
        draft.set(CommunityField::Members, "");
        assert_eq!(draft.to_community().unwrap().members, 0);

        draft.set(CommunityField::Members, "lots");
        assert_eq!(draft.to_community().unwrap().members, 0);

        draft.set(CommunityField::Members, " 350+ ");
        assert_eq!(draft.to_community().unwrap().members, 350);
    }

    #[test]
    fn test_community_rejects_unknown_platform() {
        let mut draft = CommunityDraft::blank(fixed_now());
        draft.set(CommunityField::Name, "Group");
        draft.set(CommunityField::Platform, "Myspace");
        assert_eq!(
            draft.to_community(),
            Err(FormError::UnknownPlatform("Myspace".to_string()))
        );
        draft.set(CommunityField::Platform, "discord");
        assert_eq!(draft.to_community().unwrap().platform, Platform::Discord);
    }

    #[test]
    fn test_cycle_choice() {
        assert_eq!(cycle_choice("AE", &COUNTRY_CHOICES, true), "RU");
        assert_eq!(cycle_choice("AE", &COUNTRY_CHOICES, false), "PK");
        assert_eq!(cycle_choice("zz", &COUNTRY_CHOICES, true), "AE");
        assert_eq!(cycle_choice("barsha", &ZONES, true), "alquoz");
    }

    #[test]
    fn test_choices_and_multiline_flags() {
        let club = ClubDraft::blank(fixed_now());
        assert_eq!(club.choices(ClubField::Zone as usize), Some(&ZONES[..]));
        assert!(club.is_multiline(ClubField::Reviews as usize));
        assert!(!club.is_multiline(ClubField::Name as usize));

        let community = CommunityDraft::blank(fixed_now());
        assert_eq!(
            community.choices(CommunityField::Platform as usize),
            Some(&PLATFORM_CHOICES[..])
        );
    }
}
