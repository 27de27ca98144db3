use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Countries offered in the community editor, with their display names.
pub const COUNTRIES: [(&str, &str); 10] = [
    ("AE", "UAE"),
    ("RU", "Russia"),
    ("GB", "UK"),
    ("US", "USA"),
    ("ES", "Spain"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("IT", "Italy"),
    ("IN", "India"),
    ("PK", "Pakistan"),
];

/// Social platform hosting a community.
///
/// Stored as its display name in the database. Values outside the known set
/// are kept verbatim so a hand-edited row still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Telegram,
    WhatsApp,
    Facebook,
    App,
    Meetup,
    Discord,
    Other(String),
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::Telegram,
        Platform::WhatsApp,
        Platform::Facebook,
        Platform::App,
        Platform::Meetup,
        Platform::Discord,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Platform::Telegram => "Telegram",
            Platform::WhatsApp => "WhatsApp",
            Platform::Facebook => "Facebook",
            Platform::App => "App",
            Platform::Meetup => "Meetup",
            Platform::Discord => "Discord",
            Platform::Other(name) => name,
        }
    }

    /// Parse a known platform name, ignoring case.
    pub fn parse_known(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .cloned()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        Self::parse_known(s).unwrap_or_else(|| Platform::Other(s.to_string()))
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Platform::from(s.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub members: u32,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub link: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub country: String,
    #[serde(default)]
    pub location: Option<Coordinates>,
}

impl Community {
    pub fn flag(&self) -> &'static str {
        flag_emoji(&self.country)
    }

    pub fn display_members(&self) -> String {
        match self.members {
            1 => "1 member".to_string(),
            n => format!("{} members", n),
        }
    }
}

/// Flag emoji for the countries the directory knows about.
pub fn flag_emoji(code: &str) -> &'static str {
    match code.to_ascii_uppercase().as_str() {
        "AE" => "🇦🇪",
        "RU" => "🇷🇺",
        "GB" => "🇬🇧",
        "US" => "🇺🇸",
        "ES" => "🇪🇸",
        "FR" => "🇫🇷",
        "DE" => "🇩🇪",
        "IT" => "🇮🇹",
        "IN" => "🇮🇳",
        "PK" => "🇵🇰",
        _ => "🏳️",
    }
}

/// Sort communities by descending member count, keeping input order for ties.
pub fn sort_by_members(communities: &mut [Community]) {
    communities.sort_by(|a, b| b.members.cmp(&a.members));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn community(id: &str, members: u32) -> Community {
        Community {
            id: id.to_string(),
            name: id.to_string(),
            platform: Platform::Telegram,
            members,
            link: String::new(),
            description: String::new(),
            country: "AE".to_string(),
            location: None,
        }
    }

    #[test]
    fn test_platform_round_trips_known_and_unknown() {
        let known: Platform = serde_json::from_str("\"WhatsApp\"").unwrap();
        assert_eq!(known, Platform::WhatsApp);
        let lower: Platform = serde_json::from_str("\"discord\"").unwrap();
        assert_eq!(lower, Platform::Discord);
        let other: Platform = serde_json::from_str("\"Signal\"").unwrap();
        assert_eq!(other, Platform::Other("Signal".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"Signal\"");
    }

    #[test]
    fn test_location_is_optional() {
        let parsed: Community = serde_json::from_str(
            r#"{"id": "c1", "name": "Padel UAE", "platform": "Telegram", "members": 10}"#,
        )
        .unwrap();
        assert!(parsed.location.is_none());
        assert!(parsed.country.is_empty());

        let null_loc: Community = serde_json::from_str(
            r#"{"id": "c2", "name": "x", "platform": "App", "location": null}"#,
        )
        .unwrap();
        assert!(null_loc.location.is_none());
    }

    #[test]
    fn test_null_text_columns_become_empty() {
        let parsed: Community = serde_json::from_str(
            r#"{"id": "c3", "name": "Padel JLT", "platform": "WhatsApp",
                "members": null, "link": null, "description": null, "country": null}"#,
        )
        .unwrap();
        assert_eq!(parsed.members, 0);
        assert!(parsed.link.is_empty());
        assert!(parsed.description.is_empty());
        assert_eq!(parsed.display_members(), "0 members");
    }

    #[test]
    fn test_sort_by_members_descending_stable() {
        let mut list = vec![community("a", 10), community("b", 500), community("c", 10)];
        sort_by_members(&mut list);
        let ids: Vec<&str> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_flag_emoji_fallback() {
        assert_eq!(flag_emoji("ae"), "🇦🇪");
        assert_eq!(flag_emoji("ZZ"), "🏳️");
    }
}
