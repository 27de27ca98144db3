//! Data models for directory entities.
//!
//! Both record kinds mirror the columns of the hosted `clubs` and
//! `communities` tables, so the same structs deserialize remote rows and the
//! bundled fallback files:
//!
//! - `Club`: a padel venue with location, pricing and reviews
//! - `Community`: a group or channel for padel players on a social platform

pub mod club;
pub mod community;

pub use club::{zone_display_name, Club, ClubLocation, Review, SCALE_MAX, ZONES};
pub use community::{flag_emoji, sort_by_members, Community, Coordinates, Platform, COUNTRIES};

// Helper to deserialize a null column as the field's default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;

    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
