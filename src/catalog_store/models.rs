//! Wire and storage models for the song catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used on the wire and by the lookup service (e.g. "16.07.2006").
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Date format used inside the store (ISO-8601, sorts and compares natively).
pub const STORE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date in the display format.
pub fn parse_display_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, DISPLAY_DATE_FORMAT)
}

/// Serde adapter serializing dates in the display format.
pub mod display_date {
    use super::DISPLAY_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DISPLAY_DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DISPLAY_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A catalog song row, joined with its group.
///
/// The id is assigned by the store on insert and never client-supplied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub group: String,
    pub song: String,
    #[serde(rename = "releaseDate", with = "display_date")]
    pub release_date: NaiveDate,
    pub text: String,
    pub link: String,
}

/// Sparse search criteria. Every field is optional; unset and empty fields
/// are ignored, so an entirely empty filter matches all rows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFilter {
    pub group: Option<String>,
    pub song: Option<String>,
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
}

/// Minimal creation request; everything else comes from the lookup service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
    pub group: String,
    pub song: String,
}

/// Partial update of a song, keyed by title. Only the populated fields
/// are written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SongUpdate {
    pub song: String,
    pub group: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub text: Option<String>,
    pub link: Option<String>,
}
