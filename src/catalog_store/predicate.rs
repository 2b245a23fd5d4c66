//! Translation of sparse search criteria into structured query predicates.

use super::models::{parse_display_date, SongFilter, STORE_DATE_FORMAT};
use thiserror::Error;

/// Logical song fields a predicate can target. The store alone maps these
/// onto SQL columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterField {
    Group,
    Song,
    Link,
    ReleaseDate,
    Text,
}

/// How a predicate compares its bound value against the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// Exact equality against the stored column value.
    Equals,
    /// Full-text match over the lyrics search index.
    FullText,
}

/// A single field/comparison/value condition. The value travels as data and
/// is bound as a SQL parameter by the store, never spliced into the query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub field: FilterField,
    pub comparison: Comparison,
    pub value: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("invalid release date {0:?}, expected dd.mm.yyyy")]
    InvalidReleaseDate(String),
}

/// Translate a filter into its AND-combined predicate set.
///
/// Unset and empty fields contribute nothing, so an entirely empty filter
/// yields an empty set and reads as "match all rows". The release date is
/// converted from the dd.mm.yyyy display format into the store's ISO
/// representation here, so the store never compares raw display strings.
pub fn translate(filter: &SongFilter) -> Result<Vec<Predicate>, TranslateError> {
    let mut predicates = Vec::new();

    if let Some(group) = populated(&filter.group) {
        predicates.push(Predicate {
            field: FilterField::Group,
            comparison: Comparison::Equals,
            value: group.to_string(),
        });
    }
    if let Some(song) = populated(&filter.song) {
        predicates.push(Predicate {
            field: FilterField::Song,
            comparison: Comparison::Equals,
            value: song.to_string(),
        });
    }
    if let Some(link) = populated(&filter.link) {
        predicates.push(Predicate {
            field: FilterField::Link,
            comparison: Comparison::Equals,
            value: link.to_string(),
        });
    }
    if let Some(raw_date) = populated(&filter.release_date) {
        let date = parse_display_date(raw_date)
            .map_err(|_| TranslateError::InvalidReleaseDate(raw_date.to_string()))?;
        predicates.push(Predicate {
            field: FilterField::ReleaseDate,
            comparison: Comparison::Equals,
            value: date.format(STORE_DATE_FORMAT).to_string(),
        });
    }
    if let Some(query) = populated(&filter.text) {
        predicates.push(Predicate {
            field: FilterField::Text,
            comparison: Comparison::FullText,
            value: query.to_string(),
        });
    }

    Ok(predicates)
}

fn populated(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}
