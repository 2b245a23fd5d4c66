//! Models for the external song metadata lookup service.

use serde::{Deserialize, Serialize};

/// Enrichment payload returned by the lookup service for a (group, song)
/// pair. The release date arrives in the dd.mm.yyyy display format and is
/// validated before anything is persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDetails {
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub text: String,
    pub link: String,
}
