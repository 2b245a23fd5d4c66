//! CatalogStore trait definition.

use super::models::{NewSong, Song, SongUpdate};
use super::predicate::Predicate;
use anyhow::Result;
use chrono::NaiveDate;

/// Storage abstraction for the song catalog.
///
/// All operations bind their values as SQL parameters, and "nothing
/// matched" is reported distinctly from failure: reads return `Option`,
/// updates and deletes return the affected row count. This allows a test
/// double to stand in for the SQLite store.
pub trait CatalogStore: Send + Sync {
    /// Find songs matching the AND-combination of `predicates`, ordered by
    /// id. An empty predicate set matches every row.
    fn find_songs(&self, predicates: &[Predicate]) -> Result<Vec<Song>>;

    /// Fetch the raw lyrics of a song by title.
    fn get_song_text(&self, title: &str) -> Result<Option<String>>;

    /// Apply a partial update keyed by title. Returns the affected row
    /// count. A group change upserts the group dimension and re-points the
    /// song, all inside one transaction.
    fn update_song(&self, update: &SongUpdate) -> Result<usize>;

    /// Delete songs by title. Returns the affected row count.
    fn delete_song(&self, title: &str) -> Result<usize>;

    /// Insert a song with its enrichment data, creating the group dimension
    /// row if absent. Both writes happen inside a single transaction so a
    /// failed insert never leaves an orphaned group row. Returns the
    /// store-assigned song id.
    fn insert_song(
        &self,
        new_song: &NewSong,
        release_date: NaiveDate,
        text: &str,
        link: &str,
    ) -> Result<i64>;
}
