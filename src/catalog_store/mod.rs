//! Song catalog storage: models, predicate translation and the SQLite store.

pub mod models;
mod predicate;
mod schema;
mod store;
mod trait_def;

pub use models::{parse_display_date, NewSong, Song, SongFilter, SongUpdate};
pub use predicate::{translate, Comparison, FilterField, Predicate, TranslateError};
pub use store::SqliteCatalogStore;
pub use trait_def::CatalogStore;
