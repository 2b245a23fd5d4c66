//! Song catalog operations: search, lyric paging, update, delete and the
//! lookup-enriched create workflow.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog_store::{parse_display_date, translate, CatalogStore, NewSong, Song, SongFilter, SongUpdate};
use crate::lookup::{LookupError, LookupService};
use crate::pagination::{paginate, PaginationError};

use super::ServiceError;

/// Facade over the catalog store and the lookup collaborator.
pub struct SongService {
    store: Arc<dyn CatalogStore>,
    lookup: Arc<dyn LookupService>,
}

impl SongService {
    pub fn new(store: Arc<dyn CatalogStore>, lookup: Arc<dyn LookupService>) -> Self {
        Self { store, lookup }
    }

    /// Search songs by filter. Each returned song's lyrics are reduced to
    /// the requested paragraph page.
    pub fn search_songs(
        &self,
        filter: &SongFilter,
        page: usize,
        limit: usize,
    ) -> Result<Vec<Song>, ServiceError> {
        if page < 1 || limit < 1 {
            return Err(ServiceError::Boundary(format!(
                "page and limit must both be positive (got page {}, limit {})",
                page, limit
            )));
        }

        let predicates =
            translate(filter).map_err(|err| ServiceError::Validation(err.to_string()))?;
        debug!("Searching songs with {} predicate(s)", predicates.len());

        let mut songs = self
            .store
            .find_songs(&predicates)
            .map_err(ServiceError::Persistence)?;
        for song in &mut songs {
            song.text = Self::page_text(&song.text, page, limit)?;
        }

        info!("Search matched {} song(s)", songs.len());
        Ok(songs)
    }

    /// Fetch one paragraph page of a song's lyrics.
    pub fn get_song_text(
        &self,
        title: &str,
        page: usize,
        limit: usize,
    ) -> Result<String, ServiceError> {
        if title.is_empty() {
            return Err(ServiceError::Validation("song title is required".to_string()));
        }

        let text = self
            .store
            .get_song_text(title)
            .map_err(ServiceError::Persistence)?
            .ok_or_else(|| ServiceError::NotFound(format!("no song titled {:?}", title)))?;

        Self::page_text(&text, page, limit)
    }

    /// Apply a partial update; the filter's `song` field is the mandatory
    /// correlation key.
    pub fn update_song(&self, filter: &SongFilter) -> Result<(), ServiceError> {
        let update = Self::update_from_filter(filter)?;

        let affected = self
            .store
            .update_song(&update)
            .map_err(ServiceError::Persistence)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "no song titled {:?}",
                update.song
            )));
        }

        info!("Updated {} song(s) titled {:?}", affected, update.song);
        Ok(())
    }

    /// Delete songs by title.
    pub fn delete_song(&self, title: &str) -> Result<(), ServiceError> {
        if title.is_empty() {
            return Err(ServiceError::Validation("song title is required".to_string()));
        }

        let affected = self
            .store
            .delete_song(title)
            .map_err(ServiceError::Persistence)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("no song titled {:?}", title)));
        }

        info!("Deleted {} song(s) titled {:?}", affected, title);
        Ok(())
    }

    /// Create a song from a minimal request, enriched through the lookup
    /// service.
    ///
    /// Nothing is persisted unless the lookup succeeds and its payload
    /// validates; the group upsert and the song insert then happen as one
    /// atomic store operation.
    pub async fn create_song(&self, new_song: &NewSong) -> Result<i64, ServiceError> {
        if new_song.group.is_empty() {
            return Err(ServiceError::Validation("group name is required".to_string()));
        }
        if new_song.song.is_empty() {
            return Err(ServiceError::Validation("song title is required".to_string()));
        }

        let details = self
            .lookup
            .get_song_details(&new_song.group, &new_song.song)
            .await?;
        let release_date = parse_display_date(&details.release_date)
            .map_err(|_| LookupError::InvalidReleaseDate(details.release_date.clone()))?;

        let id = self
            .store
            .insert_song(new_song, release_date, &details.text, &details.link)
            .map_err(ServiceError::Persistence)?;

        info!(
            "Created song {:?} by {:?} with id {}",
            new_song.song, new_song.group, id
        );
        Ok(id)
    }

    fn page_text(text: &str, page: usize, limit: usize) -> Result<String, ServiceError> {
        let lyrics_page = paginate(text, page, limit).map_err(|err| match err {
            PaginationError::InvalidBounds { .. } => ServiceError::Boundary(err.to_string()),
            PaginationError::PageOutOfRange { .. } => ServiceError::NotFound(err.to_string()),
        })?;
        Ok(lyrics_page.annotated())
    }

    fn update_from_filter(filter: &SongFilter) -> Result<SongUpdate, ServiceError> {
        let song = filter
            .song
            .clone()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ServiceError::Validation("song title is required".to_string()))?;

        let release_date = match filter.release_date.as_deref().filter(|v| !v.is_empty()) {
            Some(raw) => Some(parse_display_date(raw).map_err(|_| {
                ServiceError::Validation(format!(
                    "invalid release date {:?}, expected dd.mm.yyyy",
                    raw
                ))
            })?),
            None => None,
        };

        Ok(SongUpdate {
            song,
            group: filter.group.clone().filter(|v| !v.is_empty()),
            release_date,
            text: filter.text.clone().filter(|v| !v.is_empty()),
            link: filter.link.clone().filter(|v| !v.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::Predicate;
    use crate::lookup::SongDetails;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Hand-rolled catalog store double recording every call.
    #[derive(Default)]
    struct FakeStore {
        songs: Vec<Song>,
        text: Option<String>,
        affected: usize,
        recorded_predicates: Mutex<Vec<Vec<Predicate>>>,
        inserted: Mutex<Vec<(NewSong, NaiveDate, String, String)>>,
    }

    impl CatalogStore for FakeStore {
        fn find_songs(&self, predicates: &[Predicate]) -> Result<Vec<Song>> {
            self.recorded_predicates
                .lock()
                .unwrap()
                .push(predicates.to_vec());
            Ok(self.songs.clone())
        }

        fn get_song_text(&self, _title: &str) -> Result<Option<String>> {
            Ok(self.text.clone())
        }

        fn update_song(&self, _update: &SongUpdate) -> Result<usize> {
            Ok(self.affected)
        }

        fn delete_song(&self, _title: &str) -> Result<usize> {
            Ok(self.affected)
        }

        fn insert_song(
            &self,
            new_song: &NewSong,
            release_date: NaiveDate,
            text: &str,
            link: &str,
        ) -> Result<i64> {
            self.inserted.lock().unwrap().push((
                new_song.clone(),
                release_date,
                text.to_string(),
                link.to_string(),
            ));
            Ok(42)
        }
    }

    /// Lookup double: answers with the configured details, or status 502
    /// when none are configured. Counts calls either way.
    #[derive(Default)]
    struct FakeLookup {
        details: Option<SongDetails>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LookupService for FakeLookup {
        async fn get_song_details(
            &self,
            _group: &str,
            _song: &str,
        ) -> Result<SongDetails, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.details {
                Some(details) => Ok(details.clone()),
                None => Err(LookupError::Status(502)),
            }
        }
    }

    fn details(release_date: &str, text: &str, link: &str) -> SongDetails {
        SongDetails {
            release_date: release_date.to_string(),
            text: text.to_string(),
            link: link.to_string(),
        }
    }

    fn song(id: i64, group: &str, title: &str, text: &str) -> Song {
        Song {
            id,
            group: group.to_string(),
            song: title.to_string(),
            release_date: NaiveDate::from_ymd_opt(2006, 7, 16).unwrap(),
            text: text.to_string(),
            link: "https://example.com".to_string(),
        }
    }

    fn new_song(group: &str, title: &str) -> NewSong {
        NewSong {
            group: group.to_string(),
            song: title.to_string(),
        }
    }

    #[tokio::test]
    async fn create_rejects_missing_title_without_contacting_the_lookup() {
        let store = Arc::new(FakeStore::default());
        let lookup = Arc::new(FakeLookup::default());
        let service = SongService::new(store.clone(), lookup.clone());

        let err = service.create_song(&new_song("Muse", "")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_missing_group_without_contacting_the_lookup() {
        let store = Arc::new(FakeStore::default());
        let lookup = Arc::new(FakeLookup::default());
        let service = SongService::new(store.clone(), lookup.clone());

        let err = service.create_song(&new_song("", "Uprising")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_lookup_persists_nothing() {
        let store = Arc::new(FakeStore::default());
        let lookup = Arc::new(FakeLookup::default()); // no details -> 502
        let service = SongService::new(store.clone(), lookup.clone());

        let err = service
            .create_song(&new_song("Muse", "Uprising"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Upstream(LookupError::Status(502))
        ));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_lookup_release_date_persists_nothing() {
        let store = Arc::new(FakeStore::default());
        let lookup = Arc::new(FakeLookup {
            details: Some(details("not a date", "t", "l")),
            ..FakeLookup::default()
        });
        let service = SongService::new(store.clone(), lookup);

        let err = service
            .create_song(&new_song("Muse", "Uprising"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Upstream(LookupError::InvalidReleaseDate(_))
        ));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_merges_request_and_lookup_result() {
        let store = Arc::new(FakeStore::default());
        let lookup = Arc::new(FakeLookup {
            details: Some(details("01.01.2000", "t", "l")),
            ..FakeLookup::default()
        });
        let service = SongService::new(store.clone(), lookup);

        let id = service
            .create_song(&new_song("Muse", "Uprising"))
            .await
            .unwrap();
        assert_eq!(id, 42);

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        let (request, release_date, text, link) = &inserted[0];
        assert_eq!(request, &new_song("Muse", "Uprising"));
        assert_eq!(*release_date, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_eq!(text, "t");
        assert_eq!(link, "l");
    }

    #[test]
    fn empty_filter_reaches_the_store_as_an_empty_predicate_set() {
        let store = Arc::new(FakeStore {
            songs: vec![song(1, "Muse", "Starlight", "A\n\nB")],
            ..FakeStore::default()
        });
        let service = SongService::new(store.clone(), Arc::new(FakeLookup::default()));

        let songs = service
            .search_songs(&SongFilter::default(), 1, 1000)
            .unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].text, "A\n\nB\n\n... (Page 1 of 2)");

        let recorded = store.recorded_predicates.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].is_empty());
    }

    #[test]
    fn search_rejects_non_positive_bounds_before_touching_the_store() {
        let store = Arc::new(FakeStore::default());
        let service = SongService::new(store.clone(), Arc::new(FakeLookup::default()));

        let err = service
            .search_songs(&SongFilter::default(), 0, 10)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Boundary(_)));
        assert!(store.recorded_predicates.lock().unwrap().is_empty());
    }

    #[test]
    fn search_rejects_unparseable_release_date() {
        let service = SongService::new(
            Arc::new(FakeStore::default()),
            Arc::new(FakeLookup::default()),
        );
        let filter = SongFilter {
            release_date: Some("soon".to_string()),
            ..SongFilter::default()
        };

        let err = service.search_songs(&filter, 1, 1000).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn get_song_text_maps_missing_song_to_not_found() {
        let service = SongService::new(
            Arc::new(FakeStore::default()),
            Arc::new(FakeLookup::default()),
        );

        let err = service.get_song_text("Nope", 1, 10).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn get_song_text_rejects_non_positive_bounds() {
        let store = Arc::new(FakeStore {
            text: Some("A\n\nB".to_string()),
            ..FakeStore::default()
        });
        let service = SongService::new(store, Arc::new(FakeLookup::default()));

        let err = service.get_song_text("Starlight", 0, 10).unwrap_err();
        assert!(matches!(err, ServiceError::Boundary(_)));
    }

    #[test]
    fn update_requires_the_song_title() {
        let service = SongService::new(
            Arc::new(FakeStore {
                affected: 1,
                ..FakeStore::default()
            }),
            Arc::new(FakeLookup::default()),
        );
        let filter = SongFilter {
            group: Some("Muse".to_string()),
            ..SongFilter::default()
        };

        let err = service.update_song(&filter).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn update_maps_zero_affected_rows_to_not_found() {
        let service = SongService::new(
            Arc::new(FakeStore::default()),
            Arc::new(FakeLookup::default()),
        );
        let filter = SongFilter {
            song: Some("Nope".to_string()),
            link: Some("https://example.com/nope".to_string()),
            ..SongFilter::default()
        };

        let err = service.update_song(&filter).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn delete_maps_zero_affected_rows_to_not_found() {
        let service = SongService::new(
            Arc::new(FakeStore::default()),
            Arc::new(FakeLookup::default()),
        );

        let err = service.delete_song("Nope").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(matches!(
            service.delete_song("").unwrap_err(),
            ServiceError::Validation(_)
        ));
    }
}
