//! SQLite-backed implementation of the catalog store.

use super::models::{NewSong, Song, SongUpdate, STORE_DATE_FORMAT};
use super::predicate::{Comparison, FilterField, Predicate};
use super::schema::CATALOG_SCHEMA;
use super::trait_def::CatalogStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ToSql, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed song catalog.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn =
            Connection::open(db_path.as_ref()).context("Failed to open catalog database")?;
        Self::with_connection(conn)
    }

    /// Build a store over an already-open connection (tests use this with
    /// an in-memory database).
    pub fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        conn.execute_batch(CATALOG_SCHEMA)
            .context("Failed to initialize catalog schema")?;

        let song_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))
            .unwrap_or(0);
        info!("Opened song catalog with {} songs", song_count);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Map a predicate onto a SQL condition and the value to bind for it.
    ///
    /// Full-text predicates go through the FTS5 index; everything else is a
    /// plain equality on the joined row. Values are always bound, never
    /// spliced into the SQL text.
    fn predicate_condition(predicate: &Predicate) -> (String, String) {
        match predicate.comparison {
            Comparison::Equals => {
                let column = match predicate.field {
                    FilterField::Group => "g.name",
                    FilterField::Song => "s.title",
                    FilterField::Link => "s.link",
                    FilterField::ReleaseDate => "s.release_date",
                    FilterField::Text => "s.text",
                };
                (format!("{} = ?", column), predicate.value.clone())
            }
            Comparison::FullText => (
                "s.id IN (SELECT song_id FROM songs_fts WHERE songs_fts MATCH ?)".to_string(),
                fts_query(&predicate.value),
            ),
        }
    }

    fn parse_song_row(row: &rusqlite::Row) -> rusqlite::Result<Song> {
        let release_date_raw: String = row.get(3)?;
        let release_date = NaiveDate::parse_from_str(&release_date_raw, STORE_DATE_FORMAT)
            .map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(err),
                )
            })?;

        Ok(Song {
            id: row.get(0)?,
            group: row.get(1)?,
            song: row.get(2)?,
            release_date,
            text: row.get(4)?,
            link: row.get(5)?,
        })
    }

    /// Insert the group if absent and return its id.
    fn upsert_group(tx: &Transaction, name: &str) -> Result<i64> {
        tx.execute(
            "INSERT INTO groups (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            params![name],
        )?;
        let id: i64 = tx.query_row(
            "SELECT id FROM groups WHERE name = ?1",
            params![name],
            |r| r.get(0),
        )?;
        Ok(id)
    }
}

/// Quote a plain-text query for FTS5 so user input is matched as a phrase
/// rather than interpreted as match syntax.
fn fts_query(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

impl CatalogStore for SqliteCatalogStore {
    fn find_songs(&self, predicates: &[Predicate]) -> Result<Vec<Song>> {
        let mut sql = String::from(
            "SELECT s.id, g.name, s.title, s.release_date, s.text, s.link \
             FROM songs s JOIN groups g ON g.id = s.group_id",
        );

        let mut conditions = Vec::with_capacity(predicates.len());
        let mut values = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            let (condition, value) = Self::predicate_condition(predicate);
            conditions.push(condition);
            values.push(value);
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY s.id");

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let songs = stmt
            .query_map(rusqlite::params_from_iter(values.iter()), Self::parse_song_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn get_song_text(&self, title: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            "SELECT text FROM songs WHERE title = ?1 ORDER BY id LIMIT 1",
            params![title],
            |r| r.get(0),
        ) {
            Ok(text) => Ok(Some(text)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn update_song(&self, update: &SongUpdate) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(group) = &update.group {
            let group_id = Self::upsert_group(&tx, group)?;
            assignments.push("group_id = ?");
            values.push(Box::new(group_id));
        }
        if let Some(release_date) = update.release_date {
            assignments.push("release_date = ?");
            values.push(Box::new(release_date.format(STORE_DATE_FORMAT).to_string()));
        }
        if let Some(text) = &update.text {
            assignments.push("text = ?");
            values.push(Box::new(text.clone()));
        }
        if let Some(link) = &update.link {
            assignments.push("link = ?");
            values.push(Box::new(link.clone()));
        }

        if assignments.is_empty() {
            // Nothing to write; still report whether the title matches.
            let matching: i64 = tx.query_row(
                "SELECT COUNT(*) FROM songs WHERE title = ?1",
                params![update.song],
                |r| r.get(0),
            )?;
            tx.commit()?;
            return Ok(matching as usize);
        }

        let sql = format!(
            "UPDATE songs SET {} WHERE title = ?",
            assignments.join(", ")
        );
        values.push(Box::new(update.song.clone()));
        let value_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let affected = tx.execute(&sql, value_refs.as_slice())?;

        if let Some(text) = &update.text {
            tx.execute(
                "UPDATE songs_fts SET text = ?1 \
                 WHERE song_id IN (SELECT id FROM songs WHERE title = ?2)",
                params![text, update.song],
            )?;
        }

        tx.commit().context("Failed to commit song update")?;
        Ok(affected)
    }

    fn delete_song(&self, title: &str) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM songs_fts WHERE song_id IN (SELECT id FROM songs WHERE title = ?1)",
            params![title],
        )?;
        let affected = tx.execute("DELETE FROM songs WHERE title = ?1", params![title])?;

        tx.commit().context("Failed to commit song deletion")?;
        Ok(affected)
    }

    fn insert_song(
        &self,
        new_song: &NewSong,
        release_date: NaiveDate,
        text: &str,
        link: &str,
    ) -> Result<i64> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let group_id = Self::upsert_group(&tx, &new_song.group)?;
        tx.execute(
            "INSERT INTO songs (group_id, title, release_date, text, link) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                group_id,
                new_song.song,
                release_date.format(STORE_DATE_FORMAT).to_string(),
                text,
                link
            ],
        )?;
        let song_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO songs_fts (song_id, text) VALUES (?1, ?2)",
            params![song_id, text],
        )?;

        tx.commit().context("Failed to commit song insert")?;
        Ok(song_id)
    }
}
