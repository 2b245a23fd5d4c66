//! HTTP client for the external song metadata lookup service.

use super::models::SongDetails;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the lookup collaborator.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("lookup service returned status {0}")]
    Status(u16),

    #[error("lookup service returned an invalid release date {0:?}")]
    InvalidReleaseDate(String),
}

/// External collaborator providing release date, lyrics and link for a
/// (group, song) pair.
#[async_trait]
pub trait LookupService: Send + Sync {
    async fn get_song_details(&self, group: &str, song: &str)
        -> Result<SongDetails, LookupError>;
}

/// `LookupService` implementation talking to the real service over HTTP:
/// `GET {base_url}/info?group=...&song=...`.
pub struct HttpLookupClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLookupClient {
    /// # Arguments
    /// * `base_url` - Base URL of the lookup service (e.g. "http://localhost:8080")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, timeout_sec: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        // Ensure base_url doesn't have a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LookupService for HttpLookupClient {
    async fn get_song_details(
        &self,
        group: &str,
        song: &str,
    ) -> Result<SongDetails, LookupError> {
        let url = format!("{}/info", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("group", group), ("song", song)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}
