//! In-process stand-in for the external song metadata lookup service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type SongTable = Arc<Mutex<HashMap<(String, String), serde_json::Value>>>;

#[derive(Clone, Default)]
struct StubState {
    songs: SongTable,
}

#[derive(Deserialize)]
struct InfoParams {
    group: String,
    song: String,
}

async fn get_info(State(state): State<StubState>, Query(params): Query<InfoParams>) -> Response {
    let songs = state.songs.lock().unwrap();
    match songs.get(&(params.group, params.song)) {
        Some(details) => Json(details.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serves `GET /info` on an ephemeral port, answering from a programmable
/// in-memory table. Unknown (group, song) pairs get a 404.
pub struct StubLookupService {
    pub base_url: String,
    songs: SongTable,
}

impl StubLookupService {
    pub async fn spawn() -> Self {
        let state = StubState::default();
        let songs = state.songs.clone();

        let app = Router::new().route("/info", get(get_info)).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            songs,
        }
    }

    /// Register the details the stub returns for a (group, song) pair.
    pub fn add_song(&self, group: &str, song: &str, release_date: &str, text: &str, link: &str) {
        self.songs.lock().unwrap().insert(
            (group.to_string(), song.to_string()),
            json!({ "releaseDate": release_date, "text": text, "link": link }),
        );
    }
}
