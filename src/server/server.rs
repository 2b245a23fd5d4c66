use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::catalog_store::{NewSong, SongFilter};
use crate::service::{ServiceError, SongService};

use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 1000;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct PageParams {
    page: Option<usize>,
    limit: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct TextParams {
    song: String,
    page: Option<usize>,
    limit: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct DeleteParams {
    song: String,
}

#[derive(Serialize)]
struct TextResponse {
    text: String,
}

#[derive(Serialize)]
struct CreatedResponse {
    id: i64,
}

fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Validation(_) | ServiceError::Boundary(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Upstream(_) | ServiceError::Persistence(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
    } else {
        debug!("Request rejected: {}", err);
    }
    (status, err.to_string()).into_response()
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn search_songs(
    State(service): State<GuardedSongService>,
    Query(params): Query<PageParams>,
    Json(filter): Json<SongFilter>,
) -> Response {
    let page = params.page.unwrap_or(DEFAULT_PAGE);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    match service.search_songs(&filter, page, limit) {
        Ok(songs) => Json(songs).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_song_text(
    State(service): State<GuardedSongService>,
    Query(params): Query<TextParams>,
) -> Response {
    let page = params.page.unwrap_or(DEFAULT_PAGE);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    match service.get_song_text(&params.song, page, limit) {
        Ok(text) => Json(TextResponse { text }).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_song(
    State(service): State<GuardedSongService>,
    Json(filter): Json<SongFilter>,
) -> Response {
    match service.update_song(&filter) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_song(
    State(service): State<GuardedSongService>,
    Query(params): Query<DeleteParams>,
) -> Response {
    match service.delete_song(&params.song) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_song(
    State(service): State<GuardedSongService>,
    Json(new_song): Json<NewSong>,
) -> Response {
    match service.create_song(&new_song).await {
        Ok(id) => Json(CreatedResponse { id }).into_response(),
        Err(err) => error_response(err),
    }
}

pub fn make_app(config: ServerConfig, service: Arc<SongService>) -> Router {
    let state = ServerState {
        config,
        start_time: Instant::now(),
        hash: env!("GIT_HASH").to_string(),
        service,
    };

    Router::new()
        .route("/", get(home))
        .route("/search", post(search_songs))
        .route("/text", get(get_song_text).post(get_song_text))
        .route("/update", post(update_song))
        .route("/delete", delete(delete_song))
        .route("/create", post(create_song))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

pub async fn run_server(
    service: Arc<SongService>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
    };
    let app = make_app(config, service);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
