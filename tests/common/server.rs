//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own temporary database and
//! its own stub lookup service.

use super::StubLookupService;
use song_catalog_server::catalog_store::SqliteCatalogStore;
use song_catalog_server::lookup::HttpLookupClient;
use song_catalog_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use song_catalog_server::service::SongService;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A live server over a temporary database, plus its stub lookup service.
pub struct TestServer {
    /// Base URL for making requests (e.g. "http://127.0.0.1:12345")
    pub base_url: String,

    /// The stub the create workflow will call for enrichment data.
    pub lookup: StubLookupService,

    // Keep the database directory alive until drop
    _temp_db_dir: TempDir,
}

impl TestServer {
    /// Spawns a new test server on a random port.
    pub async fn spawn() -> Self {
        let lookup = StubLookupService::spawn().await;

        let temp_db_dir = TempDir::new().unwrap();
        let db_path = temp_db_dir.path().join("catalog.db");
        let store = Arc::new(SqliteCatalogStore::new(&db_path).unwrap());

        let lookup_client = Arc::new(HttpLookupClient::new(lookup.base_url.clone(), 5).unwrap());
        let service = Arc::new(SongService::new(store, lookup_client));

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            ..ServerConfig::default()
        };
        let app = make_app(config, service);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            lookup,
            _temp_db_dir: temp_db_dir,
        }
    }
}
