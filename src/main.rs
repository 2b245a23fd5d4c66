use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use song_catalog_server::catalog_store::SqliteCatalogStore;
use song_catalog_server::config::{AppConfig, CliConfig, FileConfig};
use song_catalog_server::lookup::HttpLookupClient;
use song_catalog_server::server::{run_server, RequestsLoggingLevel};
use song_catalog_server::service::SongService;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite catalog database file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Base URL of the external song metadata lookup service.
    #[clap(long)]
    pub lookup_url: Option<String>,

    /// Timeout in seconds for lookup service requests.
    #[clap(long, default_value_t = 30)]
    pub lookup_timeout_sec: u64,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to an optional TOML config file; its values override CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db_path.clone(),
        port: cli_args.port,
        logging_level: cli_args.logging_level.clone(),
        lookup_url: cli_args.lookup_url.clone(),
        lookup_timeout_sec: cli_args.lookup_timeout_sec,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite catalog database at {:?}...", config.db_path);
    let store = Arc::new(SqliteCatalogStore::new(&config.db_path)?);

    info!("Lookup service configured at {}", config.lookup_url);
    let lookup = Arc::new(
        HttpLookupClient::new(config.lookup_url.clone(), config.lookup_timeout_sec)
            .context("Failed to create lookup service client")?,
    );

    let service = Arc::new(SongService::new(store, lookup));

    info!("Ready to serve at port {}!", config.port);
    run_server(service, config.logging_level, config.port).await
}
