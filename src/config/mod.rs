mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that participate in config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub lookup_url: Option<String>,
    pub lookup_timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub lookup_url: String,
    pub lookup_timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db-path or in config file")
            })?;

        let lookup_url = file.lookup_url.or_else(|| cli.lookup_url.clone()).ok_or_else(|| {
            anyhow::anyhow!("lookup_url must be specified via --lookup-url or in config file")
        })?;

        let logging_level = match file.logging_level {
            Some(raw) => match RequestsLoggingLevel::from_str(&raw, true) {
                Ok(level) => level,
                Err(_) => bail!("Invalid logging_level in config file: {}", raw),
            },
            None => cli.logging_level.clone(),
        };

        Ok(AppConfig {
            db_path,
            port: file.port.unwrap_or(cli.port),
            logging_level,
            lookup_url,
            lookup_timeout_sec: file.lookup_timeout_sec.unwrap_or(cli.lookup_timeout_sec),
        })
    }
}
