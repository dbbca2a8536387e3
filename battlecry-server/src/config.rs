//! Process configuration, read once at startup

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Postgres URL for the file store; in-memory when absent
    pub database_url: Option<String>,
    /// Shared temp root holding per-request workspaces
    pub temp_dir: PathBuf,
    pub dart_bin: String,
    pub max_concurrent_compiles: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let cwd = env::current_dir().context("Failed to resolve working directory")?;
        Self::from_lookup(|key| env::var(key).ok(), cwd)
    }

    /// Build from an arbitrary variable source; relative defaults resolve
    /// against `cwd`
    pub fn from_lookup<F>(lookup: F, cwd: PathBuf) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let server_port = match non_empty("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?,
            None => 5555,
        };

        let max_concurrent_compiles = match non_empty("BATTLECRY_MAX_CONCURRENT_COMPILES") {
            Some(value) => {
                let permits: usize = value.trim().parse().with_context(|| {
                    format!("Invalid BATTLECRY_MAX_CONCURRENT_COMPILES: {}", value)
                })?;
                if permits == 0 {
                    anyhow::bail!("BATTLECRY_MAX_CONCURRENT_COMPILES must be at least 1");
                }
                Some(permits)
            }
            None => None,
        };

        Ok(Self {
            server_host: non_empty("BATTLECRY_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port,
            database_url: non_empty("DATABASE_URL").or_else(|| non_empty("DB_URL")),
            temp_dir: non_empty("BATTLECRY_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| cwd.join("temp")),
            dart_bin: non_empty("DART_BIN").unwrap_or_else(|| "dart".to_string()),
            max_concurrent_compiles,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
