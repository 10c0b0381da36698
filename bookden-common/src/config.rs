//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default access-token lifetime in seconds (15 minutes)
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;
/// Default refresh-token lifetime in seconds (7 days)
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 604_800;
/// Default interval between expired-token sweeps in seconds (1 hour)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address, e.g. "127.0.0.1:5760"
    pub bind_addr: String,
    /// Folder holding both database files
    pub data_dir: PathBuf,
    /// HMAC secret for signing access and refresh tokens
    pub jwt_secret: String,
    /// Access-token lifetime in seconds
    pub access_ttl_secs: i64,
    /// Refresh-token lifetime in seconds
    pub refresh_ttl_secs: i64,
    /// Interval between expired-token sweeps in seconds
    pub sweep_interval_secs: u64,
}

/// Subset of settings accepted from the TOML config file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind_addr: Option<String>,
    data_dir: Option<PathBuf>,
    jwt_secret: Option<String>,
    access_ttl_secs: Option<i64>,
    refresh_ttl_secs: Option<i64>,
    sweep_interval_secs: Option<u64>,
}

impl Config {
    /// Resolve configuration in priority order:
    /// 1. Command-line arguments (highest priority)
    /// 2. Environment variables (BOOKDEN_*)
    /// 3. TOML config file
    /// 4. Compiled defaults (fallback)
    pub fn resolve(cli_data_dir: Option<&str>, cli_bind_addr: Option<&str>) -> Result<Config> {
        let file = load_config_file()
            .and_then(|path| read_file_config(&path))
            .unwrap_or_default();

        // Priority 1: CLI, 2: env, 3: file, 4: default
        let data_dir = cli_data_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var("BOOKDEN_DATA_DIR").ok().map(PathBuf::from))
            .or(file.data_dir)
            .unwrap_or_else(default_data_dir);

        let bind_addr = cli_bind_addr
            .map(String::from)
            .or_else(|| std::env::var("BOOKDEN_BIND_ADDR").ok())
            .or(file.bind_addr)
            .unwrap_or_else(|| "127.0.0.1:5760".to_string());

        let jwt_secret = std::env::var("BOOKDEN_JWT_SECRET")
            .ok()
            .or(file.jwt_secret)
            .ok_or_else(|| {
                Error::Config("jwt secret not set (BOOKDEN_JWT_SECRET or config file)".to_string())
            })?;

        if jwt_secret.is_empty() {
            return Err(Error::Config("jwt secret must not be empty".to_string()));
        }

        Ok(Config {
            bind_addr,
            data_dir,
            jwt_secret,
            access_ttl_secs: file.access_ttl_secs.unwrap_or(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl_secs: file.refresh_ttl_secs.unwrap_or(DEFAULT_REFRESH_TTL_SECS),
            sweep_interval_secs: file
                .sweep_interval_secs
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
        })
    }

    /// Path of the relational catalog database
    pub fn catalog_db_path(&self) -> PathBuf {
        self.data_dir.join("catalog.db")
    }

    /// Path of the document-store database
    pub fn document_db_path(&self) -> PathBuf {
        self.data_dir.join("documents.db")
    }
}

fn read_file_config(path: &Path) -> Option<FileConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Locate the configuration file for the platform
fn load_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("BOOKDEN_CONFIG") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("bookden").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/bookden/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// OS-dependent default data folder
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("bookden"))
        .unwrap_or_else(|| PathBuf::from("./bookden_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_paths_under_data_dir() {
        let config = Config {
            bind_addr: "127.0.0.1:5760".to_string(),
            data_dir: PathBuf::from("/tmp/bookden-test"),
            jwt_secret: "secret".to_string(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        };

        assert_eq!(
            config.catalog_db_path(),
            PathBuf::from("/tmp/bookden-test/catalog.db")
        );
        assert_eq!(
            config.document_db_path(),
            PathBuf::from("/tmp/bookden-test/documents.db")
        );
    }
}
