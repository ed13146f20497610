use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::util::shellexpand;

pub const DB_ENV: &str = "FUNDGUARD_DB";
pub const LOG_ENV: &str = "FUNDGUARD_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings for the command-line front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Config {
    /// Resolve from the `--db` flag, then `FUNDGUARD_DB`, then the platform
    /// data directory.
    pub fn resolve(db_flag: Option<&str>) -> Result<Self> {
        Self::from_sources(
            db_flag,
            std::env::var(DB_ENV).ok().as_deref(),
            std::env::var(LOG_ENV).ok().as_deref(),
        )
    }

    fn from_sources(db_flag: Option<&str>, db_env: Option<&str>, log_env: Option<&str>) -> Result<Self> {
        let db_path = match db_flag.or(db_env).filter(|p| !p.trim().is_empty()) {
            Some(p) => PathBuf::from(shellexpand(p)),
            None => default_db_path()?,
        };
        let log_filter = log_env
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_LOG_FILTER)
            .to_string();
        Ok(Self {
            db_path,
            log_filter,
        })
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("na", "fundguard", "FundGuard")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("fundguard.db"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
