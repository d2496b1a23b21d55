use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use crate::mealdb::DEFAULT_BASE_URL;

/// Overrides the database location.
pub const DB_ENV: &str = "LARDER_DB";
/// Overrides the remote API base URL.
pub const API_BASE_ENV: &str = "LARDER_API_BASE";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub api_base: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "larder").context("Could not determine home directory")?;

        let db_override = std::env::var_os(DB_ENV).map(PathBuf::from);
        let api_override = std::env::var(API_BASE_ENV).ok();
        Self::resolve(proj_dirs.data_dir(), db_override, api_override)
    }

    fn resolve(
        data_dir: &Path,
        db_override: Option<PathBuf>,
        api_override: Option<String>,
    ) -> Result<Self> {
        let data_dir = data_dir.to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = db_override
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| data_dir.join("larder.db"));

        let api_base = api_override
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Config {
            db_path,
            data_dir,
            api_base,
        })
    }
}
