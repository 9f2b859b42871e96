pub mod analysis;
pub mod calibration;
pub mod db;
pub mod detection;
pub mod ergonomics;
pub mod models;
pub mod overlay;
pub mod settings;
pub mod utils;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use db::Database;
use settings::SettingsStore;

pub use utils::logging::init_logging;

const ENABLE_LOGS: bool = true;

const DATA_DIR_ENV: &str = "DESKOPT_DATA_DIR";

/// Long-lived handles shared by every command.
pub struct AppState {
    pub db: Database,
    pub settings: SettingsStore,
}

impl AppState {
    /// Open (creating if needed) the database and settings under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let db = Database::new(data_dir.join("deskopt.sqlite3"))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;
        crate::log_info!("deskopt data directory: {}", data_dir.display());

        Ok(Self { db, settings })
    }
}

/// `$DESKOPT_DATA_DIR`, else `~/.deskopt`, else `./.deskopt`.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deskopt")
}
