use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::spotify::SpotifyConfig;
use crate::tidal::TidalConfig;

pub const APP_NAME: &str = "mixseed";
pub const PLAYLIST_DESCRIPTION: &str = "Generated by mixseed";
pub const REQUEST_TIMEOUT_SECONDS: u64 = 15;

/// Seeds accepted by a recommendation request, and refs searched per upload.
pub const MAX_SEEDS: usize = 5;
pub const SEARCH_CAP: usize = 5;
pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 20;

pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn get_config_file_path() -> PathBuf {
    get_config_dir().join("config.json")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub tidal: TidalConfig,
    /// Where sessions and history are stored.
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spotify: SpotifyConfig::default(),
            tidal: TidalConfig::default(),
            data_dir: get_data_dir(),
        }
    }
}

impl AppConfig {
    /// Reads the config file when present, then applies environment overrides.
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::from_file(&get_config_file_path())?.unwrap_or_default();
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Option<Self>, AppError> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(None);
        }

        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })?;

        log::info!("Loaded config from {}", path.display());
        Ok(Some(config))
    }

    fn apply_env(&mut self) {
        if let Ok(id) = env::var("MIXSEED_SPOTIFY_CLIENT_ID") {
            self.spotify.client_id = id;
        }
        if let Ok(id) = env::var("MIXSEED_TIDAL_CLIENT_ID") {
            self.tidal.client_id = id;
        }
        if let Ok(secret) = env::var("MIXSEED_TIDAL_CLIENT_SECRET") {
            self.tidal.client_secret = secret;
        }
        if let Ok(uri) = env::var("MIXSEED_REDIRECT_URI") {
            self.spotify.redirect_uri = uri.clone();
            self.tidal.redirect_uri = uri;
        }
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("history.json")
    }
}
