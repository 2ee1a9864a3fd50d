//! Persisted user settings: the current username and engine, plus every
//! value accepted before.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const USERNAME_MIN: usize = 6;
const USERNAME_MAX: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid username {0:?}: use 6 to 16 letters, digits or underscores")]
    InvalidUsername(String),
    #[error("Engine not found: {}", .0.display())]
    EngineNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub username: Option<String>,
    pub engine_path: Option<PathBuf>,
    /// Every username accepted so far.
    pub usernames: BTreeSet<String>,
    /// Every engine path accepted so far.
    pub engines: BTreeSet<PathBuf>,
}

impl Settings {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Select `name` and remember it. Rejected names leave the settings
    /// untouched.
    pub fn set_username(&mut self, name: &str) -> Result<(), SettingsError> {
        validate_username(name)?;
        self.usernames.insert(name.to_string());
        self.username = Some(name.to_string());
        Ok(())
    }

    /// Select the engine at `path` and remember it. The path must name an
    /// existing file.
    pub fn set_engine_path(&mut self, path: impl Into<PathBuf>) -> Result<(), SettingsError> {
        let path = path.into();
        if !path.is_file() {
            return Err(SettingsError::EngineNotFound(path));
        }
        self.engines.insert(path.clone());
        self.engine_path = Some(path);
        Ok(())
    }

    /// Forget everything, remembered values included.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Usernames are 6 to 16 ASCII letters, digits or underscores.
pub fn validate_username(name: &str) -> Result<(), SettingsError> {
    let valid = (USERNAME_MIN..=USERNAME_MAX).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(SettingsError::InvalidUsername(name.to_string()))
    }
}
