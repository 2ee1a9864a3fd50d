//! Runtime configuration for HiChess.
//!
//! Every tunable has a built-in default and can be overridden through a
//! dedicated environment variable.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Environment variable overriding the settings directory.
pub const CONFIG_DIR_ENV: &str = "HICHESS_CONFIG_DIR";

/// Environment variable overriding the log file location.
pub const LOG_PATH_ENV: &str = "HICHESS_LOG_PATH";

/// Used when the platform has no notion of a home directory.
const FALLBACK_CONFIG_DIR: &str = "./hichess";

const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "hichess.log";

/// Get the directory holding `settings.json`.
///
/// Priority:
/// 1. `HICHESS_CONFIG_DIR` env variable if set
/// 2. the platform config directory (`$XDG_CONFIG_HOME/hichess` on Linux)
/// 3. `./hichess` as fallback
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(dirs) = ProjectDirs::from("", "", "hichess") {
        return dirs.config_dir().to_path_buf();
    }

    PathBuf::from(FALLBACK_CONFIG_DIR)
}

pub fn get_settings_path() -> PathBuf {
    get_config_dir().join(SETTINGS_FILE)
}

/// Get the log file path.
///
/// Priority:
/// 1. `HICHESS_LOG_PATH` env variable if set
/// 2. `hichess.log` inside the config directory
pub fn get_log_path() -> PathBuf {
    if let Ok(path) = std::env::var(LOG_PATH_ENV) {
        return PathBuf::from(path);
    }

    get_config_dir().join(LOG_FILE)
}
