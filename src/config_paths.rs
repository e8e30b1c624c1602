//! Where crossmap keeps its files
//!
//! ```text
//! <config_dir>/
//!   config.yaml        editor configuration
//!   frameworks/*.json  framework listings registered at startup
//!   logs/              daily-rotated debug logs
//! ```
//!
//! `<config_dir>` is `$XDG_CONFIG_HOME/crossmap`, `~/.config/crossmap`, or
//! `%APPDATA%\crossmap` on Windows.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "crossmap";

/// File name prefix of the rotated log files
pub const LOG_FILE_PREFIX: &str = "crossmap.log";

pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

pub fn frameworks_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("frameworks"))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Create the logs dir if needed and return it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "no config directory available".to_string())?;
    fs::create_dir_all(&logs)
        .map_err(|e| format!("failed to create {}: {}", logs.display(), e))?;
    Ok(logs)
}

/// Framework listings in the config dir, sorted by file name
pub fn framework_files() -> Vec<PathBuf> {
    frameworks_dir()
        .map(|dir| json_files_in(&dir))
        .unwrap_or_default()
}

/// `*.json` files directly inside `dir`, sorted; empty if `dir` is unreadable
pub fn json_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        tracing::debug!("no framework directory at {}", dir.display());
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_files_in_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "notes.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let names: Vec<_> = json_files_in(dir.path())
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_owned))
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(json_files_in(&dir.path().join("absent")).is_empty());
    }
}
