//! Persisted plugin settings, stored as JSON inside the vault state folder.

use crate::error::SettingsError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const STATE_DIR: &str = ".archivist";
pub const SETTINGS_FILE: &str = "data.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Vault folder that holds tag notes.
    pub tag_path: String,
    /// Content used by the plain "new note" command.
    pub default_content: String,
    /// Accept any separator between the tag and `md` when syncing.
    pub lenient_sync: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tag_path: "/".to_string(),
            default_content: String::new(),
            lenient_sync: false,
        }
    }
}

impl Settings {
    /// Apply a `settings set <key> <value>` update.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            "tag-path" | "tagPath" => self.tag_path = value.to_string(),
            "default-content" | "defaultContent" => {
                self.default_content = value.to_string()
            }
            "lenient-sync" | "lenientSync" => {
                self.lenient_sync = match value.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => {
                        return Err(SettingsError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    pub fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("tag-path", self.tag_path.clone()),
            ("default-content", format!("{:?}", self.default_content)),
            ("lenient-sync", self.lenient_sync.to_string()),
        ]
    }
}

pub fn state_dir(vault_root: &Path) -> PathBuf {
    vault_root.join(STATE_DIR)
}

pub fn settings_path(vault_root: &Path) -> PathBuf {
    state_dir(vault_root).join(SETTINGS_FILE)
}

/// Load settings merged over defaults. A missing file yields defaults; an
/// unreadable or corrupt one is logged and also yields defaults.
pub fn load_settings(path: &Path) -> Settings {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Settings::default();
        }
        Err(err) => {
            warn!("event=settings_unreadable path={} error={err}", path.display());
            return Settings::default();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!(
            "event=settings_corrupt path={} error={err}; using defaults",
            path.display()
        );
        Settings::default()
    })
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let encoded = serde_json::to_string_pretty(settings)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, encoded)
        .map_err(|source| SettingsError::Write { path: path.to_path_buf(), source })
}
