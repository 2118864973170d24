//! Error types shared across the crate.
//! Each collaborator gets its own enum; `ArchivistError` wraps them at the
//! command-handler boundary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("tag counter {0} does not fit in four base-36 characters")]
    Overflow(u64),

    #[error("`{0}` is not a tag (expected four characters from 0-9 and A-Z)")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode local storage: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage unavailable")]
    Unavailable,
}

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid vault path `{0}`")]
    InvalidPath(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("tag folder `{0}` does not exist")]
    MissingFolder(String),
}

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("fzf is not installed or MATH_ARCHIVIST_NO_FZF is set; pass --type <name>")]
    Unavailable,

    #[error("picker failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to write settings {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unknown setting `{0}` (expected tag-path, default-content or lenient-sync)")]
    UnknownKey(String),

    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Error, Debug)]
pub enum ArchivistError {
    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Picker(#[from] PickerError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("no note type chosen")]
    Dismissed,

    #[error("editor exited with non-zero status")]
    Editor,
}

pub type Result<T, E = ArchivistError> = std::result::Result<T, E>;
