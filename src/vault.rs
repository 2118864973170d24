//! Folder lookup and document access relative to a vault root.

use crate::error::VaultError;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub name: String,
    /// `name` without its final extension.
    pub basename: String,
}

impl Entry {
    pub fn new(kind: EntryKind, name: &str) -> Self {
        let basename = match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name.to_string(),
        };
        Self { kind, name: name.to_string(), basename }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

#[derive(Debug, Clone)]
pub struct Folder {
    pub path: String,
    pub children: Vec<Entry>,
}

/// A file created in the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFile {
    /// Vault-relative, normalized path.
    pub path: String,
    pub name: String,
}

pub trait Vault {
    fn get_folder(&self, path: &str) -> Option<Folder>;
    /// Fails with `VaultError::AlreadyExists` rather than overwriting.
    fn create_file(&self, path: &str, content: &str) -> Result<NoteFile, VaultError>;
    fn read_file(&self, path: &str) -> Result<String, VaultError>;
    fn write_file(&self, path: &str, content: &str) -> Result<(), VaultError>;
    fn absolute_path(&self, path: &str) -> Result<PathBuf, VaultError>;
}

/// Collapse separators and `.` segments. `""` and `"/"` both mean the root;
/// `..` is rejected so paths cannot leave the vault.
pub fn normalize_path(raw: &str) -> Result<String, VaultError> {
    let mut parts = Vec::new();
    for segment in raw.trim().split(['/', '\\']) {
        match segment.trim() {
            "" | "." => continue,
            ".." => return Err(VaultError::InvalidPath(raw.to_string())),
            s => parts.push(s),
        }
    }
    Ok(parts.join("/"))
}

/// Join a folder and a file name the way note paths are built.
pub fn join_path(folder: &str, name: &str) -> Result<String, VaultError> {
    normalize_path(&format!("{folder}/{name}"))
}

fn file_name_of(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn io_error(path: &str, source: io::Error) -> VaultError {
        if source.kind() == io::ErrorKind::NotFound {
            VaultError::NotFound(path.to_string())
        } else {
            VaultError::Io { path: path.to_string(), source }
        }
    }
}

impl Vault for FsVault {
    fn get_folder(&self, path: &str) -> Option<Folder> {
        let normalized = normalize_path(path).ok()?;
        let dir = self.root.join(&normalized);
        let entries = fs::read_dir(&dir).ok()?;
        let mut children = Vec::new();
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else { continue };
            let kind = if file_type.is_dir() {
                EntryKind::Folder
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().to_string();
            children.push(Entry::new(kind, &name));
        }
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Some(Folder { path: normalized, children })
    }

    fn create_file(&self, path: &str, content: &str) -> Result<NoteFile, VaultError> {
        let normalized = normalize_path(path)?;
        if normalized.is_empty() {
            return Err(VaultError::InvalidPath(path.to_string()));
        }
        let target = self.root.join(&normalized);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| Self::io_error(&normalized, source))?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|source| {
                if source.kind() == io::ErrorKind::AlreadyExists {
                    VaultError::AlreadyExists(normalized.clone())
                } else {
                    Self::io_error(&normalized, source)
                }
            })?;
        file.write_all(content.as_bytes())
            .map_err(|source| Self::io_error(&normalized, source))?;
        Ok(NoteFile { name: file_name_of(&normalized), path: normalized })
    }

    fn read_file(&self, path: &str) -> Result<String, VaultError> {
        let normalized = normalize_path(path)?;
        fs::read_to_string(self.root.join(&normalized))
            .map_err(|source| Self::io_error(&normalized, source))
    }

    fn write_file(&self, path: &str, content: &str) -> Result<(), VaultError> {
        let normalized = normalize_path(path)?;
        fs::write(self.root.join(&normalized), content)
            .map_err(|source| Self::io_error(&normalized, source))
    }

    fn absolute_path(&self, path: &str) -> Result<PathBuf, VaultError> {
        Ok(self.root.join(normalize_path(path)?))
    }
}
