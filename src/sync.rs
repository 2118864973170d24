//! Counter recovery from the tag notes that actually exist on disk.

use crate::allocator::TagAllocator;
use crate::error::{StoreError, SyncError};
use crate::storage::KeyValueStore;
use crate::tag::{decode_base36, decode_base36_prefix};
use crate::vault::Vault;
use log::{info, warn};
use regex::Regex;
use std::sync::OnceLock;

/// Floor used for the maximum when no tag note is found.
const EMPTY_FOLDER_MAX: u64 = 1;

/// Which filenames count as tag notes during a rescan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilenamePattern {
    /// Four tag characters followed by a literal `.md`.
    #[default]
    Strict,
    /// Four tag characters, any single character, then `md`. The stem is
    /// read up to its first non-base-36 character, so `00ZZ_md` counts as
    /// `00ZZ`.
    Lenient,
}

impl FilenamePattern {
    pub fn from_lenient(lenient: bool) -> Self {
        if lenient { Self::Lenient } else { Self::Strict }
    }

    fn regex(self) -> &'static Regex {
        static STRICT: OnceLock<Regex> = OnceLock::new();
        static LENIENT: OnceLock<Regex> = OnceLock::new();
        match self {
            Self::Strict => STRICT.get_or_init(|| compile(r"^[A-Z0-9]{4}\.md$")),
            Self::Lenient => LENIENT.get_or_init(|| compile(r"^[A-Z0-9]{4}.md$")),
        }
    }

    pub fn matches(self, file_name: &str) -> bool {
        self.regex().is_match(file_name)
    }

    /// Counter value named by a matching file's basename.
    pub fn decode(self, basename: &str) -> Option<u64> {
        match self {
            Self::Strict => decode_base36(basename),
            Self::Lenient => decode_base36_prefix(basename),
        }
    }
}

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("tag filename pattern is a valid regex")
}

#[derive(Debug)]
pub struct SyncReport {
    /// Regular files looked at.
    pub scanned: usize,
    /// Files whose name matched the tag pattern and decoded.
    pub matched: usize,
    pub max_value: u64,
    /// Counter value written to the allocator.
    pub counter: u64,
    /// Set when the new counter could not be written to storage.
    pub persist_error: Option<StoreError>,
}

impl SyncReport {
    pub fn is_durable(&self) -> bool {
        self.persist_error.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagSynchronizer {
    pattern: FilenamePattern,
}

impl TagSynchronizer {
    pub fn new(pattern: FilenamePattern) -> Self {
        Self { pattern }
    }

    /// Rescan `folder_path` and reset the allocator to one past the highest
    /// tag in use. A missing folder is reported and leaves state untouched.
    /// A failed counter write is carried in the report; the in-memory reset
    /// still applies.
    pub fn sync<V, S>(
        &self,
        vault: &V,
        folder_path: &str,
        allocator: &mut TagAllocator<S>,
    ) -> Result<SyncReport, SyncError>
    where
        V: Vault + ?Sized,
        S: KeyValueStore,
    {
        let folder = vault
            .get_folder(folder_path)
            .ok_or_else(|| SyncError::MissingFolder(folder_path.to_string()))?;

        let mut scanned = 0;
        let mut matched = 0;
        let mut max_value = EMPTY_FOLDER_MAX;
        for entry in folder.children.iter().filter(|e| e.is_file()) {
            scanned += 1;
            if !self.pattern.matches(&entry.name) {
                continue;
            }
            match self.pattern.decode(&entry.basename) {
                Some(value) => {
                    matched += 1;
                    max_value = max_value.max(value);
                }
                None => {
                    warn!("event=sync_skip name={:?} reason=undecodable", entry.name);
                }
            }
        }

        let counter = max_value + 1;
        let persist_error = allocator.reset(counter).err();
        info!(
            "event=sync_done folder={:?} scanned={scanned} matched={matched} counter={counter}",
            folder.path
        );
        Ok(SyncReport {
            scanned,
            matched,
            max_value,
            counter,
            persist_error,
        })
    }
}
