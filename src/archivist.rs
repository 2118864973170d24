//! Command handlers tying the allocator, synchronizer and vault together.
//!
//! The create and sync handlers report their outcome through the notifier,
//! failures included, and then return it to the caller. Nothing is retried.

use crate::allocator::TagAllocator;
use crate::editor::Selection;
use crate::error::{ArchivistError, Result};
use crate::notify::Notifier;
use crate::picker::Picker;
use crate::settings::Settings;
use crate::storage::KeyValueStore;
use crate::sync::{FilenamePattern, SyncReport, TagSynchronizer};
use crate::tag::Tag;
use crate::template::{NoteType, apply_template, embed_link, frontmatter_tags};
use crate::vault::{NoteFile, Vault, join_path};
use log::warn;

pub struct Archivist<V: Vault, S: KeyValueStore, N: Notifier> {
    vault: V,
    settings: Settings,
    allocator: TagAllocator<S>,
    notifier: N,
}

impl<V: Vault, S: KeyValueStore, N: Notifier> Archivist<V, S, N> {
    /// Load the tag counter from `store` and wire up the collaborators.
    pub fn load(vault: V, store: S, notifier: N, settings: Settings) -> Self {
        Self {
            vault,
            settings,
            allocator: TagAllocator::initialize(store),
            notifier,
        }
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn allocator(&self) -> &TagAllocator<S> {
        &self.allocator
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Tag the next created note will get.
    pub fn next_tag_preview(&self) -> Result<Tag> {
        Ok(self.allocator.peek()?)
    }

    /// Create a note holding the configured default content.
    pub fn create_note(&mut self) -> Result<NoteFile> {
        let content = self.settings.default_content.clone();
        self.create_note_with_new_tag(&content, None, &[])
    }

    pub fn create_note_with_new_tag(
        &mut self,
        content: &str,
        note_type: Option<NoteType>,
        inherited_tags: &[String],
    ) -> Result<NoteFile> {
        let result = self.try_create(content, note_type, inherited_tags);
        match &result {
            Ok(file) => self.notifier.notify(&format!("Created note: {}", file.name)),
            Err(err) => self.notifier.notify(&format!("Error creating note: {err}")),
        }
        result
    }

    fn try_create(
        &mut self,
        content: &str,
        note_type: Option<NoteType>,
        inherited_tags: &[String],
    ) -> Result<NoteFile> {
        let allocation = self.allocator.next_tag()?;
        if let Some(err) = &allocation.persist_error {
            self.notifier.notify(&format!(
                "Tag counter could not be saved ({err}); run sync to repair it."
            ));
        }
        let tag = allocation.tag;
        let path = join_path(&self.settings.tag_path, &tag.file_name())?;
        let body = apply_template(content, note_type, &tag, inherited_tags);
        Ok(self.vault.create_file(&path, &body)?)
    }

    /// Turn the selection into a new note and replace it with an embed of
    /// that note. The document is only touched once the note exists.
    pub fn create_from_selection(
        &mut self,
        selection: &mut dyn Selection,
        note_type: Option<NoteType>,
    ) -> Result<NoteFile> {
        let inherited = frontmatter_tags(selection.document_text());
        let content = selection.selected_text();
        let file = self.create_note_with_new_tag(&content, note_type, &inherited)?;
        let tag = tag_of(&file)?;
        if let Err(err) = selection.replace_selection(&embed_link(&tag)) {
            warn!("event=selection_replace_failed note={} error={err}", file.path);
            self.notifier
                .notify(&format!("Created {} but could not update the document: {err}", file.name));
            return Err(err.into());
        }
        Ok(file)
    }

    /// Ask `picker` for a note type, then create an empty typed note.
    pub fn create_with_type(&mut self, picker: &dyn Picker) -> Result<NoteFile> {
        let note_type = self.choose_type(picker)?;
        self.create_note_with_new_tag("", Some(note_type), &[])
    }

    pub fn create_with_type_from_selection(
        &mut self,
        selection: &mut dyn Selection,
        picker: &dyn Picker,
    ) -> Result<NoteFile> {
        let note_type = self.choose_type(picker)?;
        self.create_from_selection(selection, Some(note_type))
    }

    fn choose_type(&self, picker: &dyn Picker) -> Result<NoteType> {
        let names = NoteType::names();
        let picked = picker.pick(&names).map_err(|err| {
            self.notifier.notify(&format!("Could not choose a note type: {err}"));
            ArchivistError::from(err)
        })?;
        match picked.as_deref().and_then(NoteType::from_name) {
            Some(note_type) => Ok(note_type),
            None => {
                self.notifier.notify("No note type chosen.");
                Err(ArchivistError::Dismissed)
            }
        }
    }

    /// Rescan the tag folder and repair the counter.
    pub fn sync_tags(&mut self) -> Result<SyncReport> {
        let synchronizer =
            TagSynchronizer::new(FilenamePattern::from_lenient(self.settings.lenient_sync));
        match synchronizer.sync(&self.vault, &self.settings.tag_path, &mut self.allocator) {
            Ok(report) => {
                let next = self
                    .allocator
                    .peek()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|err| format!("unavailable ({err})"));
                self.notifier.notify(&format!(
                    "Tag counter synced: {} tag note(s) found, next tag is {next}",
                    report.matched
                ));
                if let Some(err) = &report.persist_error {
                    self.notifier.notify(&format!(
                        "Tag counter could not be saved ({err}); the next run starts from the old value."
                    ));
                }
                Ok(report)
            }
            Err(err) => {
                self.notifier.notify(&format!("Sync failed: {err}"));
                Err(err.into())
            }
        }
    }
}

fn tag_of(file: &NoteFile) -> Result<Tag> {
    let stem = file.name.strip_suffix(".md").unwrap_or(&file.name);
    Ok(Tag::parse(stem)?)
}
