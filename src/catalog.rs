//! Read-side view of the tag notes in the configured folder.

use crate::sync::FilenamePattern;
use crate::tag::Tag;
use crate::template::{NoteType, frontmatter, frontmatter_tags};
use crate::vault::{Vault, join_path};
use chrono::{DateTime, Local};
use log::warn;
use std::fs;

#[derive(Debug, Clone)]
pub struct TagNote {
    pub tag: Tag,
    pub path: String,
    pub note_type: Option<NoteType>,
    pub preview: String,
    pub modified: Option<DateTime<Local>>,
}

/// Tag notes directly inside `folder_path`, ordered by tag. A missing folder
/// gives an empty list.
pub fn scan_tag_notes<V: Vault + ?Sized>(
    vault: &V,
    folder_path: &str,
    pattern: FilenamePattern,
) -> Vec<TagNote> {
    let Some(folder) = vault.get_folder(folder_path) else {
        return Vec::new();
    };
    let mut notes: Vec<TagNote> = folder
        .children
        .iter()
        .filter(|e| e.is_file() && pattern.matches(&e.name))
        .filter_map(|entry| {
            let tag = Tag::parse(&entry.basename).ok()?;
            let path = join_path(&folder.path, &entry.name).ok()?;
            match vault.read_file(&path) {
                Ok(text) => Some(describe(tag, path, &text, modified_time(vault, &entry.name, &folder.path))),
                Err(err) => {
                    warn!("event=catalog_skip path={path} error={err}");
                    None
                }
            }
        })
        .collect();
    notes.sort_by(|a, b| a.tag.cmp(&b.tag));
    notes
}

fn modified_time<V: Vault + ?Sized>(vault: &V, name: &str, folder: &str) -> Option<DateTime<Local>> {
    let path = vault.absolute_path(&join_path(folder, name).ok()?).ok()?;
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified))
}

pub fn describe(
    tag: Tag,
    path: String,
    text: &str,
    modified: Option<DateTime<Local>>,
) -> TagNote {
    let note_type = frontmatter_tags(text)
        .iter()
        .find_map(|t| NoteType::from_name(t));
    TagNote {
        preview: preview_line(body_of(text), note_type, &tag),
        tag,
        path,
        note_type,
        modified,
    }
}

/// Text after the frontmatter block, or the whole text when there is none.
pub fn body_of(text: &str) -> &str {
    if frontmatter(text).is_none() {
        return text;
    }
    let Some(rest) = text.strip_prefix("---\n") else {
        return text;
    };
    match rest.find("\n---") {
        Some(idx) => {
            let after = &rest[idx + 4..];
            after.strip_prefix('\n').unwrap_or(after)
        }
        None => text,
    }
}

fn preview_line(body: &str, note_type: Option<NoteType>, tag: &Tag) -> String {
    let mut first_line = body
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim();
    if let Some(t) = note_type {
        let header = format!("**{t} {tag}.**");
        first_line = first_line.strip_prefix(header.as_str()).unwrap_or(first_line).trim();
    }
    let mut text = if first_line.is_empty() {
        "[empty]".to_string()
    } else {
        first_line.to_string()
    };
    const MAX_LEN: usize = 100;
    if text.chars().count() > MAX_LEN {
        text = text.chars().take(MAX_LEN).collect::<String>();
        text.push('…');
    }
    text
}
