//! Text selections inside vault documents.

use crate::error::VaultError;
use crate::vault::Vault;
use std::ops::Range;

pub trait Selection {
    fn selected_text(&self) -> String;
    fn replace_selection(&mut self, text: &str) -> Result<(), VaultError>;
    /// Full text of the document holding the selection.
    fn document_text(&self) -> &str;
}

/// How a selection is located in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSpec {
    /// 1-based inclusive line range.
    Lines { start: usize, end: usize },
    /// First occurrence of a literal string.
    Text(String),
}

impl SelectionSpec {
    /// Parse `A:B` (or a single line `A`) for `--lines`.
    pub fn parse_lines(raw: &str) -> Result<Self, String> {
        let (a, b) = raw.split_once(':').unwrap_or((raw, raw));
        let start: usize = a.trim().parse().map_err(|_| format!("Invalid line range: {raw}"))?;
        let end: usize = b.trim().parse().map_err(|_| format!("Invalid line range: {raw}"))?;
        if start == 0 || end < start {
            return Err(format!("Invalid line range: {raw}"));
        }
        Ok(Self::Lines { start, end })
    }

    /// Byte range of the selection in `text`, excluding the trailing newline
    /// of the last selected line.
    pub fn locate(&self, text: &str) -> Option<Range<usize>> {
        match self {
            SelectionSpec::Text(needle) => {
                if needle.is_empty() {
                    return None;
                }
                text.find(needle.as_str()).map(|at| at..at + needle.len())
            }
            SelectionSpec::Lines { start, end } => {
                let mut offset = 0;
                let mut range_start = None;
                for (idx, line) in text.split_inclusive('\n').enumerate() {
                    let number = idx + 1;
                    if number == *start {
                        range_start = Some(offset);
                    }
                    let content_len = line.strip_suffix('\n').map_or(line.len(), str::len);
                    if number == *end {
                        return range_start.map(|s| s..offset + content_len);
                    }
                    offset += line.len();
                }
                None
            }
        }
    }
}

/// A selection inside one vault document; replacing it writes the document.
pub struct DocumentSelection<'v, V: Vault + ?Sized> {
    vault: &'v V,
    path: String,
    text: String,
    range: Range<usize>,
}

impl<'v, V: Vault + ?Sized> DocumentSelection<'v, V> {
    pub fn open(vault: &'v V, path: &str, spec: &SelectionSpec) -> Result<Self, String> {
        let text = vault.read_file(path).map_err(|e| e.to_string())?;
        let range = spec
            .locate(&text)
            .ok_or_else(|| format!("Selection not found in {path}"))?;
        Ok(Self { vault, path: path.to_string(), text, range })
    }
}

impl<V: Vault + ?Sized> Selection for DocumentSelection<'_, V> {
    fn selected_text(&self) -> String {
        self.text[self.range.clone()].to_string()
    }

    fn replace_selection(&mut self, replacement: &str) -> Result<(), VaultError> {
        let mut updated = String::with_capacity(self.text.len());
        updated.push_str(&self.text[..self.range.start]);
        updated.push_str(replacement);
        updated.push_str(&self.text[self.range.end..]);
        self.vault.write_file(&self.path, &updated)?;
        self.range = self.range.start..self.range.start + replacement.len();
        self.text = updated;
        Ok(())
    }

    fn document_text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::FsVault;
    use std::fs;
    use tempfile::tempdir;

    const DOC: &str = "line one\nline two\nline three\n";

    #[test]
    fn test_parse_lines() {
        assert_eq!(
            SelectionSpec::parse_lines("2:3").unwrap(),
            SelectionSpec::Lines { start: 2, end: 3 }
        );
        assert_eq!(
            SelectionSpec::parse_lines("4").unwrap(),
            SelectionSpec::Lines { start: 4, end: 4 }
        );
        assert!(SelectionSpec::parse_lines("0:1").is_err());
        assert!(SelectionSpec::parse_lines("3:2").is_err());
        assert!(SelectionSpec::parse_lines("a:b").is_err());
    }

    #[test]
    fn test_locate_lines() {
        let spec = SelectionSpec::Lines { start: 2, end: 3 };
        let range = spec.locate(DOC).unwrap();
        assert_eq!(&DOC[range], "line two\nline three");
        assert!(SelectionSpec::Lines { start: 4, end: 4 }.locate(DOC).is_none());
    }

    #[test]
    fn test_locate_text() {
        let range = SelectionSpec::Text("two".to_string()).locate(DOC).unwrap();
        assert_eq!(&DOC[range], "two");
        assert!(SelectionSpec::Text("four".to_string()).locate(DOC).is_none());
        assert!(SelectionSpec::Text(String::new()).locate(DOC).is_none());
    }

    #[test]
    fn test_replace_selection_writes_document() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("doc.md"), DOC).unwrap();
        let vault = FsVault::new(tmp.path());
        let mut sel = DocumentSelection::open(
            &vault,
            "doc.md",
            &SelectionSpec::Lines { start: 2, end: 2 },
        )
        .unwrap();
        assert_eq!(sel.selected_text(), "line two");

        sel.replace_selection("![[0001]]").unwrap();
        let written = fs::read_to_string(tmp.path().join("doc.md")).unwrap();
        assert_eq!(written, "line one\n![[0001]]\nline three\n");
        assert_eq!(sel.selected_text(), "![[0001]]");
        assert_eq!(sel.document_text(), written);
    }
}
