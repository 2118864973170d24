//! Note types and the content written into new tag notes.

use crate::tag::Tag;
use log::debug;
use pulldown_cmark::{Event, MetadataBlockKind, Options, Parser, Tag as MdTag, TagEnd};
use serde::Deserialize;
use std::fmt;

/// Tag every generated note carries.
pub const BASE_TAG: &str = "math";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteType {
    Algorithm,
    Definition,
    Lemma,
    Proposition,
    Theorem,
    Remark,
    Example,
    Corollary,
    Exercise,
}

impl NoteType {
    /// Picker order.
    pub const ALL: [NoteType; 9] = [
        NoteType::Algorithm,
        NoteType::Definition,
        NoteType::Lemma,
        NoteType::Proposition,
        NoteType::Theorem,
        NoteType::Remark,
        NoteType::Example,
        NoteType::Corollary,
        NoteType::Exercise,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NoteType::Algorithm => "Algorithm",
            NoteType::Definition => "Definition",
            NoteType::Lemma => "Lemma",
            NoteType::Proposition => "Proposition",
            NoteType::Theorem => "Theorem",
            NoteType::Remark => "Remark",
            NoteType::Example => "Example",
            NoteType::Corollary => "Corollary",
            NoteType::Exercise => "Exercise",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.name()).collect()
    }

    /// Exact, case-sensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the full note text: a YAML frontmatter tag list followed by an
/// optional `**Type TAG.** ` header and the raw content.
///
/// Inherited tags named `math` or after a note type are dropped so the
/// generated list never repeats them.
pub fn apply_template(
    content: &str,
    note_type: Option<NoteType>,
    tag: &Tag,
    inherited_tags: &[String],
) -> String {
    let mut out = String::from("---\ntags:\n");
    out.push_str(&format!("  - {BASE_TAG}\n"));
    if let Some(t) = note_type {
        out.push_str(&format!("  - {t}\n"));
    }
    for inherited in inherited_tags {
        if inherited == BASE_TAG || NoteType::from_name(inherited).is_some() {
            continue;
        }
        out.push_str(&format!("  - {inherited}\n"));
    }
    out.push_str("---\n");
    if let Some(t) = note_type {
        out.push_str(&format!("**{t} {tag}.** "));
    }
    out.push_str(content);
    out
}

/// Markdown embed pointing at a tag note.
pub fn embed_link(tag: &Tag) -> String {
    format!("![[{tag}]]")
}

/// Text of the leading YAML metadata block, if the document has one.
pub fn frontmatter(document: &str) -> Option<String> {
    let parser = Parser::new_ext(document, Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    let mut events = parser.into_iter();
    match events.next() {
        Some(Event::Start(MdTag::MetadataBlock(MetadataBlockKind::YamlStyle))) => {}
        _ => return None,
    }
    let mut yaml = String::new();
    for event in events {
        match event {
            Event::Text(text) => yaml.push_str(&text),
            Event::End(TagEnd::MetadataBlock(_)) => break,
            _ => {}
        }
    }
    Some(yaml)
}

#[derive(Debug, Deserialize)]
struct Frontmatter {
    #[serde(default)]
    tags: Option<OneOrMany<serde_yaml::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Values of the `tags` key in the document's frontmatter, either a list or
/// a single scalar. Missing or unparseable frontmatter gives an empty list.
pub fn frontmatter_tags(document: &str) -> Vec<String> {
    let Some(yaml) = frontmatter(document) else {
        return Vec::new();
    };
    if yaml.trim().is_empty() {
        return Vec::new();
    }
    let parsed: Frontmatter = match serde_yaml::from_str(&yaml) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!("ignoring unparseable frontmatter: {err}");
            return Vec::new();
        }
    };
    match parsed.tags {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => scalar_text(&value).into_iter().collect(),
        Some(OneOrMany::Many(values)) => values.iter().filter_map(scalar_text).collect(),
    }
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    let text = match value {
        serde_yaml::Value::String(s) => s.trim().to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(n: u64) -> Tag {
        Tag::from_counter(n).unwrap()
    }

    #[test]
    fn test_apply_template_plain() {
        let out = apply_template("body", None, &tag(1), &[]);
        assert_eq!(out, "---\ntags:\n  - math\n---\nbody");
    }

    #[test]
    fn test_apply_template_with_type_and_inherited_tags() {
        let inherited = vec![
            "math".to_string(),
            "Lemma".to_string(),
            "topology".to_string(),
        ];
        let out = apply_template(
            "Every compact set is closed.",
            Some(NoteType::Theorem),
            &tag(10),
            &inherited,
        );
        assert_eq!(
            out,
            "---\ntags:\n  - math\n  - Theorem\n  - topology\n---\n**Theorem 000A.** Every compact set is closed."
        );
    }

    #[test]
    fn test_note_type_lookup() {
        assert_eq!(NoteType::from_name("Lemma"), Some(NoteType::Lemma));
        assert_eq!(NoteType::from_name("lemma"), None);
        assert_eq!(NoteType::names().len(), 9);
        assert_eq!(NoteType::names()[0], "Algorithm");
    }

    #[test]
    fn test_embed_link() {
        assert_eq!(embed_link(&tag(36)), "![[0010]]");
    }

    #[test]
    fn test_frontmatter_tags_block_list() {
        let doc = "---\ntitle: Notes\ntags:\n  - math\n  - \"analysis\"\n  - Lemma\nauthor: me\n---\n# Heading\n";
        assert_eq!(frontmatter_tags(doc), vec!["math", "analysis", "Lemma"]);
    }

    #[test]
    fn test_frontmatter_tags_inline_and_scalar() {
        assert_eq!(
            frontmatter_tags("---\ntags: [algebra, 'rings']\n---\ntext"),
            vec!["algebra", "rings"]
        );
        assert_eq!(frontmatter_tags("---\ntags: algebra\n---\ntext"), vec!["algebra"]);
    }

    #[test]
    fn test_frontmatter_tags_skip_comments() {
        assert_eq!(
            frontmatter_tags("---\ntags:\n  # topics\n  - algebra\n---\nbody"),
            vec!["algebra"]
        );
        assert_eq!(
            frontmatter_tags("---\ntags:\n  - algebra # core\n  - rings\n---\nbody"),
            vec!["algebra", "rings"]
        );
    }

    #[test]
    fn test_frontmatter_tags_multiline_flow_list() {
        assert_eq!(
            frontmatter_tags("---\ntags: [algebra,\n  rings]\n---\nbody"),
            vec!["algebra", "rings"]
        );
    }

    #[test]
    fn test_frontmatter_tags_non_string_scalars() {
        assert_eq!(
            frontmatter_tags("---\ntags:\n  - 2024\n  - ~\n  - topology\n---\n"),
            vec!["2024", "topology"]
        );
    }

    #[test]
    fn test_frontmatter_tags_malformed_yaml() {
        assert!(frontmatter_tags("---\ntags: [unclosed\n---\nbody").is_empty());
    }

    #[test]
    fn test_frontmatter_tags_absent() {
        assert!(frontmatter_tags("# No frontmatter\n\n---\ntags: x\n---\n").is_empty());
        assert!(frontmatter_tags("---\ntitle: x\n---\nbody").is_empty());
        assert!(frontmatter_tags("").is_empty());
    }
}
