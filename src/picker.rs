use crate::error::PickerError;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// Chooses one option from a list. `Ok(None)` means the user dismissed it.
pub trait Picker {
    fn pick(&self, options: &[&str]) -> Result<Option<String>, PickerError>;
}

/// Interactive single-choice picker backed by `fzf`.
pub struct FzfPicker {
    prompt: &'static str,
    height: &'static str,
    layout: &'static str,
}

impl FzfPicker {
    /// Picker styled for choosing a note type.
    pub fn for_note_types() -> Self {
        Self { prompt: "Note type> ", height: "40%", layout: "reverse" }
    }
}

impl Picker for FzfPicker {
    fn pick(&self, options: &[&str]) -> Result<Option<String>, PickerError> {
        if !is_fzf_available() {
            return Err(PickerError::Unavailable);
        }

        let mut cmd = Command::new("fzf");
        cmd.arg("--prompt")
            .arg(self.prompt)
            .arg("--height")
            .arg(self.height)
            .arg("--layout")
            .arg(self.layout);

        let mut child = cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(options.join("\n").as_bytes())?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() || output.stdout.is_empty() {
            return Ok(None); // dismissed
        }
        let selected = String::from_utf8_lossy(&output.stdout);
        Ok(selected.lines().next().map(|s| s.trim().to_string()))
    }
}

/// Non-interactive picker that fuzzy-matches a fixed query.
pub struct QueryPicker {
    query: String,
}

impl QueryPicker {
    pub fn new(query: &str) -> Self {
        Self { query: query.trim().to_string() }
    }
}

impl Picker for QueryPicker {
    fn pick(&self, options: &[&str]) -> Result<Option<String>, PickerError> {
        Ok(best_match(&self.query, options).map(str::to_string))
    }
}

/// Best option for `query`: exact (case-insensitive) beats prefix, prefix
/// beats a subsequence match. Among subsequence matches the one starting
/// earliest wins, then the tighter span, then the earlier option.
pub fn best_match<'a>(query: &str, options: &[&'a str]) -> Option<&'a str> {
    if query.is_empty() {
        return None;
    }
    let q = query.to_lowercase();
    options
        .iter()
        .enumerate()
        .filter_map(|(idx, option)| {
            let candidate = option.to_lowercase();
            let rank = if candidate == q {
                0
            } else if candidate.starts_with(&q) {
                1
            } else {
                2
            };
            subsequence_match(&q, &candidate)
                .map(|(start, span)| ((rank, start, span, idx), *option))
        })
        .min_by_key(|(key, _)| *key)
        .map(|(_, option)| option)
}

/// Earliest position where `needle` matches `haystack` as a subsequence,
/// with the length of the greedy match window from there.
fn subsequence_match(needle: &str, haystack: &str) -> Option<(usize, usize)> {
    let hay: Vec<char> = haystack.chars().collect();
    let wanted: Vec<char> = needle.chars().collect();
    let first = *wanted.first()?;
    for start in 0..hay.len() {
        if hay[start] != first {
            continue;
        }
        let mut matched = 0;
        for (offset, ch) in hay[start..].iter().enumerate() {
            if *ch == wanted[matched] {
                matched += 1;
                if matched == wanted.len() {
                    return Some((start, offset + 1));
                }
            }
        }
    }
    None
}

/// Check if fzf is available
pub fn is_fzf_available() -> bool {
    if std::env::var("MATH_ARCHIVIST_NO_FZF").is_ok() {
        return false;
    }

    static FZF_AVAILABLE: OnceLock<bool> = OnceLock::new();
    *FZF_AVAILABLE.get_or_init(|| {
        Command::new("fzf")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    })
}
