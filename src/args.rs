use crate::editor::SelectionSpec;
use std::error::Error;

pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Extract a string value for a flag
    pub fn extract_value(&mut self, flag: &str) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide a value after {} for {}", flag, self.command_name).into()
        })
    }

    /// Get next positional argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }

    pub fn unknown_flag(&self, flag: &str) -> Box<dyn Error> {
        format!("Unknown flag for {}: {flag}", self.command_name).into()
    }
}

/// Flags shared by the note-creating commands.
#[derive(Default, Debug)]
pub struct CreateFlags {
    pub open: bool,
    pub typed: bool,
    pub type_query: Option<String>,
    pub selection: Option<SelectionSpec>,
    pub positional: Vec<String>,
}

impl CreateFlags {
    pub fn parse(args: Vec<String>, command_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut flags = Self::default();
        let mut parser = ArgParser::new(args, command_name);
        while let Some(arg) = parser.next() {
            match arg.as_str() {
                "--open" | "-o" => flags.open = true,
                "--typed" => flags.typed = true,
                "--type" | "-T" => {
                    flags.type_query = Some(parser.extract_value("--type")?);
                    flags.typed = true;
                }
                "--lines" | "-l" => {
                    let raw = parser.extract_value("--lines")?;
                    flags.selection = Some(SelectionSpec::parse_lines(&raw)?);
                }
                "--text" => {
                    let raw = parser.extract_value("--text")?;
                    flags.selection = Some(SelectionSpec::Text(raw));
                }
                "--" => flags.positional.extend(std::iter::from_fn(|| parser.next())),
                other if other.starts_with('-') && other.len() > 1 => {
                    return Err(parser.unknown_flag(other));
                }
                _ => flags.positional.push(arg),
            }
        }
        Ok(flags)
    }
}

/// Flags for the read-only `list` and `view` commands.
#[derive(Default, Debug)]
pub struct DisplayFlags {
    pub plain: bool,
    pub relative_time: bool,
    pub positional: Vec<String>,
}

impl DisplayFlags {
    pub fn parse(args: Vec<String>, command_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut flags = Self::default();
        let mut parser = ArgParser::new(args, command_name);
        while let Some(arg) = parser.next() {
            match arg.as_str() {
                "--plain" => flags.plain = true,
                "--relative" | "-r" => flags.relative_time = true,
                other if other.starts_with('-') => return Err(parser.unknown_flag(other)),
                _ => flags.positional.push(arg),
            }
        }
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_arg_parser_extract_value() {
        let mut parser = ArgParser::new(args(&["--type", "lemma"]), "test");
        assert_eq!(parser.next().unwrap(), "--type");
        assert_eq!(parser.extract_value("--type").unwrap(), "lemma");
        assert!(parser.extract_value("--type").is_err());
    }

    #[test]
    fn test_create_flags() {
        let flags = CreateFlags::parse(
            args(&["doc.md", "--lines", "2:4", "--type", "thm", "--open"]),
            "extract",
        )
        .unwrap();
        assert_eq!(flags.positional, vec!["doc.md"]);
        assert_eq!(flags.selection, Some(SelectionSpec::Lines { start: 2, end: 4 }));
        assert_eq!(flags.type_query.as_deref(), Some("thm"));
        assert!(flags.typed);
        assert!(flags.open);
    }

    #[test]
    fn test_create_flags_double_dash_and_unknown() {
        let flags = CreateFlags::parse(args(&["--", "-x", "y"]), "new").unwrap();
        assert_eq!(flags.positional, vec!["-x", "y"]);
        assert!(CreateFlags::parse(args(&["--bogus"]), "new").is_err());
    }

    #[test]
    fn test_display_flags() {
        let flags = DisplayFlags::parse(args(&["000A", "--plain", "-r"]), "view").unwrap();
        assert!(flags.plain);
        assert!(flags.relative_time);
        assert_eq!(flags.positional, vec!["000A"]);
    }
}
