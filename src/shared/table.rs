//! Text table layout for the `list` command.
//! Widths are measured on visible characters so colored cells still line up.

/// Render rows under a header. Each column is as wide as its widest cell;
/// the last column is truncated so a row fits in `max_width` when given.
pub fn render_table(
    headers: &[String],
    rows: &[Vec<String>],
    max_width: Option<usize>,
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| display_len(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_len(cell));
        }
    }
    let separators = 3 * (cols - 1);
    let fixed: usize = widths[..cols - 1].iter().sum::<usize>() + separators;
    let header_len = display_len(&headers[cols - 1]);
    let last_budget = max_width.map(|w| w.saturating_sub(fixed).max(header_len));
    if let Some(budget) = last_budget {
        widths[cols - 1] = widths[cols - 1].min(budget);
    }

    let mut out = String::new();
    out.push_str(&format_row(headers, &widths, last_budget));
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + separators));
    for row in rows {
        out.push('\n');
        out.push_str(&format_row(row, &widths, last_budget));
    }
    out
}

fn format_row(row: &[String], widths: &[usize], last_budget: Option<usize>) -> String {
    let last = widths.len().saturating_sub(1);
    let mut parts: Vec<String> = Vec::new();
    for (i, (cell, width)) in row.iter().zip(widths.iter()).enumerate() {
        if i == last {
            // Trailing column is never padded.
            match last_budget {
                Some(budget) if display_len(cell) > budget => {
                    parts.push(truncate_with_ellipsis(&strip_ansi(cell), budget))
                }
                _ => parts.push(cell.clone()),
            }
        } else {
            parts.push(pad_field(cell, *width, display_len(cell)));
        }
    }
    parts.join(" | ")
}

/// Right-pad a field based on visible length (ignoring ANSI codes).
pub fn pad_field(display: &str, target: usize, plain_len: usize) -> String {
    let mut out = display.to_string();
    out.push_str(&" ".repeat(target.saturating_sub(plain_len)));
    out
}

/// Truncate text to a width, appending an ellipsis when needed.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width - 1).collect();
    out.push('…');
    out
}

/// Compute visible length of a string, ignoring ANSI escape sequences.
pub fn display_len(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let out = render_table(
            &s(&["Tag", "Type", "Preview"]),
            &[s(&["0001", "Lemma", "short"]), s(&["0002", "", "longer text"])],
            None,
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Tag  | Type  | Preview");
        assert_eq!(lines[2], "0001 | Lemma | short");
        assert_eq!(lines[3], "0002 |       | longer text");
    }

    #[test]
    fn test_render_table_truncates_last_column() {
        let out = render_table(
            &s(&["Tag", "Preview"]),
            &[s(&["0001", "abcdefghijklmnop"])],
            Some(15),
        );
        let row = out.lines().nth(2).unwrap();
        assert_eq!(row, "0001 | abcdefg…");
        assert!(display_len(row) <= 15);
    }

    #[test]
    fn test_render_table_colored_header_keeps_width_budget() {
        let headers = vec!["Tag".to_string(), "\x1b[1;36mPreview\x1b[0m".to_string()];
        let out = render_table(&headers, &[s(&["0001", "abcdefghijklmnop"])], Some(14));
        let row = out.lines().nth(2).unwrap();
        assert_eq!(row, "0001 | abcdef…");
        for line in out.lines() {
            assert!(display_len(line) <= 14, "{line:?} is too wide");
        }
    }

    #[test]
    fn test_display_len_ignores_ansi() {
        assert_eq!(display_len("\x1b[1;36mabc\x1b[0m"), 3);
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("abc", 5), "abc");
        assert_eq!(truncate_with_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_with_ellipsis("abc", 0), "");
    }
}
