use yansi::Paint;

/// Minimal styling categories used when coloring markdown output.
#[derive(Clone, Copy)]
enum Style {
    Heading,
    Bullet,
    Rule,
    Code,
    Embed,
}

/// Render a tag note with lightweight styling. When `use_color` is false the
/// original text is returned unchanged so tests can compare it verbatim.
pub fn render_markdown(input: &str, use_color: bool) -> String {
    if !use_color {
        return input.to_string();
    }

    let mut rendered = String::new();
    let mut in_code_block = false;

    for segment in input.split_inclusive('\n') {
        let (line, newline) = match segment.strip_suffix('\n') {
            Some(stripped) => (stripped, "\n"),
            None => (segment, ""),
        };
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") || trimmed.starts_with("$$") {
            rendered.push_str(&paint(line, Style::Code));
            rendered.push_str(newline);
            in_code_block = !in_code_block;
            continue;
        }

        if in_code_block {
            rendered.push_str(&paint(line, Style::Code));
            rendered.push_str(newline);
            continue;
        }

        let styled_line = if trimmed.starts_with('#') {
            paint(line, Style::Heading)
        } else if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
            paint(line, Style::Bullet)
        } else if trimmed == "---" || trimmed == "***" {
            paint(line, Style::Rule)
        } else {
            highlight_inline(line)
        };

        rendered.push_str(&styled_line);
        rendered.push_str(newline);
    }

    rendered
}

/// Color `![[TAG]]` embeds, `**Type TAG.**` headers and `$inline math$`.
pub fn highlight_inline(line: &str) -> String {
    let mut out = String::new();
    let mut rest = line;
    loop {
        let next = [("![[", "]]", Style::Embed), ("**", "**", Style::Heading), ("$", "$", Style::Code)]
            .into_iter()
            .filter_map(|(open, close, style)| rest.find(open).map(|at| (at, open, close, style)))
            .min_by_key(|(at, ..)| *at);
        let Some((at, open, close, style)) = next else { break };
        let after_open = &rest[at + open.len()..];
        let Some(end) = after_open.find(close) else { break };
        out.push_str(&rest[..at]);
        let span = &rest[at..at + open.len() + end + close.len()];
        out.push_str(&paint(span, style));
        rest = &after_open[end + close.len()..];
    }
    out.push_str(rest);
    out
}

fn paint(text: &str, style: Style) -> String {
    match style {
        Style::Heading => Paint::cyan(text).bold().to_string(),
        Style::Bullet => Paint::yellow(text).bold().to_string(),
        Style::Rule => Paint::new(text).dim().to_string(),
        Style::Code => Paint::blue(text).to_string(),
        Style::Embed => Paint::magenta(text).underline().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_render_is_identity() {
        let text = "---\ntags:\n  - math\n---\n**Lemma 0001.** body";
        assert_eq!(render_markdown(text, false), text);
    }

    #[test]
    fn test_color_render_keeps_text() {
        let out = render_markdown("# Title\nsee ![[0001]] and $x$\n", true);
        assert!(out.contains("Title"));
        assert!(out.contains("![[0001]]"));
        assert!(out.len() > "# Title\nsee ![[0001]] and $x$\n".len());
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_highlight_inline_unclosed() {
        assert_eq!(highlight_inline("cost is $5"), "cost is $5");
        assert_eq!(highlight_inline("plain"), "plain");
    }
}
