use chrono::{DateTime, Local};
use yansi::Paint;

/// Color palette for consistent theming
pub struct ColorPalette {
    pub primary: (u8, u8, u8),   // tags, muted text
    pub secondary: (u8, u8, u8), // headers
    pub timestamp: (u8, u8, u8),
}

impl ColorPalette {
    pub const CATPPUCCIN: Self = Self {
        primary: (108, 112, 134),   // Gray
        secondary: (148, 226, 213), // Teal
        timestamp: (137, 180, 250), // Blue
    };
}

/// Formatting context passed through rendering pipeline
pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, palette: ColorPalette::CATPPUCCIN }
    }

    pub fn from_env(plain: bool) -> Self {
        Self::new(!plain && std::env::var("NO_COLOR").is_err())
    }

    pub fn format_tag(&self, tag: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.primary;
            Paint::rgb(tag, r, g, b).bold().to_string()
        } else {
            tag.to_string()
        }
    }

    pub fn format_header(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.secondary;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_timestamp(&self, ts: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.timestamp;
            Paint::rgb(ts, r, g, b).to_string()
        } else {
            ts.to_string()
        }
    }

    /// Note types get a stable color derived from their name.
    pub fn format_note_type(&self, name: &str) -> String {
        if self.use_color && !name.is_empty() {
            let (r, g, b) = color_for_name(name);
            Paint::rgb(name, r, g, b).to_string()
        } else {
            name.to_string()
        }
    }
}

/// djb2-style hash for deterministic color selection
pub fn hash_name(name: &str) -> u64 {
    let mut h: u64 = 5381;
    for b in name.bytes() {
        h = (h.wrapping_shl(5)).wrapping_add(h) ^ u64::from(b);
    }
    h
}

pub fn color_for_name(name: &str) -> (u8, u8, u8) {
    const PALETTE: &[(u8, u8, u8)] = &[
        (137, 180, 250),
        (166, 227, 161),
        (249, 226, 175),
        (245, 194, 231),
        (255, 169, 167),
        (148, 226, 213),
        (198, 160, 246),
        (240, 198, 198),
        (181, 232, 224),
        (255, 214, 165),
    ];
    PALETTE[(hash_name(name) as usize) % PALETTE.len()]
}

/// Timestamp formatting with relative/absolute modes
pub struct TimeFormatter {
    relative_mode: bool,
    now: DateTime<Local>,
}

impl TimeFormatter {
    pub fn new(relative_mode: bool, now: DateTime<Local>) -> Self {
        Self { relative_mode, now }
    }

    pub fn format(&self, dt: DateTime<Local>) -> String {
        if self.relative_mode {
            self.format_relative(dt)
        } else {
            dt.format("%d%b%y %H:%M").to_string()
        }
    }

    pub fn format_relative(&self, dt: DateTime<Local>) -> String {
        let dur = self.now.signed_duration_since(dt);
        let total_minutes = dur.num_minutes().max(0);
        let total_hours = dur.num_hours().max(0);
        let total_days = dur.num_days().max(0);

        if total_hours == 0 {
            format!("{}m ago", total_minutes)
        } else if total_days == 0 {
            format!("{}h ago", total_hours)
        } else if total_days < 30 {
            format!("{}d ago", total_days)
        } else if total_days < 365 {
            format!("{}mo ago", total_days / 30)
        } else {
            format!("{}y ago", total_days / 365)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_context_no_color() {
        let ctx = FormatContext::new(false);
        assert_eq!(ctx.format_tag("000A"), "000A");
        assert_eq!(ctx.format_header("Tag"), "Tag");
        assert_eq!(ctx.format_note_type("Lemma"), "Lemma");
    }

    #[test]
    fn test_format_context_with_color() {
        let ctx = FormatContext::new(true);
        let tag = ctx.format_tag("000A");
        assert!(tag.contains("000A"));
        assert!(tag.len() > "000A".len());
        assert_eq!(ctx.format_note_type(""), "");
    }

    #[test]
    fn test_color_for_name_consistent() {
        assert_eq!(color_for_name("Theorem"), color_for_name("Theorem"));
        assert_ne!(hash_name("Theorem"), hash_name("Lemma"));
    }

    #[test]
    fn test_time_formatter_relative() {
        let now = Local::now();
        let formatter = TimeFormatter::new(true, now);
        assert_eq!(formatter.format(now - Duration::minutes(5)), "5m ago");
        assert_eq!(formatter.format(now - Duration::hours(3)), "3h ago");
        assert_eq!(formatter.format(now - Duration::days(2)), "2d ago");
        assert_eq!(formatter.format(now - Duration::days(65)), "2mo ago");
        assert_eq!(formatter.format(now - Duration::days(800)), "2y ago");
    }

    #[test]
    fn test_time_formatter_absolute() {
        let now = Local::now();
        let formatter = TimeFormatter::new(false, now);
        assert_eq!(formatter.format(now), now.format("%d%b%y %H:%M").to_string());
    }
}
