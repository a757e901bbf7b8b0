//! Conversion options.

use std::time::Duration;

/// Font defaults used to seed and override the font property stacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontDefaults {
    /// Base font size for body text, in points.
    pub base_size: u16,
    /// Fixed font size per heading level, `h1` first.
    pub heading_sizes: [u16; 6],
    /// Preferred body text families, probed against the host in order.
    pub text_families: Vec<String>,
    /// Body family used when none of `text_families` exists on the host.
    pub text_fallback: String,
    /// Preferred families for `pre`/`code` content.
    pub monospace_families: Vec<String>,
    /// Monospace family used when none of `monospace_families` exists.
    pub monospace_fallback: String,
}

impl Default for FontDefaults {
    fn default() -> Self {
        Self {
            base_size: 14,
            heading_sizes: [32, 24, 18, 16, 13, 10],
            text_families: vec![
                "Segoe UI".to_string(),
                "Calibri".to_string(),
                "Helvetica".to_string(),
            ],
            text_fallback: "sans-serif".to_string(),
            monospace_families: vec!["Courier".to_string(), "DejaVu Sans Mono".to_string()],
            monospace_fallback: "monospace".to_string(),
        }
    }
}

impl FontDefaults {
    /// Fixed size for heading level `1..=6`.
    pub fn heading_size(&self, level: u8) -> u16 {
        let idx = usize::from(level.clamp(1, 6)) - 1;
        self.heading_sizes[idx]
    }
}

/// Colors applied by tags that carry an implicit color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Document foreground color.
    pub foreground: String,
    /// Foreground for anchors with an `href`.
    pub link: String,
    /// Background for `mark`.
    pub highlight: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: "black".to_string(),
            link: "blue".to_string(),
            highlight: "yellow".to_string(),
        }
    }
}

/// Fixed tab-stop geometry used to fake list indentation and table columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TabLayout {
    /// Horizontal distance between list nesting levels.
    pub list_indent_step: u32,
    /// Gap between a right-aligned list marker and its item text.
    pub list_marker_gap: u32,
    /// Width of one table column.
    pub table_column_width: u32,
    /// Number of table column stops generated per table.
    pub table_columns: u32,
}

impl Default for TabLayout {
    fn default() -> Self {
        Self {
            list_indent_step: 30,
            list_marker_gap: 5,
            table_column_width: 40,
            table_columns: 30,
        }
    }
}

/// Options for the built-in HTTP image fetcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageOptions {
    /// Per-request timeout.
    pub fetch_timeout: Duration,
    /// Maximum accepted payload size for a single image.
    pub max_image_bytes: u64,
    /// `User-Agent` header sent with image requests.
    pub user_agent: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            max_image_bytes: 16 * 1024 * 1024,
            user_agent: concat!("html-runs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Conversion engine options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Collapse markup whitespace and insert block line breaks.
    ///
    /// When disabled, character data is copied verbatim and only explicit
    /// `br` tags, list markers, and table cell tabs add characters.
    pub strip_whitespace: bool,
    /// Font defaults.
    pub fonts: FontDefaults,
    /// Implicit tag colors.
    pub palette: Palette,
    /// Tab-stop geometry.
    pub tabs: TabLayout,
    /// Number of trailing characters checked for trimming at document end.
    pub trailing_trim_checks: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            strip_whitespace: true,
            fonts: FontDefaults::default(),
            palette: Palette::default(),
            tabs: TabLayout::default(),
            trailing_trim_checks: 3,
        }
    }
}

impl ConvertOptions {
    /// Options that keep markup whitespace untouched.
    pub fn preserve_whitespace() -> Self {
        Self {
            strip_whitespace: false,
            ..Self::default()
        }
    }
}
