//! Converted document: character stream, style runs, images, and links.

use std::collections::BTreeMap;
use std::sync::Arc;

use image::DynamicImage;

use crate::style::TextStyle;

/// Contiguous character range `[start, end)` sharing one resolved style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    /// First character offset.
    pub start: usize,
    /// One past the last character offset.
    pub end: usize,
    /// Resolved style attributes.
    pub style: TextStyle,
    /// Hyperlink target, when the run sits inside an anchor with an `href`.
    pub link: Option<String>,
}

impl Run {
    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside this run.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Decoded image and the character offset where the host inserts it.
#[derive(Clone, Debug)]
pub struct ImagePlacement {
    /// Character offset of the insertion point.
    pub offset: usize,
    /// `src` reference as written in the markup.
    pub reference: String,
    /// Decoded pixels, shared with the resolver cache unless resized.
    pub image: Arc<DynamicImage>,
}

impl ImagePlacement {
    /// Display width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Display height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Final conversion artifact. Built once, read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Document {
    text: String,
    char_len: usize,
    runs: Vec<Run>,
    images: Vec<ImagePlacement>,
    links: BTreeMap<usize, String>,
}

impl Document {
    pub(crate) fn new(
        text: String,
        runs: Vec<Run>,
        images: Vec<ImagePlacement>,
        links: BTreeMap<usize, String>,
    ) -> Self {
        let char_len = text.chars().count();
        Self {
            text,
            char_len,
            runs,
            images,
            links,
        }
    }

    /// Flattened character stream.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the character stream in characters.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Style runs in stream order. They partition `[0, char_len)`.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Images in document order.
    pub fn images(&self) -> &[ImagePlacement] {
        &self.images
    }

    /// Link table: run index to target.
    pub fn links(&self) -> &BTreeMap<usize, String> {
        &self.links
    }

    /// Link target of the run at `run_index`.
    pub fn link_for_run(&self, run_index: usize) -> Option<&str> {
        self.links.get(&run_index).map(String::as_str)
    }

    /// Run covering character `offset`, with its index.
    pub fn run_at(&self, offset: usize) -> Option<(usize, &Run)> {
        let idx = self.runs.partition_point(|run| run.end <= offset);
        self.runs
            .get(idx)
            .filter(|run| run.contains(offset))
            .map(|run| (idx, run))
    }

    /// Link target under character `offset`.
    pub fn link_at(&self, offset: usize) -> Option<&str> {
        let (idx, _) = self.run_at(offset)?;
        self.link_for_run(idx)
    }

    /// Text covered by `run`.
    pub fn run_text(&self, run: &Run) -> &str {
        self.slice_chars(run.start, run.end)
    }

    /// Substring between two character offsets, clamped to the stream.
    pub fn slice_chars(&self, start: usize, end: usize) -> &str {
        let start_byte = self.byte_offset(start);
        let end_byte = self.byte_offset(end.max(start));
        &self.text[start_byte..end_byte]
    }

    /// Runs with adjacent identical styles and links merged.
    pub fn coalesced_runs(&self) -> Vec<Run> {
        let mut out: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in &self.runs {
            match out.last_mut() {
                Some(prev)
                    if prev.end == run.start && prev.style == run.style && prev.link == run.link =>
                {
                    prev.end = run.end;
                }
                _ => out.push(run.clone()),
            }
        }
        out
    }

    fn byte_offset(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }
}
