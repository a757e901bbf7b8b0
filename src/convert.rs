//! HTML subset to styled text runs.
//!
//! [`HtmlConverter`] drives a [`MarkupTokens`] event source through a
//! per-call [`Session`] that owns the style stacks, the list stack, the
//! open-tag trail, and the output buffer. Every tag event ends with a style
//! snapshot; once input is exhausted the snapshots are reconciled into runs.

use crate::attrs::AttributeSet;
use crate::document::{Document, ImagePlacement};
use crate::host::{first_available_family, split_family_list, HostSurface};
use crate::lists::{table_tab_stops, ListKind, ListStack};
use crate::options::{ConvertOptions, ImageOptions};
use crate::resource::ImageResolver;
use crate::runs::RunEmitter;
use crate::style::{FontSlant, FontWeight, StyleDefaults, StyleStack};
use crate::tag::{is_void_element, Tag};
use crate::tokenizer::{decode_char_ref, MarkupEvent, MarkupTokens};
use crate::whitespace::{is_blank, normalize_text};

/// Conversion engine.
///
/// Holds the options and the image resolver, whose cache outlives single
/// conversions. Each call to [`HtmlConverter::convert`] starts from fresh
/// style and list state.
#[derive(Debug)]
pub struct HtmlConverter {
    options: ConvertOptions,
    resolver: ImageResolver,
}

impl Default for HtmlConverter {
    fn default() -> Self {
        Self::with_options(ConvertOptions::default())
    }
}

impl HtmlConverter {
    pub fn new(options: ConvertOptions, resolver: ImageResolver) -> Self {
        Self { options, resolver }
    }

    /// Engine with the default image fetcher.
    pub fn with_options(options: ConvertOptions) -> Self {
        let resolver = ImageResolver::with_default_fetcher(&ImageOptions::default());
        Self::new(options, resolver)
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut ImageResolver {
        &mut self.resolver
    }

    /// Convert `html` for display on `host`.
    ///
    /// Never fails: malformed markup and unreachable images degrade the
    /// output instead.
    pub fn convert(&mut self, html: &str, host: &dyn HostSurface) -> Document {
        let mut session = Session::new(&self.options, &mut self.resolver, host);
        for event in MarkupTokens::new(html) {
            session.handle(event);
        }
        session.finish()
    }
}

/// Parser state for one conversion.
struct Session<'c> {
    opts: &'c ConvertOptions,
    resolver: &'c mut ImageResolver,
    host: &'c dyn HostSurface,
    text_family: String,
    mono_family: String,
    styles: StyleStack,
    lists: ListStack,
    open_tags: Vec<String>,
    out: RunEmitter,
    /// Output up to this offset was copied verbatim and is never trimmed.
    verbatim_end: usize,
    images: Vec<ImagePlacement>,
}

impl<'c> Session<'c> {
    fn new(
        opts: &'c ConvertOptions,
        resolver: &'c mut ImageResolver,
        host: &'c dyn HostSurface,
    ) -> Self {
        let fonts = &opts.fonts;
        let text_family = first_available_family(host, &fonts.text_families, &fonts.text_fallback);
        let mono_family = first_available_family(
            host,
            &fonts.monospace_families,
            &fonts.monospace_fallback,
        );
        let styles = StyleStack::new(StyleDefaults {
            foreground: opts.palette.foreground.clone(),
            background: host.background(),
            family: text_family.clone(),
            size: fonts.base_size,
        });
        let mut out = RunEmitter::new();
        out.record(styles.snapshot());
        Self {
            opts,
            resolver,
            host,
            text_family,
            mono_family,
            styles,
            lists: ListStack::new(),
            open_tags: Vec::new(),
            out,
            verbatim_end: 0,
            images: Vec::new(),
        }
    }

    fn strip(&self) -> bool {
        self.opts.strip_whitespace
    }

    /// Text is copied as is: whitespace is kept, or a `pre` is open.
    fn verbatim(&self) -> bool {
        !self.strip() || self.open_tags.iter().any(|open| open == "pre")
    }

    fn handle(&mut self, event: MarkupEvent) {
        match event {
            MarkupEvent::Start {
                name,
                attrs,
                self_closing,
            } => {
                self.start_tag(&name, &attrs);
                if self_closing && !is_void_element(&name) {
                    self.end_tag(&name);
                }
            }
            MarkupEvent::End { name } => self.end_tag(&name),
            MarkupEvent::Text(data) => self.text(&data),
            MarkupEvent::CharRef(body) => {
                if let Some(ch) = decode_char_ref(&body) {
                    self.out.push_char(ch);
                    if self.verbatim() {
                        self.verbatim_end = self.out.offset();
                    }
                }
            }
        }
    }

    fn start_tag(&mut self, name: &str, attrs: &AttributeSet) {
        let tag = Tag::parse(name);
        match tag {
            Some(tag) if tag.is_styled() => self.open_styled(tag, attrs),
            Some(Tag::Img) => self.place_image(attrs),
            Some(Tag::Table) => {
                let stops = table_tab_stops(&self.opts.tabs);
                self.styles.tabs.push(Tag::Table.as_str(), Some(stops));
            }
            Some(_) => {}
            None => log::debug!("unsupported tag <{}> carries no style", name),
        }

        if tag == Some(Tag::Br) {
            self.insert_newline(false);
        } else if !is_void_element(name) {
            self.open_tags.push(name.to_string());
        }

        if let Some(tag) = tag.filter(|tag| tag.is_block()) {
            if self.strip() && !self.out.is_empty() {
                let double = match tag {
                    Tag::Div => false,
                    Tag::Ul | Tag::Ol => self.lists.depth() == 1,
                    _ => true,
                };
                self.insert_newline(double);
            }
        }
        self.out.record(self.styles.snapshot());
    }

    fn open_styled(&mut self, tag: Tag, attrs: &AttributeSet) {
        self.push_inherited(tag, attrs);
        let owner = tag.as_str();
        match tag {
            _ if tag.is_bold() => self.styles.weight.push(owner, Some(FontWeight::Bold)),
            _ if tag.is_italic() => self.styles.slant.push(owner, Some(FontSlant::Italic)),
            Tag::A => {
                let target = attrs.link_target().map(|href| Some(href.to_string()));
                self.styles.link.push(owner, target);
            }
            Tag::Ul | Tag::Ol => {
                let kind = if tag == Tag::Ol {
                    ListKind::Ordered(attrs.list_type().unwrap_or_default())
                } else {
                    ListKind::Unordered
                };
                let ladder = self.lists.open(kind, &self.opts.tabs);
                self.styles.tabs.push(owner, Some(ladder));
            }
            Tag::Li => self.open_list_item(),
            Tag::Th | Tag::Td => {
                self.trim_last(|ch| ch == ' ');
                self.out.push_char('\t');
            }
            _ => {}
        }
    }

    /// Push one entry on every inherited property stack for `tag`.
    fn push_inherited(&mut self, tag: Tag, attrs: &AttributeSet) {
        let owner = tag.as_str();
        let palette = &self.opts.palette;
        let fonts = &self.opts.fonts;
        let links_here = tag == Tag::A && attrs.link_target().is_some();

        let foreground = match attrs.style("color") {
            Some(color) => Some(color.to_string()),
            None if links_here => Some(palette.link.clone()),
            None => None,
        };
        self.styles.foreground.push(owner, foreground);

        let background = match attrs.style("background-color") {
            Some(color) => Some(color.to_string()),
            None if tag == Tag::Mark => Some(palette.highlight.clone()),
            None => None,
        };
        self.styles.background.push(owner, background);

        let family = match attrs.style("font-family") {
            Some(list) => Some(first_available_family(
                self.host,
                &split_family_list(list),
                &self.text_family,
            )),
            None if tag.is_monospace() => Some(self.mono_family.clone()),
            None => None,
        };
        self.styles.family.push(owner, family);

        let size = match attrs.style("font-size") {
            Some(value) => Some(font_size(value, fonts.base_size)),
            None => tag.heading_level().map(|level| fonts.heading_size(level)),
        };
        self.styles.size.push(owner, size);

        let justify = attrs
            .style("text-align")
            .filter(|_| tag.accepts_text_align())
            .map(str::to_string);
        self.styles.justify.push(owner, justify);

        let (underline, overstrike) = text_decoration(tag, attrs);
        self.styles.underline.push(owner, underline);
        self.styles.overstrike.push(owner, overstrike);
    }

    fn open_list_item(&mut self) {
        if self.lists.is_empty() {
            return;
        }
        if self.strip() {
            self.insert_newline(false);
        }
        let Some(line) = self.lists.next_item() else {
            return;
        };
        // Markers are never decorated, whatever the surrounding text uses.
        let owner = Tag::Li.as_str();
        self.styles.underline.push(owner, Some(false));
        self.styles.overstrike.push(owner, Some(false));
        self.out.record(self.styles.snapshot());
        self.out.push_str(&line);
        self.styles.underline.pop(owner);
        self.styles.overstrike.pop(owner);
    }

    fn place_image(&mut self, attrs: &AttributeSet) {
        let Some(src) = attrs.src().filter(|src| !src.is_empty()) else {
            return;
        };
        let Some(image) = self.resolver.resolve_sized(src, attrs.width(), attrs.height()) else {
            return;
        };
        self.images.push(ImagePlacement {
            offset: self.out.offset(),
            reference: src.to_string(),
            image,
        });
    }

    fn end_tag(&mut self, name: &str) {
        if let Some(idx) = self.open_tags.iter().rposition(|open| open == name) {
            self.open_tags.remove(idx);
        }

        let tag = Tag::parse(name);
        match tag {
            Some(tag) if tag.is_styled() => self.close_styled(tag),
            Some(Tag::Table) => {
                self.styles.tabs.pop(Tag::Table.as_str());
            }
            _ => {}
        }

        let block = tag.filter(|tag| tag.is_block() && self.strip());
        if block.is_some() {
            self.insert_newline(false);
        }
        self.out.record(self.styles.snapshot());
        if let Some(tag) = block {
            match tag {
                Tag::Div | Tag::Ul | Tag::Ol => {
                    if self.lists.is_empty() {
                        self.insert_newline(true);
                    }
                }
                _ => self.insert_newline(true),
            }
        }
    }

    fn close_styled(&mut self, tag: Tag) {
        let owner = tag.as_str();
        let styles = &mut self.styles;
        styles.foreground.pop(owner);
        styles.background.pop(owner);
        styles.justify.pop(owner);
        styles.family.pop(owner);
        styles.size.pop(owner);
        styles.underline.pop(owner);
        styles.overstrike.pop(owner);
        match tag {
            _ if tag.is_bold() => {
                styles.weight.pop(owner);
            }
            _ if tag.is_italic() => {
                styles.slant.pop(owner);
            }
            Tag::A => {
                styles.link.pop(owner);
            }
            Tag::Ul | Tag::Ol => {
                self.lists.close();
                styles.tabs.pop(owner);
            }
            _ => {}
        }
    }

    fn text(&mut self, data: &str) {
        if self.verbatim() {
            self.out.push_str(data);
            self.verbatim_end = self.out.offset();
            return;
        }
        let normalized = normalize_text(data, self.out.last_char());
        if normalized.is_empty() {
            return;
        }
        let after_list_open = matches!(
            self.open_tags.last().map(String::as_str),
            Some("ul" | "ol")
        );
        if after_list_open && !is_blank(&normalized) {
            let indent = "\t".repeat(2 * self.lists.depth());
            self.out.push_str(&indent);
        }
        self.out.push_str(&normalized);
    }

    /// Start a new line, or a blank line when `double`, unless the output
    /// already ends that way. One trailing space is dropped first.
    fn insert_newline(&mut self, double: bool) {
        self.trim_last(|ch| ch == ' ');
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        if self.out.ends_with("\n") {
            if double {
                self.out.push_char('\n');
            }
        } else if double {
            self.out.push_str("\n\n");
        } else {
            self.out.push_char('\n');
        }
    }

    /// Delete the last character if `pred` accepts it and it was not
    /// copied verbatim.
    fn trim_last(&mut self, pred: impl Fn(char) -> bool) -> bool {
        self.out.offset() > self.verbatim_end && self.out.pop_char_if(pred).is_some()
    }

    fn finish(mut self) -> Document {
        if self.strip() {
            for _ in 0..self.opts.trailing_trim_checks {
                self.trim_last(|ch| ch == ' ' || ch == '\n');
            }
        }
        let (text, runs, links) = self.out.finish();
        Document::new(text, runs, self.images, links)
    }
}

/// Resolve a `font-size` declaration against the base size.
///
/// `Npx` is taken as is; `N%` scales the base size, truncating. Anything
/// else falls back to the base size.
fn font_size(value: &str, base: u16) -> u16 {
    let digits = |body: &str| !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit());
    if let Some(px) = value.strip_suffix("px").filter(|body| digits(body)) {
        return px.parse().unwrap_or(base);
    }
    if let Some(pct) = value.strip_suffix('%').filter(|body| digits(body)) {
        return pct
            .parse::<u32>()
            .ok()
            .and_then(|pct| u16::try_from(pct.saturating_mul(u32::from(base)) / 100).ok())
            .unwrap_or(base);
    }
    base
}

/// Underline and overstrike overrides for `tag`. `None` inherits.
fn text_decoration(tag: Tag, attrs: &AttributeSet) -> (Option<bool>, Option<bool>) {
    match attrs.style("text-decoration") {
        Some(_) if tag == Tag::Strong => (Some(false), Some(false)),
        Some(value) if value.contains("underline") => (Some(true), Some(false)),
        Some(value) if value.contains("line-through") => (Some(false), Some(true)),
        Some(_) => (None, None),
        None if tag == Tag::U || (tag == Tag::A && attrs.link_target().is_some()) => {
            (Some(true), Some(false))
        }
        None => (None, None),
    }
}
