//! Lazy markup event source.
//!
//! Wraps a lenient `quick-xml` reader and yields tag, text, and character
//! reference events in document order. The sequence is finite and cannot be
//! restarted. A `<` or `&` that cannot start markup is character data, as in
//! HTML. Remaining syntax errors are logged and skipped; when the reader
//! stops making progress the sequence ends early.

use std::borrow::Cow;
use std::io::Cursor;

use quick_xml::encoding::Decoder;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::attrs::AttributeSet;
use crate::error::{EngineError, ErrorPhase};

const MAX_SYNTAX_ERRORS: usize = 64;

/// Elements whose body is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// One markup event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupEvent {
    /// Opening tag. `self_closing` marks `<tag/>` forms.
    Start {
        name: String,
        attrs: AttributeSet,
        self_closing: bool,
    },
    /// Closing tag.
    End { name: String },
    /// Character data with named entities already resolved.
    Text(String),
    /// Body of a numeric character reference, e.g. `"65"` or `"x41"`.
    CharRef(String),
}

/// Iterator over the events of one markup string.
pub struct MarkupTokens<'a> {
    reader: Reader<Cursor<Cow<'a, [u8]>>>,
    buf: Vec<u8>,
    skip_depth: usize,
    errors: SyntaxErrors,
    finished: bool,
}

#[derive(Default)]
struct SyntaxErrors {
    count: usize,
    last_pos: Option<u64>,
}

impl SyntaxErrors {
    /// Returns `false` once the reader is stuck and iteration must stop.
    fn note(&mut self, err: quick_xml::Error, pos: u64) -> bool {
        let report = EngineError::new(ErrorPhase::Tokenize, "TOKENIZE_SYNTAX_ERROR", err.to_string())
            .with_token_offset(usize::try_from(pos).unwrap_or(usize::MAX));
        self.count += 1;
        let stuck = self.last_pos == Some(pos);
        self.last_pos = Some(pos);
        if stuck || self.count > MAX_SYNTAX_ERRORS {
            log::warn!("dropping remaining markup: {}", report);
            return false;
        }
        log::warn!("skipping malformed markup: {}", report);
        true
    }
}

impl<'a> MarkupTokens<'a> {
    pub fn new(markup: &'a str) -> Self {
        let source = match escape_stray_markup(markup) {
            Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
            Cow::Owned(text) => Cow::Owned(text.into_bytes()),
        };
        let mut reader = Reader::from_reader(Cursor::new(source));
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        Self {
            reader,
            buf: Vec::with_capacity(256),
            skip_depth: 0,
            errors: SyntaxErrors::default(),
            finished: false,
        }
    }
}

fn decode(decoder: Decoder, raw: &[u8]) -> Option<Cow<'_, str>> {
    decoder.decode(raw).ok()
}

fn tag_name(decoder: Decoder, raw: &[u8]) -> Option<String> {
    let decoded = decode(decoder, raw)?;
    let local = decoded.rsplit(':').next().unwrap_or(decoded.as_ref());
    Some(local.to_ascii_lowercase())
}

fn start_event(decoder: Decoder, e: &BytesStart<'_>, self_closing: bool) -> Option<MarkupEvent> {
    let name = tag_name(decoder, e.name().as_ref())?;
    let mut pairs = Vec::with_capacity(4);
    for attr in e.html_attributes().flatten() {
        let Some(key) = decode(decoder, attr.key.as_ref()) else {
            continue;
        };
        let Some(raw) = decode(decoder, &attr.value) else {
            continue;
        };
        let value = unescape_with(&raw, resolve_html5_entity)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw.to_string());
        pairs.push((key.into_owned(), value));
    }
    Some(MarkupEvent::Start {
        name,
        attrs: AttributeSet::from_pairs(pairs),
        self_closing,
    })
}

fn should_skip_tag(name: &str) -> bool {
    matches!(name, "script" | "style" | "head" | "noscript" | "title")
}

impl Iterator for MarkupTokens<'_> {
    type Item = MarkupEvent;

    fn next(&mut self) -> Option<MarkupEvent> {
        let decoder = self.reader.decoder();
        while !self.finished {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(err) => {
                    let pos = self.reader.buffer_position();
                    if !self.errors.note(err, pos) {
                        self.finished = true;
                    }
                    continue;
                }
            };
            match event {
                Event::Start(e) => {
                    let Some(name) = tag_name(decoder, e.name().as_ref()) else {
                        continue;
                    };
                    if should_skip_tag(&name) {
                        self.skip_depth += 1;
                        continue;
                    }
                    if self.skip_depth > 0 {
                        continue;
                    }
                    if let Some(start) = start_event(decoder, &e, false) {
                        return Some(start);
                    }
                }
                Event::Empty(e) => {
                    if self.skip_depth > 0 {
                        continue;
                    }
                    match tag_name(decoder, e.name().as_ref()) {
                        Some(name) if !should_skip_tag(&name) => {}
                        _ => continue,
                    }
                    if let Some(start) = start_event(decoder, &e, true) {
                        return Some(start);
                    }
                }
                Event::End(e) => {
                    let Some(name) = tag_name(decoder, e.name().as_ref()) else {
                        continue;
                    };
                    if should_skip_tag(&name) {
                        self.skip_depth = self.skip_depth.saturating_sub(1);
                        continue;
                    }
                    if self.skip_depth == 0 {
                        return Some(MarkupEvent::End { name });
                    }
                }
                Event::Text(e) => {
                    if self.skip_depth > 0 {
                        continue;
                    }
                    if let Ok(text) = e.decode() {
                        if !text.is_empty() {
                            return Some(MarkupEvent::Text(text.into_owned()));
                        }
                    }
                }
                Event::CData(e) => {
                    if self.skip_depth > 0 {
                        continue;
                    }
                    if let Some(text) = decode(decoder, &e) {
                        return Some(MarkupEvent::Text(text.into_owned()));
                    }
                }
                Event::GeneralRef(e) => {
                    if self.skip_depth > 0 {
                        continue;
                    }
                    let Ok(name) = e.decode() else {
                        continue;
                    };
                    if let Some(body) = name.strip_prefix('#') {
                        return Some(MarkupEvent::CharRef(body.to_string()));
                    }
                    let text = match resolve_html5_entity(&name) {
                        Some(resolved) => resolved.to_string(),
                        None => format!("&{};", name),
                    };
                    return Some(MarkupEvent::Text(text));
                }
                Event::Eof => self.finished = true,
                _ => {}
            }
        }
        None
    }
}

/// Rewrite every `<` and `&` that cannot start markup as a reference.
///
/// Tags, comments, and CDATA sections are copied unchanged. Named
/// references missing their `;` get one when the name is known, and so do
/// numeric ones. `script` and `style` bodies are escaped whole.
fn escape_stray_markup(markup: &str) -> Cow<'_, str> {
    let bytes = markup.as_bytes();
    let mut out = Escaped::new(markup);
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => match markup_end(bytes, i) {
                Some(end) => {
                    i = match raw_text_element(&bytes[i..end]) {
                        Some(name) => out.escape_raw_text(end, name),
                        None => end,
                    };
                }
                None => {
                    out.splice(i, 1, "&lt;");
                    i += 1;
                }
            },
            b'&' => {
                i = match classify_reference(bytes, i) {
                    Reference::Complete(end) => end,
                    Reference::Unterminated(end) => {
                        out.splice(end, 0, ";");
                        end
                    }
                    Reference::Stray => {
                        out.splice(i, 1, "&amp;");
                        i + 1
                    }
                };
            }
            _ => i += 1,
        }
    }
    out.finish()
}

/// Copy-on-write output of [`escape_stray_markup`].
struct Escaped<'a> {
    src: &'a str,
    out: String,
    copied: usize,
    changed: bool,
}

impl<'a> Escaped<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            out: String::new(),
            copied: 0,
            changed: false,
        }
    }

    /// Replace the `len` ASCII bytes at `at` with `with`.
    fn splice(&mut self, at: usize, len: usize, with: &str) {
        if !self.changed {
            self.out.reserve(self.src.len() + 16);
            self.changed = true;
        }
        self.out.push_str(&self.src[self.copied..at]);
        self.out.push_str(with);
        self.copied = at + len;
    }

    /// Escape a raw text body from `from` up to its end tag and return
    /// where that end tag starts.
    fn escape_raw_text(&mut self, from: usize, name: &str) -> usize {
        let bytes = self.src.as_bytes();
        let end = find_end_tag(bytes, from, name).unwrap_or(bytes.len());
        for (offset, &b) in bytes[from..end].iter().enumerate() {
            match b {
                b'<' => self.splice(from + offset, 1, "&lt;"),
                b'&' => self.splice(from + offset, 1, "&amp;"),
                _ => {}
            }
        }
        end
    }

    fn finish(mut self) -> Cow<'a, str> {
        if !self.changed {
            return Cow::Borrowed(self.src);
        }
        self.out.push_str(&self.src[self.copied..]);
        Cow::Owned(self.out)
    }
}

/// End of the tag, comment, or declaration opening at `start`, or `None`
/// when the `<` there is character data.
fn markup_end(bytes: &[u8], start: usize) -> Option<usize> {
    let rest = &bytes[start..];
    if rest.starts_with(b"<!--") {
        return Some(find(bytes, start + 4, b"-->").map_or(bytes.len(), |at| at + 3));
    }
    if rest.starts_with(b"<![CDATA[") {
        return Some(find(bytes, start + 9, b"]]>").map_or(bytes.len(), |at| at + 3));
    }
    let opens_markup = match rest.get(1) {
        Some(b'!' | b'?') => true,
        Some(b'/') => rest.get(2).is_some_and(u8::is_ascii_alphabetic),
        Some(b) => b.is_ascii_alphabetic(),
        None => false,
    };
    if !opens_markup {
        return None;
    }
    let mut quote = None;
    for (offset, &b) in rest.iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(start + offset + 1),
            None => {}
        }
    }
    None
}

/// Name of the raw text element a complete start tag opens.
fn raw_text_element(tag: &[u8]) -> Option<&'static str> {
    if tag.ends_with(b"/>") {
        return None;
    }
    let name_len = tag[1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    let name = &tag[1..1 + name_len];
    RAW_TEXT_ELEMENTS
        .into_iter()
        .find(|raw| name.eq_ignore_ascii_case(raw.as_bytes()))
}

fn find_end_tag(bytes: &[u8], from: usize, name: &str) -> Option<usize> {
    let mut at = from;
    while let Some(pos) = find(bytes, at, b"</") {
        let name_start = pos + 2;
        let name_end = name_start + name.len();
        let matches_name = bytes
            .get(name_start..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()));
        if matches_name && !bytes.get(name_end).is_some_and(u8::is_ascii_alphanumeric) {
            return Some(pos);
        }
        at = name_start;
    }
    None
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|at| from + at)
}

enum Reference {
    /// Well-formed; markup resumes at the index.
    Complete(usize),
    /// Decodable but missing the `;` that belongs at the index.
    Unterminated(usize),
    /// Not a reference; the `&` is text.
    Stray,
}

fn classify_reference(bytes: &[u8], amp: usize) -> Reference {
    let body = &bytes[amp + 1..];
    let (len, named) = match body.first() {
        Some(b'#') => {
            let (prefix, hex) = match body.get(1) {
                Some(b'x' | b'X') => (2, true),
                _ => (1, false),
            };
            let digits = body[prefix..]
                .iter()
                .take_while(|b| if hex { b.is_ascii_hexdigit() } else { b.is_ascii_digit() })
                .count();
            if digits == 0 {
                return Reference::Stray;
            }
            (prefix + digits, false)
        }
        Some(b) if b.is_ascii_alphabetic() => {
            let len = body.iter().take_while(|b| b.is_ascii_alphanumeric()).count();
            (len, true)
        }
        _ => return Reference::Stray,
    };
    let end = amp + 1 + len;
    if bytes.get(end) == Some(&b';') {
        return Reference::Complete(end + 1);
    }
    if !named {
        return Reference::Unterminated(end);
    }
    let known = std::str::from_utf8(&body[..len])
        .ok()
        .and_then(resolve_html5_entity)
        .is_some();
    if known {
        Reference::Unterminated(end)
    } else {
        Reference::Stray
    }
}

/// Decode a numeric character reference body (`"65"`, `"x41"`, `"X41"`).
pub fn decode_char_ref(body: &str) -> Option<char> {
    let code = match body.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
