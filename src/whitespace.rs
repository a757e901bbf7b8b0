//! Character data normalization outside preformatted regions.

/// HTML inter-element whitespace.
pub fn is_markup_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

/// Whether `text` holds nothing but markup whitespace.
pub fn is_blank(text: &str) -> bool {
    text.chars().all(is_markup_whitespace)
}

/// Normalize one chunk of character data against the output written so far.
///
/// `tail` is the last character already in the output, if any. Whitespace
/// collapses to single spaces. Leading whitespace is dropped at the start of
/// a line or after existing whitespace. A chunk that is entirely whitespace
/// becomes a single separating space after inline content, and nothing
/// otherwise.
pub fn normalize_text(data: &str, tail: Option<char>) -> String {
    let at_boundary = tail.is_none_or(is_markup_whitespace);
    if is_blank(data) {
        return if at_boundary || data.is_empty() {
            String::new()
        } else {
            " ".to_string()
        };
    }
    let mut out = String::with_capacity(data.len());
    let mut prev_space = at_boundary;
    for ch in data.chars() {
        if is_markup_whitespace(ch) {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}
