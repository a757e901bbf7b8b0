//! Tag attribute normalization.
//!
//! Raw `(name, value)` pairs are folded into an [`AttributeSet`] once per tag
//! occurrence. Normalization never fails: unknown attributes are ignored and
//! malformed inline style declarations are dropped.

use std::collections::BTreeMap;

/// Numbering scheme requested by an ordered list `type` attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListNumbering {
    /// `1, 2, 3, ...`
    #[default]
    Numeric,
    /// `a, b, ..., z, aa, ...`
    LowerAlpha,
    /// `A, B, ..., Z, AA, ...`
    UpperAlpha,
}

impl ListNumbering {
    /// Parse a `type` attribute value. Matching is case-sensitive.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim() {
            "1" => Some(Self::Numeric),
            "a" => Some(Self::LowerAlpha),
            "A" => Some(Self::UpperAlpha),
            _ => None,
        }
    }
}

/// Typed view of one tag's attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSet {
    style: BTreeMap<String, String>,
    href: Option<String>,
    src: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    list_type: Option<ListNumbering>,
}

impl AttributeSet {
    /// Normalize raw attribute pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut out = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref().trim().to_ascii_lowercase();
            let value = value.as_ref();
            match key.as_str() {
                "style" => out.style.extend(parse_inline_style(value)),
                "href" => out.href = Some(value.to_string()),
                "src" => out.src = Some(value.to_string()),
                "width" => out.width = parse_dimension(value),
                "height" => out.height = parse_dimension(value),
                "type" => out.list_type = ListNumbering::from_attr(value),
                _ => {}
            }
        }
        out
    }

    /// Inline style declarations, keyed by lower-cased property name.
    pub fn styles(&self) -> &BTreeMap<String, String> {
        &self.style
    }

    /// Value of one inline style declaration.
    pub fn style(&self, name: &str) -> Option<&str> {
        self.style.get(name).map(String::as_str)
    }

    /// `href` attribute, if present.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// `href` attribute when present and non-empty.
    pub fn link_target(&self) -> Option<&str> {
        self.href.as_deref().filter(|href| !href.is_empty())
    }

    /// `src` attribute, if present.
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// `width` attribute when it is a plain non-negative integer.
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// `height` attribute when it is a plain non-negative integer.
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Ordered list numbering, if a recognized `type` was given.
    pub fn list_type(&self) -> Option<ListNumbering> {
        self.list_type
    }
}

/// Split an inline `style` attribute into lower-cased declarations.
///
/// Declarations without a `:` or with an empty name are dropped.
pub fn parse_inline_style(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim().to_ascii_lowercase()))
        })
        .collect()
}

fn parse_dimension(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
