//! Recognized tag vocabulary and its classification tables.

/// A tag the engine gives meaning to. Anything else is tracked by name only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `h1` .. `h6`.
    Heading(u8),
    Br,
    Ul,
    Ol,
    Li,
    Img,
    A,
    B,
    Strong,
    I,
    Em,
    U,
    Mark,
    Span,
    Div,
    P,
    Pre,
    Code,
    Table,
    Tr,
    Th,
    Td,
}

impl Tag {
    /// Parse a lower-cased tag name.
    pub fn parse(name: &str) -> Option<Self> {
        let tag = match name {
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "br" => Self::Br,
            "ul" => Self::Ul,
            "ol" => Self::Ol,
            "li" => Self::Li,
            "img" => Self::Img,
            "a" => Self::A,
            "b" => Self::B,
            "strong" => Self::Strong,
            "i" => Self::I,
            "em" => Self::Em,
            "u" => Self::U,
            "mark" => Self::Mark,
            "span" => Self::Span,
            "div" => Self::Div,
            "p" => Self::P,
            "pre" => Self::Pre,
            "code" => Self::Code,
            "table" => Self::Table,
            "tr" => Self::Tr,
            "th" => Self::Th,
            "td" => Self::Td,
            _ => return None,
        };
        Some(tag)
    }

    /// Canonical lower-case name; also the owner key on property stacks.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heading(1) => "h1",
            Self::Heading(2) => "h2",
            Self::Heading(3) => "h3",
            Self::Heading(4) => "h4",
            Self::Heading(5) => "h5",
            Self::Heading(_) => "h6",
            Self::Br => "br",
            Self::Ul => "ul",
            Self::Ol => "ol",
            Self::Li => "li",
            Self::Img => "img",
            Self::A => "a",
            Self::B => "b",
            Self::Strong => "strong",
            Self::I => "i",
            Self::Em => "em",
            Self::U => "u",
            Self::Mark => "mark",
            Self::Span => "span",
            Self::Div => "div",
            Self::P => "p",
            Self::Pre => "pre",
            Self::Code => "code",
            Self::Table => "table",
            Self::Tr => "tr",
            Self::Th => "th",
            Self::Td => "td",
        }
    }

    /// Heading level for `h1`..`h6`.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Self::Heading(level) => Some(level),
            _ => None,
        }
    }

    /// Tags whose open/close pushes and pops the inheritable style properties.
    pub fn is_styled(self) -> bool {
        !matches!(self, Self::Br | Self::Img | Self::Table | Self::Tr)
    }

    /// Tags that honour a `text-align` declaration.
    pub fn accepts_text_align(self) -> bool {
        matches!(
            self,
            Self::Heading(_)
                | Self::Ul
                | Self::Ol
                | Self::Li
                | Self::Div
                | Self::P
                | Self::Pre
                | Self::Code
                | Self::Td
                | Self::Th
        )
    }

    /// Block-level tags that force line breaks around their content.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Self::Heading(_)
                | Self::Ul
                | Self::Ol
                | Self::Div
                | Self::P
                | Self::Pre
                | Self::Table
                | Self::Tr
        )
    }

    /// Tags rendered in bold.
    pub fn is_bold(self) -> bool {
        matches!(self, Self::B | Self::Strong | Self::Heading(_))
    }

    /// Tags rendered in italics.
    pub fn is_italic(self) -> bool {
        matches!(self, Self::I | Self::Em)
    }

    /// Tags whose content uses the monospace family by default.
    pub fn is_monospace(self) -> bool {
        matches!(self, Self::Pre | Self::Code)
    }
}

/// Elements that never have content or an end tag.
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "br" | "img" | "hr" | "input" | "meta" | "link" | "wbr" | "col" | "area" | "base"
            | "source" | "embed" | "param" | "track"
    )
}
