//! Queries the engine makes against the host text surface.

/// Read-only facts about the widget that will display the document.
pub trait HostSurface {
    /// Current background color; seeds the background stack.
    fn background(&self) -> String;

    /// Whether a font family is installed. Matching is case-insensitive.
    fn has_font_family(&self, family: &str) -> bool;
}

/// In-memory host description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticHost {
    background: String,
    families: Vec<String>,
}

impl Default for StaticHost {
    fn default() -> Self {
        Self {
            background: "white".to_string(),
            families: Vec::new(),
        }
    }
}

impl StaticHost {
    pub fn new(background: impl Into<String>) -> Self {
        Self {
            background: background.into(),
            families: Vec::new(),
        }
    }

    /// Declare installed font families.
    pub fn with_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.families
            .extend(families.into_iter().map(|family| family.into().to_ascii_lowercase()));
        self
    }
}

impl HostSurface for StaticHost {
    fn background(&self) -> String {
        self.background.clone()
    }

    fn has_font_family(&self, family: &str) -> bool {
        let family = family.trim().to_ascii_lowercase();
        self.families.iter().any(|known| *known == family)
    }
}

/// First candidate the host has installed, or `fallback`.
pub fn first_available_family<S: AsRef<str>>(
    host: &dyn HostSurface,
    candidates: &[S],
    fallback: &str,
) -> String {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|family| host.has_font_family(family))
        .unwrap_or(fallback)
        .to_string()
}

/// Split a CSS `font-family` list, dropping quotes and empty entries.
pub fn split_family_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .filter(|part| !part.is_empty())
        .collect()
}
