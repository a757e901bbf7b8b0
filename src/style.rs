//! Per-property inherited style stacks.
//!
//! Every inheritable property lives on its own [`PropertyStack`]. A stack
//! starts with a sentinel entry owned by [`DEFAULT_OWNER`] that is never
//! removed; the top entry is the effective value. Close tags remove the most
//! recent entry owned by that tag name rather than the top, so a badly nested
//! close only disturbs entries that tag itself pushed.
//!
//! An open tag that is never closed leaves its entries behind for the rest of
//! the document.

use smallvec::SmallVec;
use std::sync::Arc;

use crate::error::{EngineError, ErrorPhase};

/// Owner key of the permanent bottom entry of every property stack.
pub const DEFAULT_OWNER: &str = "__DEFAULT__";

/// Inheritance stack for one style property.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyStack<V> {
    entries: SmallVec<[(&'static str, V); 4]>,
}

impl<V: Clone> PropertyStack<V> {
    /// Create a stack holding only the sentinel default.
    pub fn new(default: V) -> Self {
        let mut entries = SmallVec::new();
        entries.push((DEFAULT_OWNER, default));
        Self { entries }
    }

    /// Effective value.
    pub fn top(&self) -> &V {
        // The sentinel is never removed, so the stack is never empty.
        &self.entries[self.entries.len() - 1].1
    }

    /// Number of entries, sentinel included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push an entry owned by `owner`. `None` re-pushes the current value.
    pub fn push(&mut self, owner: &'static str, value: Option<V>) {
        let value = value.unwrap_or_else(|| self.top().clone());
        self.entries.push((owner, value));
    }

    /// Remove the most recent entry owned by `owner` and return its value.
    ///
    /// The sentinel is never removed; a missing owner is a no-op.
    pub fn pop(&mut self, owner: &str) -> Option<V> {
        if self.entries.len() <= 1 {
            return None;
        }
        let idx = self
            .entries
            .iter()
            .rposition(|(entry_owner, _)| *entry_owner == owner)
            .filter(|idx| *idx > 0)?;
        Some(self.entries.remove(idx).1)
    }

    /// Owners from bottom to top.
    pub fn owners(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(owner, _)| *owner)
    }
}

/// Font weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font slant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontSlant {
    #[default]
    Roman,
    Italic,
}

/// Paragraph justification supported by the host surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Justify {
    #[default]
    Left,
    Right,
    Center,
}

impl Justify {
    /// Resolve a `text-align` value. Anything but `right`/`center` is `Left`.
    pub fn resolve(value: &str) -> Self {
        match value.trim() {
            "right" => Self::Right,
            "center" => Self::Center,
            _ => Self::Left,
        }
    }
}

/// Side of a tab stop the following text aligns against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TabAlign {
    Left,
    Right,
}

/// One horizontal tab stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TabStop {
    /// Distance from the left edge, in host units.
    pub position: u32,
    /// Alignment at this stop.
    pub align: TabAlign,
}

/// Shared, immutable tab-stop list.
pub type TabStops = Arc<[TabStop]>;

/// Keys of the stacked properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    Foreground,
    Background,
    Justify,
    Tabs,
    Family,
    Size,
    Weight,
    Slant,
    Underline,
    Overstrike,
    Link,
}

impl Property {
    /// All stacked properties.
    pub const ALL: [Property; 11] = [
        Property::Foreground,
        Property::Background,
        Property::Justify,
        Property::Tabs,
        Property::Family,
        Property::Size,
        Property::Weight,
        Property::Slant,
        Property::Underline,
        Property::Overstrike,
        Property::Link,
    ];

    /// Properties every styled tag pushes on open and pops on close.
    pub const INHERITED: [Property; 7] = [
        Property::Foreground,
        Property::Background,
        Property::Justify,
        Property::Family,
        Property::Size,
        Property::Underline,
        Property::Overstrike,
    ];

    /// Stable key name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::Background => "background",
            Self::Justify => "justify",
            Self::Tabs => "tabs",
            Self::Family => "family",
            Self::Size => "size",
            Self::Weight => "weight",
            Self::Slant => "slant",
            Self::Underline => "underline",
            Self::Overstrike => "overstrike",
            Self::Link => "link",
        }
    }

    /// Look a property up by key name.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        Self::ALL
            .into_iter()
            .find(|prop| prop.name() == name)
            .ok_or_else(|| {
                EngineError::new(
                    ErrorPhase::Style,
                    "STYLE_UNKNOWN_PROPERTY",
                    format!("no style property named '{}'", name),
                )
                .with_property(name)
            })
    }
}

/// Bottom-of-stack values for a conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleDefaults {
    pub foreground: String,
    pub background: String,
    pub family: String,
    pub size: u16,
}

/// The full set of property stacks.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleStack {
    pub foreground: PropertyStack<String>,
    pub background: PropertyStack<String>,
    /// Raw `text-align` value; resolved to [`Justify`] when runs are built.
    pub justify: PropertyStack<String>,
    pub tabs: PropertyStack<TabStops>,
    pub family: PropertyStack<String>,
    pub size: PropertyStack<u16>,
    pub weight: PropertyStack<FontWeight>,
    pub slant: PropertyStack<FontSlant>,
    pub underline: PropertyStack<bool>,
    pub overstrike: PropertyStack<bool>,
    pub link: PropertyStack<Option<String>>,
}

impl StyleStack {
    /// Seed every stack with its sentinel default.
    pub fn new(defaults: StyleDefaults) -> Self {
        Self {
            foreground: PropertyStack::new(defaults.foreground),
            background: PropertyStack::new(defaults.background),
            justify: PropertyStack::new("left".to_string()),
            tabs: PropertyStack::new(Arc::from(Vec::new())),
            family: PropertyStack::new(defaults.family),
            size: PropertyStack::new(defaults.size),
            weight: PropertyStack::new(FontWeight::Normal),
            slant: PropertyStack::new(FontSlant::Roman),
            underline: PropertyStack::new(false),
            overstrike: PropertyStack::new(false),
            link: PropertyStack::new(None),
        }
    }

    /// Pop `owner`'s most recent entry from one property stack.
    ///
    /// Returns whether an entry was removed.
    pub fn pop(&mut self, owner: &str, property: Property) -> bool {
        match property {
            Property::Foreground => self.foreground.pop(owner).is_some(),
            Property::Background => self.background.pop(owner).is_some(),
            Property::Justify => self.justify.pop(owner).is_some(),
            Property::Tabs => self.tabs.pop(owner).is_some(),
            Property::Family => self.family.pop(owner).is_some(),
            Property::Size => self.size.pop(owner).is_some(),
            Property::Weight => self.weight.pop(owner).is_some(),
            Property::Slant => self.slant.pop(owner).is_some(),
            Property::Underline => self.underline.pop(owner).is_some(),
            Property::Overstrike => self.overstrike.pop(owner).is_some(),
            Property::Link => self.link.pop(owner).is_some(),
        }
    }

    /// Pop by property key name. Unknown keys are reported as errors.
    pub fn pop_named(&mut self, owner: &str, name: &str) -> Result<bool, EngineError> {
        let property = Property::from_name(name)?;
        Ok(self.pop(owner, property))
    }

    /// Current depth of one property stack, sentinel included.
    pub fn depth(&self, property: Property) -> usize {
        match property {
            Property::Foreground => self.foreground.len(),
            Property::Background => self.background.len(),
            Property::Justify => self.justify.len(),
            Property::Tabs => self.tabs.len(),
            Property::Family => self.family.len(),
            Property::Size => self.size.len(),
            Property::Weight => self.weight.len(),
            Property::Slant => self.slant.len(),
            Property::Underline => self.underline.len(),
            Property::Overstrike => self.overstrike.len(),
            Property::Link => self.link.len(),
        }
    }

    /// Capture the top of every stack.
    pub fn snapshot(&self) -> StyleSnapshot {
        StyleSnapshot {
            foreground: self.foreground.top().clone(),
            background: self.background.top().clone(),
            justify: self.justify.top().clone(),
            tabs: Arc::clone(self.tabs.top()),
            family: self.family.top().clone(),
            size: *self.size.top(),
            weight: *self.weight.top(),
            slant: *self.slant.top(),
            underline: *self.underline.top(),
            overstrike: *self.overstrike.top(),
            link: self.link.top().clone(),
        }
    }
}

/// Top-of-stack values captured at one output offset.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSnapshot {
    pub foreground: String,
    pub background: String,
    pub justify: String,
    pub tabs: TabStops,
    pub family: String,
    pub size: u16,
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub underline: bool,
    pub overstrike: bool,
    pub link: Option<String>,
}

/// Font attributes of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSpec {
    pub family: String,
    pub size: u16,
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub underline: bool,
    pub overstrike: bool,
}

/// Resolved style attributes of a run, ready for the host surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub foreground: String,
    pub background: String,
    pub font: FontSpec,
    pub justify: Justify,
    pub tabs: TabStops,
}

impl TextStyle {
    /// Resolve a snapshot into host-ready attributes.
    pub fn resolve(snapshot: &StyleSnapshot) -> Self {
        Self {
            foreground: snapshot.foreground.clone(),
            background: snapshot.background.clone(),
            font: FontSpec {
                family: snapshot.family.clone(),
                size: snapshot.size,
                weight: snapshot.weight,
                slant: snapshot.slant,
                underline: snapshot.underline,
                overstrike: snapshot.overstrike,
            },
            justify: Justify::resolve(&snapshot.justify),
            tabs: Arc::clone(&snapshot.tabs),
        }
    }

    /// Whether the run is rendered bold.
    pub fn is_bold(&self) -> bool {
        self.font.weight == FontWeight::Bold
    }

    /// Whether the run is rendered in italics.
    pub fn is_italic(&self) -> bool {
        self.font.slant == FontSlant::Italic
    }
}
