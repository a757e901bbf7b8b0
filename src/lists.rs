//! Nested list state, item markers, and list tab-stop ladders.

use std::sync::Arc;

use crate::attrs::ListNumbering;
use crate::options::TabLayout;
use crate::style::{TabAlign, TabStop, TabStops};

/// Glyph used for unordered list items.
pub const BULLET: char = '\u{2022}';

/// Kind of one open list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered(ListNumbering),
}

/// State of one open list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListContext {
    pub kind: ListKind,
    /// Number of items seen so far. Stays at zero for unordered lists.
    pub counter: u32,
}

impl ListContext {
    /// Create a context with no items yet.
    pub fn new(kind: ListKind) -> Self {
        Self { kind, counter: 0 }
    }

    /// Whether this list is numbered.
    pub fn is_ordered(&self) -> bool {
        matches!(self.kind, ListKind::Ordered(_))
    }

    /// Advance to the next item.
    pub fn advance(&mut self) {
        if self.is_ordered() {
            self.counter = self.counter.saturating_add(1);
        }
    }

    /// Marker for the current item, without punctuation or tabs.
    pub fn marker(&self) -> String {
        match self.kind {
            ListKind::Unordered => BULLET.to_string(),
            ListKind::Ordered(ListNumbering::Numeric) => self.counter.to_string(),
            ListKind::Ordered(ListNumbering::LowerAlpha) => alpha_label(self.counter),
            ListKind::Ordered(ListNumbering::UpperAlpha) => {
                alpha_label(self.counter).to_ascii_uppercase()
            }
        }
    }
}

/// Bijective base-26 label: `1 -> a`, `26 -> z`, `27 -> aa`.
///
/// Zero has no label and yields an empty string.
pub fn alpha_label(mut n: u32) -> String {
    let mut rev = Vec::with_capacity(4);
    while n > 0 {
        n -= 1;
        rev.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    rev.iter().rev().map(|b| char::from(*b)).collect()
}

/// Stack of open lists; its depth is the indentation level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListStack {
    contexts: Vec<ListContext>,
}

impl ListStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nesting depth.
    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Open a list and return the tab ladder for the new depth.
    pub fn open(&mut self, kind: ListKind, layout: &TabLayout) -> TabStops {
        self.contexts.push(ListContext::new(kind));
        list_tab_ladder(self.depth(), layout)
    }

    /// Close the innermost list.
    pub fn close(&mut self) -> Option<ListContext> {
        self.contexts.pop()
    }

    /// Start a new item in the innermost list and return its marker line.
    ///
    /// The line is `depth`-indented with tabs so the marker lands on the
    /// right-aligned stop of its level and the text on the following stop.
    /// Returns `None` outside any list.
    pub fn next_item(&mut self) -> Option<String> {
        let depth = self.depth();
        let ctx = self.contexts.last_mut()?;
        ctx.advance();
        let marker = ctx.marker();
        let mut line = String::with_capacity(2 * depth + marker.len() + 2);
        line.push('\t');
        for _ in 1..depth {
            line.push_str("\t\t");
        }
        line.push_str(&marker);
        if ctx.is_ordered() {
            line.push('.');
        }
        line.push('\t');
        Some(line)
    }
}

/// Tab stops for a list nested `depth` levels deep.
///
/// Each level contributes a right-aligned marker stop and a left-aligned
/// text stop `list_marker_gap` units after it.
pub fn list_tab_ladder(depth: usize, layout: &TabLayout) -> TabStops {
    let mut stops = Vec::with_capacity(depth * 2);
    for level in 1..=depth as u32 {
        let offset = layout.list_indent_step * level;
        stops.push(TabStop {
            position: offset,
            align: TabAlign::Right,
        });
        stops.push(TabStop {
            position: offset + layout.list_marker_gap,
            align: TabAlign::Left,
        });
    }
    Arc::from(stops)
}

/// Evenly spaced left-aligned column stops for a table.
pub fn table_tab_stops(layout: &TabLayout) -> TabStops {
    let stops: Vec<TabStop> = (1..=layout.table_columns)
        .map(|col| TabStop {
            position: layout.table_column_width * col,
            align: TabAlign::Left,
        })
        .collect();
    Arc::from(stops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_labels_are_bijective_base26() {
        assert_eq!(alpha_label(1), "a");
        assert_eq!(alpha_label(26), "z");
        assert_eq!(alpha_label(27), "aa");
        assert_eq!(alpha_label(52), "az");
        assert_eq!(alpha_label(53), "ba");
        assert_eq!(alpha_label(702), "zz");
        assert_eq!(alpha_label(703), "aaa");
        assert_eq!(alpha_label(0), "");
    }

    #[test]
    fn upper_alpha_markers_fold_case() {
        let mut ctx = ListContext::new(ListKind::Ordered(ListNumbering::UpperAlpha));
        let mut markers = Vec::new();
        for _ in 0..27 {
            ctx.advance();
            markers.push(ctx.marker());
        }
        assert_eq!(markers[0], "A");
        assert_eq!(markers[25], "Z");
        assert_eq!(markers[26], "AA");
    }

    #[test]
    fn unordered_counter_stays_unused() {
        let mut ctx = ListContext::new(ListKind::Unordered);
        ctx.advance();
        ctx.advance();
        assert_eq!(ctx.counter, 0);
        assert_eq!(ctx.marker(), "\u{2022}");
    }

    #[test]
    fn marker_lines_indent_per_depth() {
        let layout = TabLayout::default();
        let mut lists = ListStack::new();
        assert_eq!(lists.next_item(), None);
        lists.open(ListKind::Ordered(ListNumbering::Numeric), &layout);
        assert_eq!(lists.next_item().as_deref(), Some("\t1.\t"));
        assert_eq!(lists.next_item().as_deref(), Some("\t2.\t"));
        lists.open(ListKind::Unordered, &layout);
        assert_eq!(lists.next_item().as_deref(), Some("\t\t\t\u{2022}\t"));
        lists.close();
        assert_eq!(lists.next_item().as_deref(), Some("\t3.\t"));
    }

    #[test]
    fn ladder_grows_by_indent_step_per_level() {
        let layout = TabLayout::default();
        let ladder = list_tab_ladder(2, &layout);
        let positions: Vec<(u32, TabAlign)> =
            ladder.iter().map(|stop| (stop.position, stop.align)).collect();
        assert_eq!(
            positions,
            [
                (30, TabAlign::Right),
                (35, TabAlign::Left),
                (60, TabAlign::Right),
                (65, TabAlign::Left),
            ]
        );
    }

    #[test]
    fn table_stops_are_uniform_columns() {
        let layout = TabLayout::default();
        let stops = table_tab_stops(&layout);
        assert_eq!(stops.len(), 30);
        assert_eq!(stops[0].position, 40);
        assert_eq!(stops[29].position, 1200);
        assert!(stops.iter().all(|stop| stop.align == TabAlign::Left));
    }
}
