//! Output buffer and style-run reconciliation.
//!
//! The emitter owns the growing character stream and a log of style
//! snapshots keyed by character offset. Snapshots are recorded after every
//! tag event; once the document is consumed each snapshot offset becomes a
//! run boundary and the run up to the next boundary takes the style of the
//! earlier one.

use std::collections::BTreeMap;

use crate::document::Run;
use crate::style::{StyleSnapshot, TextStyle};

#[derive(Clone, Debug, Default)]
pub struct RunEmitter {
    text: String,
    char_len: usize,
    snapshots: Vec<(usize, StyleSnapshot)>,
}

impl RunEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output offset in characters.
    pub fn offset(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    pub fn last_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.text.ends_with(suffix)
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.char_len += s.chars().count();
    }

    pub fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.char_len += 1;
    }

    /// Delete the last character if `pred` accepts it.
    ///
    /// Snapshots that pointed past the new end are pulled back onto it.
    pub fn pop_char_if(&mut self, pred: impl Fn(char) -> bool) -> Option<char> {
        let last = self.last_char().filter(|ch| pred(*ch))?;
        self.text.pop();
        self.char_len -= 1;
        self.clamp_snapshots();
        Some(last)
    }

    /// Record the style in effect from the current offset onwards.
    ///
    /// A later snapshot at the same offset replaces the earlier one.
    pub fn record(&mut self, snapshot: StyleSnapshot) {
        let offset = self.char_len;
        match self.snapshots.last_mut() {
            Some((last_offset, last)) if *last_offset == offset => *last = snapshot,
            _ => self.snapshots.push((offset, snapshot)),
        }
    }

    fn clamp_snapshots(&mut self) {
        let end = self.char_len;
        let mut latest_at_end = None;
        while let Some((offset, _)) = self.snapshots.last() {
            if *offset < end {
                break;
            }
            if let Some((_, snapshot)) = self.snapshots.pop() {
                latest_at_end.get_or_insert(snapshot);
            }
        }
        if let Some(snapshot) = latest_at_end {
            self.snapshots.push((end, snapshot));
        }
    }

    /// Reconcile snapshots into runs and return the stream, runs, and link table.
    pub fn finish(self) -> (String, Vec<Run>, BTreeMap<usize, String>) {
        let end = self.char_len;
        let mut runs = Vec::with_capacity(self.snapshots.len());
        let mut links = BTreeMap::new();
        let mut iter = self.snapshots.into_iter().peekable();
        while let Some((start, snapshot)) = iter.next() {
            let stop = iter.peek().map_or(end, |(next, _)| *next).min(end);
            if stop <= start {
                continue;
            }
            if let Some(target) = &snapshot.link {
                links.insert(runs.len(), target.clone());
            }
            runs.push(Run {
                start,
                end: stop,
                style: TextStyle::resolve(&snapshot),
                link: snapshot.link,
            });
        }
        // Text written before the first snapshot would otherwise be unstyled.
        if let Some(first) = runs.first_mut() {
            first.start = 0;
        }
        (self.text, runs, links)
    }
}
