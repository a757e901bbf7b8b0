//! Convert a restricted HTML subset into styled text runs.
//!
//! The output [`Document`] is a flat character stream plus non-overlapping
//! style runs covering it, image placements, and a link table keyed by run
//! index. A host text widget applies the runs as tags and inserts the images.
//!
//! ```no_run
//! use html_runs::{HtmlConverter, StaticHost};
//!
//! let mut engine = HtmlConverter::default();
//! let doc = engine.convert("<b>Hi</b> <i>there</i>", &StaticHost::default());
//! assert_eq!(doc.text(), "Hi there");
//! for run in doc.runs() {
//!     println!("{}..{} bold={}", run.start, run.end, run.style.is_bold());
//! }
//! ```

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod attrs;
pub mod convert;
pub mod document;
pub mod error;
pub mod host;
pub mod lists;
pub mod options;
pub mod resource;
pub mod runs;
pub mod style;
pub mod tag;
pub mod tokenizer;
pub mod whitespace;

pub use attrs::{AttributeSet, ListNumbering};
pub use convert::HtmlConverter;
pub use document::{Document, ImagePlacement, Run};
pub use error::{EngineError, EngineErrorContext, ErrorPhase};
pub use host::{HostSurface, StaticHost};
pub use lists::{ListContext, ListKind, ListStack};
pub use options::{ConvertOptions, FontDefaults, ImageOptions, Palette, TabLayout};
#[cfg(feature = "remote-images")]
pub use resource::HttpFetcher;
pub use resource::{ImageResolver, OfflineFetcher, ResourceFetcher};
pub use style::{
    FontSlant, FontSpec, FontWeight, Justify, Property, PropertyStack, StyleSnapshot, StyleStack,
    TabAlign, TabStop, TabStops, TextStyle,
};
pub use tokenizer::{MarkupEvent, MarkupTokens};
