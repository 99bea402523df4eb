//! Text model for indentation-structured parsing.
//!
//! Source text is addressed by (line, column) coordinates over immutable,
//! freely aliased models. The root model is a [`Document`]; window views
//! ([`CutOff`], [`CutOut`], [`Until`]) restrict or re-anchor a model without
//! copying line content, and translate their coordinates back to the source
//! through [`TextModel::absolute`].

mod model;
mod position;
mod text;
mod window;

pub use model::{Document, TextModel};
pub use position::{Position, Span};
pub use text::{Text, TextChar};
pub use window::{CutOff, CutOut, Until};
