//! Parser combinators producing labeled, span-carrying parse trees.
//!
//! A [`Parser`] reads from a [`TextModel`] at a (line, column) position and
//! either fails or returns an updated user state plus a [`ResultTree`] whose
//! span starts exactly at the entry position. The [`combinator`] module
//! composes parsers; [`section`] parses an indented block through a
//! re-indentation window so its grammar is indentation-agnostic; the
//! [`lexer`] module bridges parsers into plain column-consuming callbacks.
//!
//! [`TextModel`]: terrace_text::TextModel

pub mod combinator;
pub mod lexer;
mod parser;
mod print;
mod section;
mod tree;

pub use lexer::Lexer;
pub use parser::{Parser, Success};
pub use print::{print_result, result_to_string};
pub use section::{section, BodyBuilder};
pub use tree::{ResultTree, TreeKind};
