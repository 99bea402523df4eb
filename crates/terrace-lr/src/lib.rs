//! Table-driven LR(1) parsing that cooperates with parser combinators.
//!
//! A [`Grammar`] over opaque symbol handles is compiled into an LR(1) state
//! graph and per-state action plans, once, at construction. The driver reads
//! terminals on demand through user-supplied [`terminals`] readers (each
//! returning an ordinary [`ResultTree`] per recognized terminal) and
//! assembles the same kind of tree a combinator parser would produce.
//!
//! [`build_parsers`] derives two parsers per grammar: one that restarts from
//! the longest previously accepted prefix on failure, and one that reports a
//! best-effort partial tree instead.
//!
//! [`ResultTree`]: terrace_parse::ResultTree

mod driver;
mod grammar;
mod graph;
mod plan;
pub mod terminals;

pub use driver::{build_parsers, LrParsers};
pub use grammar::{Grammar, Lookahead, Nonterminal, Rule, Symbol, Terminal};
pub use graph::{LrGraph, RawAction};
pub use plan::{ActionPlan, ReadOption};
pub use terminals::{TerminalParsers, TokenMatch};
