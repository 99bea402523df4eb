//! Terminal readers: the bridge between the driver and combinator parsers.
//!
//! A reader is handed the set of terminals the current state could accept
//! and answers with every candidate it recognizes at the position, each as a
//! finished [`ResultTree`]. The driver requires exactly one candidate, so a
//! reader built from overlapping parsers should go through
//! [`greedy_choice`] or otherwise guarantee uniqueness.

use std::rc::Rc;

use rustc_hash::FxHashSet;

use terrace_parse::{Parser, ResultTree};
use terrace_text::TextModel;

use crate::grammar::Terminal;

/// One candidate terminal recognized at a position.
#[derive(Debug, Clone)]
pub struct TokenMatch<S, T> {
    pub terminal: Terminal,
    pub state: S,
    pub tree: ResultTree<T>,
}

/// Recognizes terminals from a requested candidate set at a position.
pub type TerminalParsers<S, T> = Rc<
    dyn Fn(&FxHashSet<Terminal>, S, &dyn TextModel, usize, usize) -> Vec<TokenMatch<S, T>>,
>;

/// Lift a parser into a reader for one terminal symbol.
///
/// Produces a match only when its terminal is among the requested ones and
/// the parser succeeds.
pub fn from_parser<S: 'static, T: 'static>(
    terminal: Terminal,
    parser: Parser<S, T>,
) -> TerminalParsers<S, T> {
    Rc::new(move |requested, state, model, line, col| {
        if !requested.contains(&terminal) {
            return Vec::new();
        }
        match parser.parse(state, model, line, col) {
            Some(success) => {
                vec![TokenMatch { terminal, state: success.state, tree: success.result }]
            }
            None => Vec::new(),
        }
    })
}

/// Concatenate every child reader's matches, in child order.
pub fn choice<S: Clone + 'static, T: 'static>(
    readers: Vec<TerminalParsers<S, T>>,
) -> TerminalParsers<S, T> {
    Rc::new(move |requested, state: S, model, line, col| {
        let mut matches = Vec::new();
        for reader in &readers {
            matches.extend(reader(requested, state.clone(), model, line, col));
        }
        matches
    })
}

/// The first child reader producing any match wins.
pub fn greedy_choice<S: Clone + 'static, T: 'static>(
    readers: Vec<TerminalParsers<S, T>>,
) -> TerminalParsers<S, T> {
    Rc::new(move |requested, state: S, model, line, col| {
        for reader in &readers {
            let matches = reader(requested, state.clone(), model, line, col);
            if !matches.is_empty() {
                return matches;
            }
        }
        Vec::new()
    })
}
