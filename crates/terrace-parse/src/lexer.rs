//! Bridging parsers into plain column-consuming callbacks.
//!
//! A [`Lexer`] reads one line at a column and answers how many columns it
//! consumed, or a negative number for "no match". The section parser's
//! indentation hooks take this shape.

use std::rc::Rc;

use terrace_text::{Document, Text};

use crate::parser::{Parser, Success};

/// A single-line recognizer: columns consumed, or negative for no match.
pub type Lexer = Rc<dyn Fn(&Text, usize) -> isize>;

/// Wrap a stateless parser as a [`Lexer`].
///
/// Runs `p` over a one-line model at the given column and reports how far it
/// got; a failing parse (or an out-of-line column) is `-1`.
pub fn parser_lexer<T: 'static>(p: Parser<(), T>) -> Lexer {
    Rc::new(move |text: &Text, col: usize| {
        if col > text.len() {
            return -1;
        }
        let model = Document::from_lines(vec![text.clone()]);
        match p.parse((), &model, 0, col) {
            Some(success) => (success.result.span.end.column - col) as isize,
            None => -1,
        }
    })
}

/// Erase a stateful parser into a stateless one by threading a clone of
/// `initial` on every call and discarding the state it returns.
pub fn stateless<S: Clone + 'static, T: 'static>(p: Parser<S, T>, initial: S) -> Parser<(), T> {
    Parser::new(move |_state, model, line, col| {
        let success = p.parse(initial.clone(), model, line, col)?;
        Some(Success { state: (), result: success.result })
    })
}
