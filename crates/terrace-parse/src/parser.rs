use std::rc::Rc;

use terrace_text::TextModel;

use crate::tree::ResultTree;

/// A successful parse: the threaded user state plus the produced tree.
#[derive(Debug, Clone)]
pub struct Success<S, T> {
    pub state: S,
    pub result: ResultTree<T>,
}

type ParserFn<S, T> = dyn Fn(S, &dyn TextModel, usize, usize) -> Option<Success<S, T>>;

/// A parser over a text model.
///
/// Reads at `(line, col)` and either fails (`None`, leaving the caller's
/// state untouched) or succeeds with an updated state and a tree whose span
/// starts exactly at the entry position. Parsers are cheap to clone and
/// freely shared; user state `S` is threaded by value.
pub struct Parser<S, T> {
    f: Rc<ParserFn<S, T>>,
}

impl<S, T> Clone for Parser<S, T> {
    fn clone(&self) -> Self {
        Self { f: Rc::clone(&self.f) }
    }
}

impl<S, T> Parser<S, T> {
    pub fn new(
        f: impl Fn(S, &dyn TextModel, usize, usize) -> Option<Success<S, T>> + 'static,
    ) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Run the parser at `(line, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the entry position is not valid in `model`.
    pub fn parse(
        &self,
        state: S,
        model: &dyn TextModel,
        line: usize,
        col: usize,
    ) -> Option<Success<S, T>> {
        model.assert_position(line, col);
        (self.f)(state, model, line, col)
    }
}
