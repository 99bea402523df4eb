//! Primitive parsers and the combinators that compose them.
//!
//! Single-character and position primitives produce `Discarded` nodes, so
//! sequencing them leaves clean trees behind; labeling happens through
//! [`literal_as`], [`with_label`], and friends. Branching combinators clone
//! the user state before each attempt, so a failed branch never leaks state.

use std::cell::OnceCell;

use terrace_text::{Position, Span, Text, TextChar};

use crate::parser::{Parser, Success};
use crate::tree::{ResultTree, TreeKind};

/// Succeeds without consuming anything, with an empty structural node.
pub fn empty<S: 'static, T: 'static>() -> Parser<S, T> {
    Parser::new(|state, _model, line, col| {
        let span = Span::at(Position::new(line, col));
        Some(Success { state, result: ResultTree::leaf(TreeKind::Structural, span) })
    })
}

/// Always fails.
pub fn fail<S: 'static, T: 'static>() -> Parser<S, T> {
    Parser::new(|_state, _model, _line, _col| None)
}

/// One character satisfying `pred`.
pub fn char_if<S: 'static, T: 'static>(
    pred: impl Fn(TextChar) -> bool + 'static,
) -> Parser<S, T> {
    Parser::new(move |state, model, line, col| {
        if line >= model.line_count() || col >= model.line_len(line) {
            return None;
        }
        if !pred(model.char_at(line, col)) {
            return None;
        }
        let span = Span::new(Position::new(line, col), Position::new(line, col + 1));
        Some(Success { state, result: ResultTree::leaf(TreeKind::Discarded, span) })
    })
}

/// Any single character.
pub fn any_char<S: 'static, T: 'static>() -> Parser<S, T> {
    char_if(|_| true)
}

/// The newline transition at the end of a non-last line.
pub fn newline<S: 'static, T: 'static>() -> Parser<S, T> {
    Parser::new(|state, model, line, col| {
        if line + 1 >= model.line_count() || col != model.line_len(line) {
            return None;
        }
        let span = Span::new(Position::new(line, col), Position::new(line + 1, 0));
        Some(Success { state, result: ResultTree::leaf(TreeKind::Discarded, span) })
    })
}

/// End of input: past the last line, or at the last line's end.
pub fn eof<S: 'static, T: 'static>() -> Parser<S, T> {
    Parser::new(|state, model, line, col| {
        let at_end = line == model.line_count()
            || (line + 1 == model.line_count() && col == model.line_len(line));
        if !at_end {
            return None;
        }
        let span = Span::at(Position::new(line, col));
        Some(Success { state, result: ResultTree::leaf(TreeKind::Discarded, span) })
    })
}

/// Beginning of an existing line.
pub fn bol<S: 'static, T: 'static>() -> Parser<S, T> {
    Parser::new(|state, model, line, col| {
        if col != 0 || line >= model.line_count() {
            return None;
        }
        let span = Span::at(Position::new(line, col));
        Some(Success { state, result: ResultTree::leaf(TreeKind::Discarded, span) })
    })
}

/// End of input or a newline transition.
pub fn eol<S: Clone + 'static, T: 'static>() -> Parser<S, T> {
    choice(vec![eof(), newline()])
}

/// Succeeds exactly when `p` fails; consumes nothing and leaves the caller's
/// state untouched (a success of `p` is discarded entirely).
pub fn not<S: Clone + 'static, T: 'static>(p: Parser<S, T>) -> Parser<S, T> {
    Parser::new(move |state: S, model, line, col| {
        if p.parse(state.clone(), model, line, col).is_some() {
            return None;
        }
        let span = Span::at(Position::new(line, col));
        Some(Success { state, result: ResultTree::leaf(TreeKind::Discarded, span) })
    })
}

/// Succeeds exactly when `p` succeeds, without consuming anything; the inner
/// state is discarded.
pub fn lookahead<S: Clone + 'static, T: 'static>(p: Parser<S, T>) -> Parser<S, T> {
    Parser::new(move |state: S, model, line, col| {
        p.parse(state.clone(), model, line, col)?;
        let span = Span::at(Position::new(line, col));
        Some(Success { state, result: ResultTree::leaf(TreeKind::Discarded, span) })
    })
}

/// Run `parsers` in order, threading state and cursor; fails on the first
/// failure. No parsers is [`empty`]; one parser is returned as-is.
pub fn seq<S: 'static, T: 'static>(parsers: Vec<Parser<S, T>>) -> Parser<S, T> {
    if parsers.is_empty() {
        return empty();
    }
    if parsers.len() == 1 {
        return parsers.into_iter().next().expect("one parser");
    }
    Parser::new(move |state, model, line, col| {
        let start = Position::new(line, col);
        let mut state = state;
        let mut cursor = start;
        let mut children = Vec::with_capacity(parsers.len());
        for p in &parsers {
            let success = p.parse(state, model, cursor.line, cursor.column)?;
            state = success.state;
            cursor = success.result.span.end;
            children.push(success.result);
        }
        let result = ResultTree::join(children, TreeKind::Structural, Some(start), Some(cursor));
        Some(Success { state, result })
    })
}

/// Try `parsers` in order; the first success wins. There is no backtracking
/// into the chosen branch.
pub fn choice<S: Clone + 'static, T: 'static>(parsers: Vec<Parser<S, T>>) -> Parser<S, T> {
    Parser::new(move |state: S, model, line, col| {
        parsers.iter().find_map(|p| p.parse(state.clone(), model, line, col))
    })
}

/// Zero or one occurrence of `p`.
pub fn opt<S: Clone + 'static, T: 'static>(p: Parser<S, T>) -> Parser<S, T> {
    choice(vec![p, empty()])
}

/// Greedy repetition of `p`; always succeeds.
///
/// Stops on the first failure, and also after a success that consumed
/// nothing (keeping that one iteration), so a zero-width parser cannot spin.
pub fn many<S: Clone + 'static, T: 'static>(p: Parser<S, T>) -> Parser<S, T> {
    Parser::new(move |state: S, model, line, col| {
        let start = Position::new(line, col);
        let mut state = state;
        let mut cursor = start;
        let mut children = Vec::new();
        while let Some(success) = p.parse(state.clone(), model, cursor.line, cursor.column) {
            state = success.state;
            let end = success.result.span.end;
            let stalled = end == cursor;
            cursor = end;
            children.push(success.result);
            if stalled {
                break;
            }
        }
        let result = ResultTree::join(children, TreeKind::Structural, Some(start), Some(cursor));
        Some(Success { state, result })
    })
}

/// One or more occurrences of `p`.
pub fn many1<S: Clone + 'static, T: 'static>(p: Parser<S, T>) -> Parser<S, T> {
    seq(vec![p.clone(), many(p)])
}

/// `elem`, then any number of `sep` + `elem` pairs.
pub fn separated<S: Clone + 'static, T: 'static>(
    elem: Parser<S, T>,
    sep: Parser<S, T>,
) -> Parser<S, T> {
    seq(vec![elem.clone(), many(seq(vec![sep, elem]))])
}

/// Defer building a parser until first use; the built parser is memoized.
/// Required for recursive grammars.
pub fn lazy<S: 'static, T: 'static>(thunk: impl Fn() -> Parser<S, T> + 'static) -> Parser<S, T> {
    let cell: OnceCell<Parser<S, T>> = OnceCell::new();
    Parser::new(move |state, model, line, col| {
        cell.get_or_init(|| thunk()).parse(state, model, line, col)
    })
}

/// Match `text` (NFC-normalized) within a single line; the node is
/// structural and childless.
pub fn literal<S: 'static, T: 'static>(text: &str) -> Parser<S, T> {
    let expected = Text::new(text);
    Parser::new(move |state, model, line, col| {
        if line >= model.line_count() {
            return None;
        }
        let actual = model.line_at(line);
        if col + expected.len() > actual.len() {
            return None;
        }
        for (i, c) in expected.chars().enumerate() {
            if actual.char_at(col + i) != c {
                return None;
            }
        }
        let span = Span::new(Position::new(line, col), Position::new(line, col + expected.len()));
        Some(Success { state, result: ResultTree::leaf(TreeKind::Structural, span) })
    })
}

/// [`literal`], labeled.
pub fn literal_as<S: 'static, T: Clone + 'static>(text: &str, label: T) -> Parser<S, T> {
    with_label(literal(text), label)
}

/// The first of several literals that matches.
pub fn literals<S: Clone + 'static, T: 'static>(texts: &[&str]) -> Parser<S, T> {
    choice(texts.iter().map(|text| literal(text)).collect())
}

/// Post-process a success; `f` returning `None` turns it into a failure.
pub fn modify_result<S: 'static, T: 'static>(
    p: Parser<S, T>,
    f: impl Fn(Success<S, T>) -> Option<Success<S, T>> + 'static,
) -> Parser<S, T> {
    Parser::new(move |state, model, line, col| p.parse(state, model, line, col).and_then(&f))
}

/// Rewrite the top node's label (`None` means structural). Discarded tops
/// pass through unchanged.
pub fn modify_label<S: 'static, T: 'static>(
    p: Parser<S, T>,
    f: impl Fn(Option<T>) -> Option<T> + 'static,
) -> Parser<S, T> {
    Parser::new(move |state, model, line, col| {
        let mut success = p.parse(state, model, line, col)?;
        success.result.kind = match success.result.kind {
            TreeKind::Labeled(label) => label_kind(f(Some(label))),
            TreeKind::Structural => label_kind(f(None)),
            TreeKind::Discarded => TreeKind::Discarded,
        };
        Some(success)
    })
}

/// Label the top node of `p`'s result.
pub fn with_label<S: 'static, T: Clone + 'static>(p: Parser<S, T>, label: T) -> Parser<S, T> {
    Parser::new(move |state, model, line, col| {
        let mut success = p.parse(state, model, line, col)?;
        success.result.kind = TreeKind::Labeled(label.clone());
        Some(success)
    })
}

fn label_kind<T>(label: Option<T>) -> TreeKind<T> {
    match label {
        Some(label) => TreeKind::Labeled(label),
        None => TreeKind::Structural,
    }
}
