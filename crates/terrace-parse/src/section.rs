//! The re-indentation combinator.
//!
//! A section is a bullet line followed by an indented body and, optionally,
//! an after-clause. The body runs in a [`CutOut`] window whose column zero is
//! the body's logical start, so body grammars are indentation-agnostic; the
//! produced spans are shifted back to source coordinates before anyone else
//! sees them.

use std::rc::Rc;

use terrace_text::{CutOff, CutOut, Span, Text, TextModel};

use crate::lexer::Lexer;
use crate::parser::{Parser, Success};
use crate::tree::{ResultTree, TreeKind};

/// Builds the body parser for a section, given the source model, the state
/// after the bullet, and the bullet's tree.
pub type BodyBuilder<S, T> = Rc<dyn Fn(&dyn TextModel, &S, &ResultTree<T>) -> Parser<S, T>>;

/// Parse a bullet line, an indented body, and an optional after-clause.
///
/// At entry `(line, 0)` (any other column fails):
/// 1. The bullet runs on a [`CutOff`] view that ends after the first
///    non-indented line, where "indented" means `spaces` consumes columns.
/// 2. A [`CutOut`] window is anchored at the bullet's end: the rest of the
///    bullet line after `spaces`, then each following line trimmed by
///    `indentation`, until `indentation` rejects one.
/// 3. `body_of` builds the body parser, which runs on the window at `(0, 0)`;
///    its spans are shifted back to source coordinates.
/// 4. `after`, when given, runs at the post-body source position; its failure
///    is not fatal and simply omits the after branch.
pub fn section<S: Clone + 'static, T: 'static>(
    bullet: Parser<S, T>,
    body_of: BodyBuilder<S, T>,
    spaces: Lexer,
    indentation: Lexer,
    after: Option<Parser<S, T>>,
) -> Parser<S, T> {
    Parser::new(move |state: S, model, line, col| {
        if col != 0 {
            return None;
        }

        let spaces_at_bol = Rc::clone(&spaces);
        let is_indented = move |text: &Text| spaces_at_bol(text, 0) > 0;
        let cutoff = CutOff::new(model, line, &is_indented);
        let Success { state: bullet_state, result: bullet_tree } =
            bullet.parse(state, &cutoff, line, 0)?;

        let bullet_end = bullet_tree.span.end;
        let cutout = CutOut::new(
            &cutoff,
            bullet_end.line,
            bullet_end.column,
            spaces.as_ref(),
            indentation.as_ref(),
        );
        let body = body_of(model, &bullet_state, &bullet_tree);
        let Success { state: body_state, result: body_tree } =
            body.parse(bullet_state, &cutout, 0, 0)?;
        let body_tree = shift_tree(body_tree, &cutout);
        let body_end = body_tree.span.end;

        let mut children = vec![bullet_tree, body_tree];
        let mut state = body_state;
        if let Some(after) = &after {
            if let Some(out) = after.parse(state.clone(), model, body_end.line, body_end.column) {
                state = out.state;
                children.push(out.result);
            }
        }
        let result = ResultTree::join(children, TreeKind::Structural, None, None);
        Some(Success { state, result })
    })
}

/// Map every span of a window-relative tree back to source coordinates.
fn shift_tree<T>(tree: ResultTree<T>, window: &CutOut<'_>) -> ResultTree<T> {
    let start = window.shift(tree.span.start.line, tree.span.start.column);
    let end = window.shift(tree.span.end.line, tree.span.end.column);
    ResultTree {
        kind: tree.kind,
        span: Span::new(start, end),
        children: tree.children.into_iter().map(|child| shift_tree(child, window)).collect(),
    }
}
