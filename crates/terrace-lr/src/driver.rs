//! The table-driven runtime and the two failure policies.
//!
//! The driver keeps an LR state stack, a parallel buffer of child trees, and
//! a queue of read-ahead tokens. Terminals are read on demand through the
//! terminal readers; a token read while deciding is not bound to the stack
//! until a shift consumes it, so a reduce chosen on lookahead keeps the token
//! queued for the next state. Each queued token remembers the user state and
//! cursor after it, which is what lets a shift commit exactly `munch` tokens
//! and leave the rest queued.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use terrace_parse::{Parser, ResultTree, Success, TreeKind};
use terrace_text::{Position, Span, TextModel, Until};

use crate::grammar::{Grammar, Nonterminal, Symbol, Terminal};
use crate::graph::LrGraph;
use crate::plan::{synthesize, ActionPlan};
use crate::terminals::TerminalParsers;

/// Everything derived from a grammar at construction time. Built once,
/// shared by both parsers, never mutated.
struct Tables<T> {
    plans: Vec<ActionPlan>,
    gotos: FxHashMap<(u32, Nonterminal), u32>,
    /// Per user rule: lhs and rhs length.
    rules: Vec<(Nonterminal, usize)>,
    labels: FxHashMap<Nonterminal, T>,
    /// States from which end-of-input is permitted.
    final_states: Vec<bool>,
    invalid: Option<T>,
}

/// The parsers derived from one grammar, plus its conflict report.
pub struct LrParsers<S, T> {
    /// On failure, restarts over the input truncated at the last position
    /// where the parse could have ended.
    pub maximum_valid: Parser<S, T>,
    /// On failure, reports a best-effort partial tree instead.
    pub maximum_invalid: Parser<S, T>,
    /// The lhs of every rule involved in a table conflict, sorted. The
    /// parsers stay callable; a conflicted lookahead fails at runtime.
    pub conflicts: Vec<Nonterminal>,
}

/// Compile `grammar` and derive its parsers.
///
/// `labels` names the nonterminals whose reduce nodes should be labeled
/// (others stay structural); `invalid`, when given, labels the partial tree
/// both parsers fall back to.
pub fn build_parsers<S, T>(
    grammar: &Grammar,
    labels: FxHashMap<Nonterminal, T>,
    terminal_parsers: TerminalParsers<S, T>,
    invalid: Option<T>,
) -> LrParsers<S, T>
where
    S: Clone + 'static,
    T: Clone + 'static,
{
    let graph = LrGraph::build(grammar);
    let plans = synthesize(&graph);
    let final_states = graph.actions.iter().map(|table| table.contains_key(&None)).collect();
    let gotos = graph
        .transitions
        .iter()
        .filter_map(|(&(state, symbol), &target)| match symbol {
            Symbol::Nonterminal(n) => Some(((state, n), target)),
            Symbol::Terminal(_) => None,
        })
        .collect();
    let rules = grammar.rules().iter().map(|rule| (rule.lhs, rule.rhs.len())).collect();
    let tables = Rc::new(Tables { plans, gotos, rules, labels, final_states, invalid });

    let maximum_valid = {
        let tables = Rc::clone(&tables);
        let readers = Rc::clone(&terminal_parsers);
        Parser::new(move |state: S, model, line, col| {
            match run(&tables, &readers, state.clone(), model, line, col) {
                RunOutcome::Accepted(success) => Some(success),
                RunOutcome::Failed(failure) => match failure.last_valid {
                    Some(end) => {
                        let truncated = Until::new(model, end);
                        match run(&tables, &readers, state, &truncated, line, col) {
                            RunOutcome::Accepted(success) => Some(success),
                            RunOutcome::Failed(inner) => invalid_success(&tables, inner),
                        }
                    }
                    None => invalid_success(&tables, failure),
                },
            }
        })
    };
    let maximum_invalid = {
        let tables = Rc::clone(&tables);
        let readers = terminal_parsers;
        Parser::new(move |state, model, line, col| {
            match run(&tables, &readers, state, model, line, col) {
                RunOutcome::Accepted(success) => Some(success),
                RunOutcome::Failed(failure) => invalid_success(&tables, failure),
            }
        })
    };
    LrParsers { maximum_valid, maximum_invalid, conflicts: graph.conflicts }
}

/// A read-but-not-yet-shifted token: the shadow stack entry that lets the
/// driver roll user state and cursor to any commit point.
struct PendingToken<S, T> {
    terminal: Terminal,
    state: S,
    tree: ResultTree<T>,
    end: Position,
}

/// A failed run, with everything the failure policies need.
struct Failure<S, T> {
    last_valid: Option<Position>,
    entry: Position,
    committed: Position,
    state: S,
    children: Vec<ResultTree<T>>,
}

enum RunOutcome<S, T> {
    Accepted(Success<S, T>),
    Failed(Failure<S, T>),
}

fn invalid_success<S, T: Clone>(
    tables: &Tables<T>,
    failure: Failure<S, T>,
) -> Option<Success<S, T>> {
    let label = tables.invalid.clone()?;
    let result = ResultTree::join(
        failure.children,
        TreeKind::Labeled(label),
        Some(failure.entry),
        Some(failure.committed),
    );
    Some(Success { state: failure.state, result })
}

/// One non-restarting run of the driver.
fn run<S: Clone, T: Clone>(
    tables: &Tables<T>,
    readers: &TerminalParsers<S, T>,
    state: S,
    model: &dyn TextModel,
    line: usize,
    col: usize,
) -> RunOutcome<S, T> {
    model.assert_position(line, col);
    let entry = Position::new(line, col);
    let mut stack: Vec<u32> = vec![0];
    let mut children: Vec<ResultTree<T>> = Vec::new();
    let mut pending: Vec<PendingToken<S, T>> = Vec::new();
    let mut committed = entry;
    let mut committed_state = state;
    let mut last_valid: Option<Position> = None;

    loop {
        let top = *stack.last().expect("state stack never empty") as usize;
        if tables.final_states[top] {
            last_valid = Some(committed);
        }
        let mut plan = &tables.plans[top];
        let mut examined = 0usize;
        loop {
            match plan {
                ActionPlan::Error => {
                    return RunOutcome::Failed(Failure {
                        last_valid,
                        entry,
                        committed,
                        state: committed_state,
                        children,
                    });
                }
                ActionPlan::Accept => {
                    if children.len() != 1 {
                        panic!("accept with {} buffered trees", children.len());
                    }
                    let result = children.pop().expect("one buffered tree");
                    return RunOutcome::Accepted(Success { state: committed_state, result });
                }
                ActionPlan::Reduce(rule) => {
                    let (lhs, len) = tables.rules[*rule];
                    if stack.len() <= len {
                        return RunOutcome::Failed(Failure {
                            last_valid,
                            entry,
                            committed,
                            state: committed_state,
                            children,
                        });
                    }
                    stack.truncate(stack.len() - len);
                    let popped = children.split_off(children.len() - len);
                    let top = *stack.last().expect("state stack never empty");
                    let Some(&target) = tables.gotos.get(&(top, lhs)) else {
                        children.extend(popped);
                        return RunOutcome::Failed(Failure {
                            last_valid,
                            entry,
                            committed,
                            state: committed_state,
                            children,
                        });
                    };
                    stack.push(target);
                    let kind = match tables.labels.get(&lhs) {
                        Some(label) => TreeKind::Labeled(label.clone()),
                        None => TreeKind::Structural,
                    };
                    let node = if popped.is_empty() {
                        ResultTree::leaf(kind, Span::at(committed))
                    } else {
                        ResultTree::join(popped, kind, None, None)
                    };
                    children.push(node);
                    break;
                }
                ActionPlan::Shift { target, munch } => {
                    let munch = *munch;
                    if munch == 0 || pending.len() < munch {
                        panic!("shift of {munch} tokens with {} read ahead", pending.len());
                    }
                    let mut taken: Vec<PendingToken<S, T>> = pending.drain(..munch).collect();
                    {
                        let last = taken.last().expect("munch is nonzero");
                        committed = last.end;
                        committed_state = last.state.clone();
                    }
                    let node = if munch == 1 {
                        taken.pop().expect("munch is nonzero").tree
                    } else {
                        let tokens = taken.into_iter().map(|token| token.tree).collect();
                        ResultTree::join(tokens, TreeKind::Structural, None, None)
                    };
                    stack.push(*target);
                    children.push(node);
                    break;
                }
                ActionPlan::Read(options) => {
                    let terminal = if let Some(token) = pending.get(examined) {
                        examined += 1;
                        token.terminal
                    } else {
                        let mut candidates: FxHashSet<Terminal> = FxHashSet::default();
                        for option in options {
                            candidates.extend(option.terminals.iter().flatten());
                        }
                        let (read_from, read_state) = match pending.last() {
                            Some(token) => (token.end, token.state.clone()),
                            None => (committed, committed_state.clone()),
                        };
                        let mut matches = readers(
                            &candidates,
                            read_state,
                            model,
                            read_from.line,
                            read_from.column,
                        );
                        match matches.len() {
                            1 => {
                                let found = matches.pop().expect("one match");
                                let end = found.tree.span.end;
                                pending.push(PendingToken {
                                    terminal: found.terminal,
                                    state: found.state,
                                    tree: found.tree,
                                    end,
                                });
                                examined += 1;
                                found_terminal(&pending)
                            }
                            0 => {
                                // Only end-of-input may match silence.
                                match options.iter().find(|o| o.terminals.contains(&None)) {
                                    Some(option) => {
                                        plan = &option.plan;
                                        continue;
                                    }
                                    None => {
                                        return RunOutcome::Failed(Failure {
                                            last_valid,
                                            entry,
                                            committed,
                                            state: committed_state,
                                            children,
                                        });
                                    }
                                }
                            }
                            _ => {
                                // Ambiguous terminal match.
                                return RunOutcome::Failed(Failure {
                                    last_valid,
                                    entry,
                                    committed,
                                    state: committed_state,
                                    children,
                                });
                            }
                        }
                    };
                    match options.iter().find(|o| o.terminals.contains(&Some(terminal))) {
                        Some(option) => plan = &option.plan,
                        None => {
                            return RunOutcome::Failed(Failure {
                                last_valid,
                                entry,
                                committed,
                                state: committed_state,
                                children,
                            });
                        }
                    }
                }
            }
        }
    }
}

fn found_terminal<S, T>(pending: &[PendingToken<S, T>]) -> Terminal {
    pending.last().expect("token was just queued").terminal
}
