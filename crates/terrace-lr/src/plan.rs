//! Per-state control programs for the driver.
//!
//! A plan tells the driver what to do in a state without consulting the raw
//! table again: reduce outright when every lookahead agrees, or read one
//! terminal and branch. Plans are synthesized once per grammar.

use rustc_hash::FxHashMap;

use crate::grammar::Lookahead;
use crate::graph::{LrGraph, RawAction};

/// The control program for one LR state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPlan {
    /// No viable action.
    Error,
    /// The parse is complete.
    Accept,
    /// Reduce by rule index.
    Reduce(usize),
    /// Push `target`, consuming `munch` buffered read-ahead tokens as the
    /// single pushed child (several tokens are grouped under a structural
    /// node).
    Shift { target: u32, munch: usize },
    /// Read one terminal, then follow the option whose candidate set
    /// contains it.
    Read(Vec<ReadOption>),
}

/// One branch of a [`ActionPlan::Read`] step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOption {
    /// Candidate lookaheads, sorted; `None` is the end-of-input terminal.
    pub terminals: Vec<Lookahead>,
    pub plan: ActionPlan,
}

/// Synthesize every state's plan from the graph's action tables.
pub fn synthesize(graph: &LrGraph) -> Vec<ActionPlan> {
    graph.actions.iter().map(state_plan).collect()
}

fn state_plan(actions: &FxHashMap<Lookahead, RawAction>) -> ActionPlan {
    if actions.is_empty() {
        return ActionPlan::Error;
    }
    // A reduce every lookahead agrees on needs no read at all.
    let mut unanimous = actions.values().copied();
    if let Some(first) = unanimous.next() {
        if let RawAction::Reduce(rule) = first {
            if unanimous.all(|action| action == first) {
                return ActionPlan::Reduce(rule);
            }
        }
    }
    // Group lookaheads by their action, deterministically.
    let mut entries: Vec<(Lookahead, RawAction)> =
        actions.iter().map(|(&lookahead, &action)| (lookahead, action)).collect();
    entries.sort_unstable_by_key(|&(lookahead, _)| lookahead);
    let mut groups: Vec<(RawAction, Vec<Lookahead>)> = Vec::new();
    for (lookahead, action) in entries {
        match groups.iter_mut().find(|(grouped, _)| *grouped == action) {
            Some((_, lookaheads)) => lookaheads.push(lookahead),
            None => groups.push((action, vec![lookahead])),
        }
    }
    let options = groups
        .into_iter()
        .map(|(action, terminals)| ReadOption {
            terminals,
            plan: match action {
                RawAction::Shift(target) => ActionPlan::Shift { target, munch: 1 },
                RawAction::Reduce(rule) => ActionPlan::Reduce(rule),
                RawAction::Accept => ActionPlan::Accept,
            },
        })
        .collect();
    ActionPlan::Read(options)
}
