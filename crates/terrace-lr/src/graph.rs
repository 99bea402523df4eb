//! Canonical LR(1) state-graph construction.
//!
//! Items carry one lookahead terminal; closure propagates lookaheads through
//! FIRST sets, goto advances dots, and identical item sets share a state.
//! The product is a transition map plus a per-state action table; a
//! (state, lookahead) pair with more than one distinct action is dropped from
//! the table and reported through the conflict set instead.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use crate::grammar::{Grammar, Lookahead, Nonterminal, Symbol, Terminal};

/// A raw table action for one (state, lookahead) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawAction {
    Shift(u32),
    Reduce(usize),
    Accept,
}

/// The finished LR(1) graph: numbered states, transitions, actions.
#[derive(Debug, Clone)]
pub struct LrGraph {
    /// Shift and goto transitions, keyed by (state, symbol).
    pub transitions: FxHashMap<(u32, Symbol), u32>,
    /// Per-state actions keyed by lookahead; conflicted lookaheads are absent.
    pub actions: Vec<FxHashMap<Lookahead, RawAction>>,
    /// The lhs of every reduce rule involved in a conflict, sorted.
    pub conflicts: Vec<Nonterminal>,
}

impl LrGraph {
    pub fn build(grammar: &Grammar) -> LrGraph {
        Builder::new(grammar).build()
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }
}

/// One LR(1) item: a rule, a dot offset into its rhs, and a lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    rule: usize,
    dot: usize,
    lookahead: Lookahead,
}

struct Builder<'g> {
    grammar: &'g Grammar,
    /// Rhs of the augmented start rule, indexed as `grammar.rules().len()`.
    aug_rhs: Vec<Symbol>,
    rules_of: Vec<Vec<usize>>,
    nullable: Vec<bool>,
    first: Vec<BTreeSet<Terminal>>,
}

impl<'g> Builder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let n = grammar.nonterminal_count() as usize;
        let mut rules_of = vec![Vec::new(); n];
        for (i, rule) in grammar.rules().iter().enumerate() {
            rules_of[rule.lhs.0 as usize].push(i);
        }
        let (nullable, first) = first_sets(grammar);
        Self {
            grammar,
            aug_rhs: vec![Symbol::Nonterminal(grammar.start())],
            rules_of,
            nullable,
            first,
        }
    }

    fn rhs(&self, rule: usize) -> &[Symbol] {
        if rule < self.grammar.rules().len() {
            &self.grammar.rules()[rule].rhs
        } else {
            &self.aug_rhs
        }
    }

    /// FIRST of a symbol string, falling through to `lookahead` when the
    /// whole string can derive nothing.
    fn first_of(&self, symbols: &[Symbol], lookahead: Lookahead) -> BTreeSet<Lookahead> {
        let mut out = BTreeSet::new();
        for sym in symbols {
            match *sym {
                Symbol::Terminal(t) => {
                    out.insert(Some(t));
                    return out;
                }
                Symbol::Nonterminal(n) => {
                    out.extend(self.first[n.0 as usize].iter().map(|&t| Some(t)));
                    if !self.nullable[n.0 as usize] {
                        return out;
                    }
                }
            }
        }
        out.insert(lookahead);
        out
    }

    fn closure(&self, items: &mut BTreeSet<Item>) {
        let mut queue: Vec<Item> = items.iter().copied().collect();
        while let Some(item) = queue.pop() {
            let rhs = self.rhs(item.rule);
            let Some(&Symbol::Nonterminal(n)) = rhs.get(item.dot) else {
                continue;
            };
            let follow = self.first_of(&rhs[item.dot + 1..], item.lookahead);
            for &rule in &self.rules_of[n.0 as usize] {
                for &lookahead in &follow {
                    let new = Item { rule, dot: 0, lookahead };
                    if items.insert(new) {
                        queue.push(new);
                    }
                }
            }
        }
    }

    fn build(self) -> LrGraph {
        let aug = self.grammar.rules().len();
        let mut start = BTreeSet::new();
        start.insert(Item { rule: aug, dot: 0, lookahead: None });
        self.closure(&mut start);

        let mut index: FxHashMap<Vec<Item>, u32> = FxHashMap::default();
        index.insert(start.iter().copied().collect(), 0);
        let mut states: Vec<BTreeSet<Item>> = vec![start];
        let mut transitions: FxHashMap<(u32, Symbol), u32> = FxHashMap::default();

        let mut current = 0usize;
        while current < states.len() {
            let mut kernels: BTreeMap<Symbol, BTreeSet<Item>> = BTreeMap::new();
            for &item in &states[current] {
                if let Some(&sym) = self.rhs(item.rule).get(item.dot) {
                    kernels.entry(sym).or_default().insert(Item { dot: item.dot + 1, ..item });
                }
            }
            for (sym, mut kernel) in kernels {
                self.closure(&mut kernel);
                let key: Vec<Item> = kernel.iter().copied().collect();
                let target = match index.get(&key) {
                    Some(&target) => target,
                    None => {
                        let target = states.len() as u32;
                        index.insert(key, target);
                        states.push(kernel);
                        target
                    }
                };
                transitions.insert((current as u32, sym), target);
            }
            current += 1;
        }

        let mut conflicts: BTreeSet<Nonterminal> = BTreeSet::new();
        let mut actions = Vec::with_capacity(states.len());
        for (s, items) in states.iter().enumerate() {
            let mut candidates: FxHashMap<Lookahead, Vec<RawAction>> = FxHashMap::default();
            for &item in items {
                let rhs = self.rhs(item.rule);
                if item.dot == rhs.len() {
                    if item.rule == aug {
                        add_candidate(&mut candidates, None, RawAction::Accept);
                    } else {
                        add_candidate(
                            &mut candidates,
                            item.lookahead,
                            RawAction::Reduce(item.rule),
                        );
                    }
                } else if let Symbol::Terminal(t) = rhs[item.dot] {
                    let target = transitions[&(s as u32, Symbol::Terminal(t))];
                    add_candidate(&mut candidates, Some(t), RawAction::Shift(target));
                }
            }
            let mut table = FxHashMap::default();
            for (lookahead, list) in candidates {
                if let [action] = list[..] {
                    table.insert(lookahead, action);
                } else {
                    for action in &list {
                        if let RawAction::Reduce(rule) = action {
                            conflicts.insert(self.grammar.rules()[*rule].lhs);
                        }
                    }
                }
            }
            actions.push(table);
        }

        LrGraph { transitions, actions, conflicts: conflicts.into_iter().collect() }
    }
}

fn add_candidate(
    map: &mut FxHashMap<Lookahead, Vec<RawAction>>,
    lookahead: Lookahead,
    action: RawAction,
) {
    let list = map.entry(lookahead).or_default();
    if !list.contains(&action) {
        list.push(action);
    }
}

fn first_sets(grammar: &Grammar) -> (Vec<bool>, Vec<BTreeSet<Terminal>>) {
    let n = grammar.nonterminal_count() as usize;
    let mut nullable = vec![false; n];
    let mut first: Vec<BTreeSet<Terminal>> = vec![BTreeSet::new(); n];
    loop {
        let mut changed = false;
        for rule in grammar.rules() {
            let lhs = rule.lhs.0 as usize;
            let mut rhs_nullable = true;
            for sym in &rule.rhs {
                match *sym {
                    Symbol::Terminal(t) => {
                        changed |= first[lhs].insert(t);
                        rhs_nullable = false;
                        break;
                    }
                    Symbol::Nonterminal(m) => {
                        let m = m.0 as usize;
                        if m != lhs {
                            let inherited: Vec<Terminal> = first[m].iter().copied().collect();
                            for t in inherited {
                                changed |= first[lhs].insert(t);
                            }
                        }
                        if !nullable[m] {
                            rhs_nullable = false;
                            break;
                        }
                    }
                }
            }
            if rhs_nullable && !nullable[lhs] {
                nullable[lhs] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    (nullable, first)
}
