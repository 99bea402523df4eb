use serde::Serialize;

/// Handle of a grammar nonterminal. Opaque; allocated by
/// [`Grammar::nonterminal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Nonterminal(pub(crate) u32);

/// Handle of a grammar terminal. Opaque; allocated by [`Grammar::terminal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Terminal(pub(crate) u32);

/// A grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Symbol {
    Terminal(Terminal),
    Nonterminal(Nonterminal),
}

impl From<Terminal> for Symbol {
    fn from(t: Terminal) -> Self {
        Symbol::Terminal(t)
    }
}

impl From<Nonterminal> for Symbol {
    fn from(n: Nonterminal) -> Self {
        Symbol::Nonterminal(n)
    }
}

/// A lookahead: a terminal, or `None` for the end-of-input terminal.
pub type Lookahead = Option<Terminal>;

/// One production `lhs → rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub lhs: Nonterminal,
    pub rhs: Vec<Symbol>,
}

/// A context-free grammar over opaque symbol handles.
///
/// Handles are dense indexes allocated by the grammar itself; whatever naming
/// scheme the caller has stays on the caller's side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Grammar {
    rules: Vec<Rule>,
    start: Option<Nonterminal>,
    nonterminals: u32,
    terminals: u32,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh nonterminal handle.
    pub fn nonterminal(&mut self) -> Nonterminal {
        let handle = Nonterminal(self.nonterminals);
        self.nonterminals += 1;
        handle
    }

    /// Allocate a fresh terminal handle.
    pub fn terminal(&mut self) -> Terminal {
        let handle = Terminal(self.terminals);
        self.terminals += 1;
        handle
    }

    /// Add the production `lhs → rhs`.
    pub fn rule(&mut self, lhs: Nonterminal, rhs: Vec<Symbol>) {
        self.rules.push(Rule { lhs, rhs });
    }

    /// Designate the start nonterminal.
    pub fn set_start(&mut self, start: Nonterminal) {
        self.start = Some(start);
    }

    /// The start nonterminal.
    ///
    /// # Panics
    ///
    /// Panics if no start was set.
    pub fn start(&self) -> Nonterminal {
        self.start.expect("grammar start symbol not set")
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn nonterminal_count(&self) -> u32 {
        self.nonterminals
    }

    pub fn terminal_count(&self) -> u32 {
        self.terminals
    }
}
