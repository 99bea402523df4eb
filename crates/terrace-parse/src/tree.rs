use serde::Serialize;

use terrace_text::{Position, Span, Text, TextModel};

/// The three kinds of parse-tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TreeKind<T> {
    /// A node carrying a user-defined label.
    Labeled(T),
    /// An unlabeled grouping node, collapsed away by [`ResultTree::prune`].
    Structural,
    /// A transient node, removed from finished trees by [`ResultTree::join`].
    Discarded,
}

/// A parse-tree node: a kind, a source span, and ordered children.
///
/// Children spans are non-decreasing and lie within the parent span; a
/// finished tree never stores `Discarded` children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTree<T> {
    pub kind: TreeKind<T>,
    pub span: Span,
    pub children: Vec<ResultTree<T>>,
}

impl<T> ResultTree<T> {
    /// A node with no children.
    pub fn leaf(kind: TreeKind<T>, span: Span) -> Self {
        Self { kind, span, children: Vec::new() }
    }

    /// Build a node from ordered children.
    ///
    /// The span defaults to first child's start and last child's end;
    /// `start` / `end` override either edge (and are required when `children`
    /// is empty). `Discarded` children are dropped from the produced node.
    ///
    /// # Panics
    ///
    /// Panics when an edge is underdetermined, or when the children overlap
    /// each other or fall outside the computed span.
    pub fn join(
        children: Vec<ResultTree<T>>,
        kind: TreeKind<T>,
        start: Option<Position>,
        end: Option<Position>,
    ) -> Self {
        let start = start.unwrap_or_else(|| {
            children
                .first()
                .expect("cannot join zero results without a start position")
                .span
                .start
        });
        let end = end.unwrap_or_else(|| {
            children
                .last()
                .expect("cannot join zero results without an end position")
                .span
                .end
        });
        let mut cursor = start;
        for child in &children {
            if child.span.start < cursor {
                panic!("child span {} begins before position {cursor}", child.span);
            }
            cursor = child.span.end;
        }
        if end < cursor {
            panic!("span end {end} lies before the last child end {cursor}");
        }
        let children = children
            .into_iter()
            .filter(|child| !matches!(child.kind, TreeKind::Discarded))
            .collect();
        Self { kind, span: Span::new(start, end), children }
    }

    /// The node's label, when it has one.
    pub fn label(&self) -> Option<&T> {
        match &self.kind {
            TreeKind::Labeled(label) => Some(label),
            _ => None,
        }
    }

    /// Reduce to labeled nodes only.
    ///
    /// Structural nodes dissolve, promoting their labeled descendants;
    /// discarded nodes vanish. Idempotent.
    pub fn prune(&self) -> Vec<ResultTree<T>>
    where
        T: Clone,
    {
        match &self.kind {
            TreeKind::Labeled(_) => {
                let children = self.children.iter().flat_map(ResultTree::prune).collect();
                vec![ResultTree { kind: self.kind.clone(), span: self.span, children }]
            }
            TreeKind::Structural => self.children.iter().flat_map(ResultTree::prune).collect(),
            TreeKind::Discarded => Vec::new(),
        }
    }

    /// The topmost labeled nodes matching `pred`, found by entering
    /// structural nodes transparently. Does not descend into labeled nodes.
    pub fn select(&self, pred: impl Fn(&T) -> bool) -> Vec<&ResultTree<T>> {
        let mut found = Vec::new();
        self.select_into(&pred, &mut found);
        found
    }

    fn select_into<'a>(&'a self, pred: &impl Fn(&T) -> bool, found: &mut Vec<&'a ResultTree<T>>) {
        match &self.kind {
            TreeKind::Labeled(label) => {
                if pred(label) {
                    found.push(self);
                }
            }
            TreeKind::Structural => {
                for child in &self.children {
                    child.select_into(pred, found);
                }
            }
            TreeKind::Discarded => {}
        }
    }

    /// Like [`select`], but panics unless exactly one node matches.
    ///
    /// [`select`]: ResultTree::select
    pub fn select_unique(&self, pred: impl Fn(&T) -> bool) -> &ResultTree<T> {
        let found = self.select(pred);
        if found.len() != 1 {
            panic!("ambiguous selection: {} matches", found.len());
        }
        found[0]
    }

    /// Every labeled node matching `pred`, at any depth.
    pub fn collect(&self, pred: impl Fn(&T) -> bool) -> Vec<&ResultTree<T>> {
        let mut found = Vec::new();
        self.collect_into(&pred, &mut found);
        found
    }

    fn collect_into<'a>(&'a self, pred: &impl Fn(&T) -> bool, found: &mut Vec<&'a ResultTree<T>>) {
        match &self.kind {
            TreeKind::Labeled(label) => {
                if pred(label) {
                    found.push(self);
                }
                for child in &self.children {
                    child.collect_into(pred, found);
                }
            }
            TreeKind::Structural => {
                for child in &self.children {
                    child.collect_into(pred, found);
                }
            }
            TreeKind::Discarded => {}
        }
    }

    /// Like [`collect`], but panics unless exactly one node matches.
    ///
    /// [`collect`]: ResultTree::collect
    pub fn collect_unique(&self, pred: impl Fn(&T) -> bool) -> &ResultTree<T> {
        let found = self.collect(pred);
        if found.len() != 1 {
            panic!("ambiguous selection: {} matches", found.len());
        }
        found[0]
    }

    /// The source text covered by this node.
    pub fn text_of(&self, model: &dyn TextModel) -> String {
        model.slice(self.span)
    }

    /// The source lines covered by this node, trimmed to its span.
    pub fn text_lines_of(&self, model: &dyn TextModel) -> Vec<Text> {
        model.slice_lines(self.span)
    }
}
