use std::fmt::{self, Write};

use terrace_text::TextModel;

use crate::tree::{ResultTree, TreeKind};

/// Render a tree, one node per line, pruning it first.
///
/// Each line is `"[LL:CC to LL:CC[<indent>   <name>"` with four spaces of
/// indent per depth level and coordinates zero-padded to two digits. A
/// childless labeled node on a single line additionally prints its source
/// text, `<name> = "<text>"`, unless `is_opaque` says otherwise.
pub fn print_result<T: Clone>(
    model: &dyn TextModel,
    tree: &ResultTree<T>,
    name_of: &dyn Fn(&T) -> String,
    is_opaque: &dyn Fn(&T) -> bool,
    out: &mut dyn Write,
) -> fmt::Result {
    for root in tree.prune() {
        print_node(model, &root, name_of, is_opaque, 0, out)?;
    }
    Ok(())
}

/// [`print_result`] into a fresh string.
pub fn result_to_string<T: Clone>(
    model: &dyn TextModel,
    tree: &ResultTree<T>,
    name_of: &dyn Fn(&T) -> String,
    is_opaque: &dyn Fn(&T) -> bool,
) -> String {
    let mut out = String::new();
    print_result(model, tree, name_of, is_opaque, &mut out)
        .expect("writing to a String cannot fail");
    out
}

fn print_node<T: Clone>(
    model: &dyn TextModel,
    node: &ResultTree<T>,
    name_of: &dyn Fn(&T) -> String,
    is_opaque: &dyn Fn(&T) -> bool,
    depth: usize,
    out: &mut dyn Write,
) -> fmt::Result {
    let TreeKind::Labeled(label) = &node.kind else {
        // Pruned trees hold labeled nodes only.
        return Ok(());
    };
    write!(out, "{}", node.span)?;
    for _ in 0..depth {
        out.write_str("    ")?;
    }
    out.write_str("   ")?;
    let atomic = node.children.is_empty() && node.span.start.line == node.span.end.line;
    if atomic && !is_opaque(label) {
        writeln!(out, "{} = \"{}\"", name_of(label), node.text_of(model))?;
    } else {
        writeln!(out, "{}", name_of(label))?;
    }
    for child in &node.children {
        print_node(model, child, name_of, is_opaque, depth + 1, out)?;
    }
    Ok(())
}
