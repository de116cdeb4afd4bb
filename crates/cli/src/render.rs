//! Text renderings of trees and token streams.

use std::fmt::Write as _;

use smali_syntax::error::escape_text;
use smali_syntax::{Node, Token};

/// Indented tree, one node per line: `Kind` for containers, `Kind 'text'`
/// for nodes built from a token.
pub(crate) fn tree(root: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, root, 0);
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match &node.token {
        Some(tok) => {
            let _ = writeln!(out, "{}{:?} '{}'", indent, node.kind, escape_text(&tok.text));
        }
        None => {
            let _ = writeln!(out, "{}{:?}", indent, node.kind);
        }
    }
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}

/// One token per line: `line:column Kind 'text'`.
pub(crate) fn tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for tok in tokens {
        let _ = writeln!(
            out,
            "{}:{}\t{:?}\t'{}'",
            tok.line,
            tok.column,
            tok.kind,
            escape_text(&tok.text)
        );
    }
    out
}
