//! Extended JSON text
//!
//! A human-readable rendering of a [`Tree`] in which components appear in
//! their token form instead of underscore-quoted strings: `Gene`, `[3]`,
//! `2020-01-02T00:00:00Z`. Tuple keys render in parentheses. The output
//! is for display and logging; it is not read back.

use crate::tree::Tree;
use std::fmt::{self, Write};

const INDENT: usize = 4;

/// Render a tree as indented extended JSON text.
pub fn to_extended_text(tree: &Tree) -> String {
    let mut out = String::new();
    // fmt::Write on String never fails
    let _ = write_tree(&mut out, tree, 0);
    out
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    out.extend(std::iter::repeat(' ').take(depth));
}

fn write_tree(out: &mut String, tree: &Tree, depth: usize) -> fmt::Result {
    match tree {
        Tree::Scalar(c) => write!(out, "{c}"),
        Tree::Tuple(t) => {
            out.push('[');
            for (i, c) in t.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write!(out, "{c}")?;
            }
            out.push(']');
            Ok(())
        }
        Tree::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth + INDENT);
                write_tree(out, item, depth + INDENT)?;
            }
            if !items.is_empty() {
                newline(out, depth);
            }
            out.push(']');
            Ok(())
        }
        Tree::Map(map) => {
            out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth + INDENT);
                write!(out, "{key}")?;
                out.push_str(" : ");
                write_tree(out, value, depth + INDENT)?;
            }
            if !map.is_empty() {
                newline(out, depth);
            }
            out.push('}');
            Ok(())
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_extended_text(self))
    }
}
