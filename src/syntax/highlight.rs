//! Style runs for the presentation layer.

use std::ops::Range;

use serde::Serialize;

use super::node_type::{NodeTypeRegistry, StyleTag};
use super::tree::{SyntaxNode, SyntaxTree};

/// A document range painted with one style tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledRange {
    pub range: Range<usize>,
    pub tag: StyleTag,
}

/// Collect the style runs for `tree`, ordered by start offset.
///
/// Inherited tags cover the node's whole range. Other tags only cover the
/// parts of the node not taken by its children.
pub fn style_ranges(tree: &SyntaxTree, registry: &NodeTypeRegistry) -> Vec<StyledRange> {
    let mut out = Vec::new();
    for (_, node) in tree.iter() {
        for rule in registry.style_tags_of(node.kind) {
            if rule.inherit {
                push_run(&mut out, node.range.clone(), rule.tag);
            } else {
                for gap in own_text(node) {
                    push_run(&mut out, gap, rule.tag);
                }
            }
        }
    }
    out.sort_by_key(|run| (run.range.start, run.range.end));
    out
}

fn push_run(out: &mut Vec<StyledRange>, range: Range<usize>, tag: StyleTag) {
    if !range.is_empty() {
        out.push(StyledRange { range, tag });
    }
}

/// Ranges of `node` not covered by any child.
fn own_text(node: &SyntaxNode) -> Vec<Range<usize>> {
    let mut gaps = Vec::new();
    let mut cursor = node.range.start;
    for child in node.children() {
        gaps.push(cursor..child.range.start);
        cursor = child.range.end;
    }
    gaps.push(cursor..node.range.end);
    gaps.retain(|gap| !gap.is_empty());
    gaps
}
