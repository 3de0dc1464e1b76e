//! Flat-buffer tree builder.
//!
//! Decodes a pre-order span sequence into a [`SyntaxTree`] with an explicit
//! stack of open frames. Each frame carries the size budget its children have
//! not yet consumed; a frame closes when its budget reaches zero.

use std::fmt;

use thiserror::Error;

use super::node_type::{NodeTypeId, NodeTypeRegistry};
use super::tree::{SyntaxNode, SyntaxTree, TokenSpan};

/// Why a token stream was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformation {
    /// `start > end`.
    Inverted,
    /// `end` past the document length.
    OutOfBounds { end: usize, len: usize },
    /// A declared subtree size of zero.
    ZeroSize,
    /// A subtree larger than what remains of its parent's budget.
    SizeOverflow { size: usize, remaining: usize },
    /// The span leaves its parent's range.
    NotContained,
    /// The span starts before its previous sibling ends.
    Overlap,
    /// The type id is not in the registry.
    UnknownType(u32),
    /// A top-type span anywhere other than as the leading root span.
    MisplacedTop,
    /// The packed buffer is not a whole number of spans.
    TruncatedWords,
    /// A packed size that is not a non-zero multiple of the span width.
    MisalignedSize(usize),
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inverted => write!(f, "start is after end"),
            Self::OutOfBounds { end, len } => {
                write!(f, "end {end} is past the document length {len}")
            }
            Self::ZeroSize => write!(f, "subtree size is zero"),
            Self::SizeOverflow { size, remaining } => write!(
                f,
                "subtree size {size} exceeds the {remaining} spans left in its parent"
            ),
            Self::NotContained => write!(f, "span is not contained in its parent"),
            Self::Overlap => write!(f, "span overlaps its previous sibling"),
            Self::UnknownType(id) => write!(f, "unknown node type {id}"),
            Self::MisplacedTop => write!(f, "top node type below the root"),
            Self::TruncatedWords => write!(f, "buffer ends inside a span"),
            Self::MisalignedSize(words) => write!(f, "size of {words} words is misaligned"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("malformed token stream at span {index}: {reason}")]
    MalformedTokenStream { index: usize, reason: Malformation },
}

impl BuildError {
    const fn at(index: usize, reason: Malformation) -> Self {
        Self::MalformedTokenStream { index, reason }
    }
}

struct Frame {
    node: SyntaxNode,
    remaining: usize,
}

/// Builds trees against a fixed node type registry.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'r> {
    registry: &'r NodeTypeRegistry,
}

impl<'r> TreeBuilder<'r> {
    pub const fn new(registry: &'r NodeTypeRegistry) -> Self {
        Self { registry }
    }

    /// Build a tree whose root covers `[0, doc_len)`.
    ///
    /// Nothing is returned unless the whole stream is well-formed.
    ///
    /// # Errors
    /// Returns [`BuildError::MalformedTokenStream`] on the first span that
    /// breaks the range, containment or size invariants.
    pub fn build(&self, spans: &[TokenSpan], doc_len: usize) -> Result<SyntaxTree, BuildError> {
        let mut root = Frame {
            node: SyntaxNode::new(NodeTypeId::ROOT, 0..doc_len),
            remaining: spans.len(),
        };
        let mut open: Vec<Frame> = Vec::new();

        for (index, span) in spans.iter().enumerate() {
            self.check_span(index, span, doc_len)?;

            if self.registry.is_top(span.kind) {
                // The tokenizer may emit the document root explicitly; it must
                // come first and own the whole stream and the whole document.
                if index != 0 || span.size != spans.len() {
                    return Err(BuildError::at(index, Malformation::MisplacedTop));
                }
                if span.start != 0 || span.end != doc_len {
                    return Err(BuildError::at(index, Malformation::NotContained));
                }
                root.remaining -= 1;
                continue;
            }

            let parent = open.last_mut().unwrap_or(&mut root);
            if span.size > parent.remaining {
                return Err(BuildError::at(
                    index,
                    Malformation::SizeOverflow {
                        size: span.size,
                        remaining: parent.remaining,
                    },
                ));
            }
            if span.start < parent.node.range.start || span.end > parent.node.range.end {
                return Err(BuildError::at(index, Malformation::NotContained));
            }
            if parent
                .node
                .children
                .last()
                .is_some_and(|prev| span.start < prev.range.end)
            {
                return Err(BuildError::at(index, Malformation::Overlap));
            }
            parent.remaining -= span.size;

            let node = SyntaxNode::new(span.kind, span.start..span.end);
            if span.is_leaf() {
                parent.node.children.push(node);
            } else {
                open.push(Frame {
                    node,
                    remaining: span.size - 1,
                });
            }

            while open.last().is_some_and(|frame| frame.remaining == 0) {
                if let Some(done) = open.pop() {
                    open.last_mut()
                        .unwrap_or(&mut root)
                        .node
                        .children
                        .push(done.node);
                }
            }
        }

        // Every budget is carved out of the root's, which is the stream length.
        debug_assert!(open.is_empty());

        Ok(SyntaxTree::from_root(root.node))
    }

    fn check_span(&self, index: usize, span: &TokenSpan, doc_len: usize) -> Result<(), BuildError> {
        if self.registry.type_of(span.kind).is_none() {
            return Err(BuildError::at(
                index,
                Malformation::UnknownType(u32::from(span.kind.0)),
            ));
        }
        if span.start > span.end {
            return Err(BuildError::at(index, Malformation::Inverted));
        }
        if span.end > doc_len {
            return Err(BuildError::at(
                index,
                Malformation::OutOfBounds {
                    end: span.end,
                    len: doc_len,
                },
            ));
        }
        if span.size == 0 {
            return Err(BuildError::at(index, Malformation::ZeroSize));
        }
        Ok(())
    }
}
