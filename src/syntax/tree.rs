//! Token spans and the syntax tree built from them.

use std::fmt::Write as _;
use std::ops::Range;

use serde::Serialize;

use super::builder::{BuildError, Malformation};
use super::node_type::{NodeTypeId, NodeTypeRegistry};

/// Number of words one span occupies in the packed buffer.
pub const SPAN_WORDS: usize = 4;

/// One node of the tokenizer's flat pre-order output.
///
/// `size` counts the spans of the subtree rooted here, this span included, so
/// a leaf has `size == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenSpan {
    pub kind: NodeTypeId,
    pub start: usize,
    pub end: usize,
    pub size: usize,
}

impl TokenSpan {
    pub const fn new(kind: NodeTypeId, start: usize, end: usize, size: usize) -> Self {
        Self {
            kind,
            start,
            end,
            size,
        }
    }

    pub const fn leaf(kind: NodeTypeId, start: usize, end: usize) -> Self {
        Self::new(kind, start, end, 1)
    }

    pub const fn is_leaf(&self) -> bool {
        self.size == 1
    }
}

/// Decode a packed `[kind, start, end, size_in_words]` buffer laid out in
/// pre-order.
///
/// # Errors
/// Returns [`BuildError::MalformedTokenStream`] when the buffer length is not
/// a whole number of spans or a size is not a non-zero multiple of the span
/// width.
pub fn spans_from_words(words: &[u32]) -> Result<Vec<TokenSpan>, BuildError> {
    decode_words(words)
}

/// Decode a packed buffer laid out in postfix order, children before their
/// parent and the document root last, and reorder it into pre-order spans.
///
/// # Errors
/// Same as [`spans_from_words`], plus [`Malformation::SizeOverflow`] when a
/// subtree reaches back past the start of its parent or of the buffer.
pub fn spans_from_postfix_words(words: &[u32]) -> Result<Vec<TokenSpan>, BuildError> {
    let postfix = decode_words(words)?;
    let mut spans = Vec::with_capacity(postfix.len());
    // Subtree roots still to emit; the next one in document order is on top.
    let mut pending = Vec::new();
    push_postfix_roots(&postfix, 0..postfix.len(), &mut pending)?;
    while let Some(index) = pending.pop() {
        let span = postfix[index];
        spans.push(span);
        push_postfix_roots(&postfix, index + 1 - span.size..index, &mut pending)?;
    }
    Ok(spans)
}

/// Push the roots of the postfix forest in `range`, last root first.
fn push_postfix_roots(
    postfix: &[TokenSpan],
    range: Range<usize>,
    pending: &mut Vec<usize>,
) -> Result<(), BuildError> {
    let mut end = range.end;
    while end > range.start {
        let index = end - 1;
        let size = postfix[index].size;
        let remaining = end - range.start;
        if size > remaining {
            return Err(BuildError::MalformedTokenStream {
                index,
                reason: Malformation::SizeOverflow { size, remaining },
            });
        }
        pending.push(index);
        end -= size;
    }
    Ok(())
}

fn decode_words(words: &[u32]) -> Result<Vec<TokenSpan>, BuildError> {
    let chunks = words.chunks_exact(SPAN_WORDS);
    if !chunks.remainder().is_empty() {
        return Err(BuildError::MalformedTokenStream {
            index: words.len() / SPAN_WORDS,
            reason: Malformation::TruncatedWords,
        });
    }

    chunks
        .enumerate()
        .map(|(index, chunk)| {
            let size_words = chunk[3] as usize;
            if size_words == 0 || size_words % SPAN_WORDS != 0 {
                return Err(BuildError::MalformedTokenStream {
                    index,
                    reason: Malformation::MisalignedSize(size_words),
                });
            }
            let kind = u16::try_from(chunk[0]).map_err(|_| BuildError::MalformedTokenStream {
                index,
                reason: Malformation::UnknownType(chunk[0]),
            })?;
            Ok(TokenSpan::new(
                NodeTypeId(kind),
                chunk[1] as usize,
                chunk[2] as usize,
                size_words / SPAN_WORDS,
            ))
        })
        .collect()
}

/// Pack spans into the word buffer format read by [`spans_from_words`].
///
/// Offsets and sizes past `u32::MAX` saturate.
pub fn spans_to_words(spans: &[TokenSpan]) -> Vec<u32> {
    let word = |v: usize| u32::try_from(v).unwrap_or(u32::MAX);
    let mut words = Vec::with_capacity(spans.len() * SPAN_WORDS);
    for span in spans {
        words.push(u32::from(span.kind.0));
        words.push(word(span.start));
        words.push(word(span.end));
        words.push(word(span.size.saturating_mul(SPAN_WORDS)));
    }
    words
}

/// A typed node covering `range` of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxNode {
    pub kind: NodeTypeId,
    pub range: Range<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub const fn new(kind: NodeTypeId, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub const fn start(&self) -> usize {
        self.range.start
    }

    pub const fn end(&self) -> usize {
        self.range.end
    }

    /// Number of nodes in this subtree, this node included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// A syntax tree for one document revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxTree {
    root: SyntaxNode,
}

impl SyntaxTree {
    pub(crate) const fn from_root(root: SyntaxNode) -> Self {
        Self { root }
    }

    /// A tree with only the root, covering `[0, len)`.
    pub const fn empty(len: usize) -> Self {
        Self::from_root(SyntaxNode::new(NodeTypeId::ROOT, 0..len))
    }

    pub const fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub const fn len(&self) -> usize {
        self.root.range.end
    }

    pub const fn is_empty(&self) -> bool {
        self.root.range.end == 0
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.subtree_len()
    }

    /// Pre-order traversal yielding `(depth, node)`.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: vec![(0, &self.root)],
        }
    }

    /// The innermost node whose range contains `offset`.
    pub fn node_at(&self, offset: usize) -> Option<&SyntaxNode> {
        if !self.root.range.contains(&offset) {
            return None;
        }
        let mut node = &self.root;
        while let Some(child) = node.children.iter().find(|c| c.range.contains(&offset)) {
            node = child;
        }
        Some(node)
    }

    /// Re-encode the tree in pre-order, the root excluded.
    pub fn to_spans(&self) -> Vec<TokenSpan> {
        let mut spans = Vec::with_capacity(self.node_count().saturating_sub(1));
        for child in &self.root.children {
            push_spans(child, &mut spans);
        }
        spans
    }

    /// Compact s-expression dump such as `topNode(heading,paragraph(bold))`.
    pub fn to_outline(&self, registry: &NodeTypeRegistry) -> String {
        let mut out = String::new();
        write_outline(&self.root, registry, &mut out);
        out
    }
}

fn push_spans(node: &SyntaxNode, spans: &mut Vec<TokenSpan>) {
    spans.push(TokenSpan::new(
        node.kind,
        node.range.start,
        node.range.end,
        node.subtree_len(),
    ));
    for child in &node.children {
        push_spans(child, spans);
    }
}

fn write_outline(node: &SyntaxNode, registry: &NodeTypeRegistry, out: &mut String) {
    let _ = write!(out, "{}", registry.name_of(node.kind));
    if node.children.is_empty() {
        return;
    }
    out.push('(');
    for (i, child) in node.children.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_outline(child, registry, out);
    }
    out.push(')');
}

/// Pre-order iterator over a [`SyntaxTree`].
pub struct Iter<'a> {
    stack: Vec<(usize, &'a SyntaxNode)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a SyntaxNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}
