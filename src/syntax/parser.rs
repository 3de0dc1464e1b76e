//! Parse adapter exposing the tree builder as an editor parser.

use std::ops::Range;
use std::sync::Arc;

use super::builder::{BuildError, TreeBuilder};
use super::node_type::NodeTypeRegistry;
use super::tree::{SyntaxTree, TokenSpan};

/// Source of pre-order token spans for a document.
///
/// Implementations must be deterministic for a given input.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<TokenSpan>;
}

impl<T: Tokenizer + ?Sized> Tokenizer for Box<T> {
    fn tokenize(&self, text: &str) -> Vec<TokenSpan> {
        (**self).tokenize(text)
    }
}

/// Adapts a plain function into a [`Tokenizer`].
#[derive(Debug, Clone, Copy)]
pub struct FnTokenizer(pub fn(&str) -> Vec<TokenSpan>);

impl Tokenizer for FnTokenizer {
    fn tokenize(&self, text: &str) -> Vec<TokenSpan> {
        (self.0)(text)
    }
}

/// A reusable piece of a previous tree, as handed over by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFragment {
    pub from: usize,
    pub to: usize,
    pub offset: isize,
}

/// Result of [`ParseAdapter::parse_incremental`].
///
/// The parse has already finished when this is returned; `advance` hands out
/// the tree once.
#[derive(Debug)]
pub struct PartialParse {
    tree: Option<SyntaxTree>,
    parsed_pos: usize,
    stopped_at: Option<usize>,
}

impl PartialParse {
    /// Offset up to which the input has been consumed. Always the full input.
    pub const fn parsed_pos(&self) -> usize {
        self.parsed_pos
    }

    /// Where the parse stopped. Always the end of the input.
    pub const fn stopped_at(&self) -> Option<usize> {
        self.stopped_at
    }

    /// Accepted for compatibility; the parse is already complete.
    pub fn stop_at(&mut self, _pos: usize) {}

    pub fn advance(&mut self) -> Option<SyntaxTree> {
        self.tree.take()
    }
}

/// Runs a [`Tokenizer`] and builds the resulting tree.
pub struct ParseAdapter<T> {
    tokenizer: T,
    registry: Arc<NodeTypeRegistry>,
}

impl<T: Tokenizer> ParseAdapter<T> {
    pub const fn new(tokenizer: T, registry: Arc<NodeTypeRegistry>) -> Self {
        Self {
            tokenizer,
            registry,
        }
    }

    pub fn registry(&self) -> &NodeTypeRegistry {
        &self.registry
    }

    /// Tokenize and build the whole document.
    ///
    /// # Errors
    /// Propagates [`BuildError`] from the builder unchanged.
    pub fn parse_whole(&self, text: &str) -> Result<SyntaxTree, BuildError> {
        let _scope = crate::perf::scope("parse.whole");
        let spans = self.tokenizer.tokenize(text);
        let result = TreeBuilder::new(&self.registry).build(&spans, text.len());
        match &result {
            Ok(tree) => tracing::debug!(
                nodes = tree.node_count(),
                len = text.len(),
                "parsed document"
            ),
            Err(err) => tracing::warn!(%err, spans = spans.len(), "tokenizer output rejected"),
        }
        result
    }

    /// Entry point for editors that expect incremental parsing.
    ///
    /// Fragments and edited ranges are ignored: this is a full re-parse that
    /// always reports the whole input as consumed.
    ///
    /// # Errors
    /// Same as [`ParseAdapter::parse_whole`].
    pub fn parse_incremental(
        &self,
        text: &str,
        _fragments: &[TreeFragment],
        _ranges: &[Range<usize>],
    ) -> Result<PartialParse, BuildError> {
        let tree = self.parse_whole(text)?;
        Ok(PartialParse {
            tree: Some(tree),
            parsed_pos: text.len(),
            stopped_at: Some(text.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builder::Malformation;
    use crate::syntax::node_type::org;

    fn adapter<T: Tokenizer>(tokenizer: T) -> ParseAdapter<T> {
        ParseAdapter::new(tokenizer, Arc::new(NodeTypeRegistry::org().unwrap()))
    }

    fn one_paragraph(text: &str) -> Vec<TokenSpan> {
        if text.is_empty() {
            Vec::new()
        } else {
            vec![TokenSpan::leaf(org::PARAGRAPH, 0, text.len())]
        }
    }

    #[test]
    fn test_parse_whole_empty_document() {
        let tree = adapter(FnTokenizer(one_paragraph)).parse_whole("").unwrap();
        assert_eq!(tree.root().range, 0..0);
        assert!(tree.root().children().is_empty());
    }

    #[test]
    fn test_parse_whole_is_deterministic() {
        let parser = adapter(FnTokenizer(one_paragraph));
        let a = parser.parse_whole("hello").unwrap();
        let b = parser.parse_whole("hello").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_incremental_matches_whole_and_consumes_everything() {
        let parser = adapter(FnTokenizer(one_paragraph));
        let text = "some text";
        let fragments = [TreeFragment {
            from: 0,
            to: 4,
            offset: 0,
        }];
        let mut partial = parser
            .parse_incremental(text, &fragments, &[2..3])
            .unwrap();
        assert_eq!(partial.parsed_pos(), text.len());
        partial.stop_at(2);
        assert_eq!(partial.stopped_at(), Some(text.len()));
        let tree = partial.advance().unwrap();
        assert_eq!(tree, parser.parse_whole(text).unwrap());
        assert!(partial.advance().is_none());
    }

    #[test]
    fn test_malformed_output_propagates() {
        let parser = adapter(FnTokenizer(|text| {
            vec![TokenSpan::leaf(org::PARAGRAPH, 0, text.len() + 1)]
        }));
        let err = parser.parse_whole("abc").unwrap_err();
        assert_eq!(
            err,
            BuildError::MalformedTokenStream {
                index: 0,
                reason: Malformation::OutOfBounds { end: 4, len: 3 },
            }
        );
        assert!(parser.parse_incremental("abc", &[], &[]).is_err());
    }

    #[test]
    fn test_boxed_tokenizer() {
        let boxed: Box<dyn Tokenizer> = Box::new(FnTokenizer(one_paragraph));
        let tree = adapter(boxed).parse_whole("x").unwrap();
        assert_eq!(tree.node_count(), 2);
    }
}
