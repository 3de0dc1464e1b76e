//! Syntax trees rebuilt from the tokenizer's flat span buffer.
//!
//! This module handles:
//! - The node type catalogue and its style tags
//! - Decoding pre-order token spans into a [`SyntaxTree`]
//! - The parser entry points the editor calls
//! - Style runs for highlighting

mod builder;
pub mod highlight;
pub mod node_type;
mod parser;
mod tree;

pub use builder::{BuildError, Malformation, TreeBuilder};
pub use highlight::{StyledRange, style_ranges};
pub use node_type::{NodeType, NodeTypeId, NodeTypeRegistry, RegistryError, StyleRule, StyleTag};
pub use parser::{FnTokenizer, ParseAdapter, PartialParse, Tokenizer, TreeFragment};
pub use tree::{
    Iter, SPAN_WORDS, SyntaxNode, SyntaxTree, TokenSpan, spans_from_postfix_words,
    spans_from_words, spans_to_words,
};
