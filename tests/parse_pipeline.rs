use std::sync::Arc;

use orgpad::export::{ExportKind, Exporter, export_input};
use orgpad::outline::{OutlineExporter, OutlineTokenizer};
use orgpad::syntax::node_type::org;
use orgpad::syntax::{
    BuildError, FnTokenizer, Malformation, NodeTypeRegistry, ParseAdapter, SyntaxNode, TokenSpan,
    Tokenizer, TreeBuilder, spans_from_postfix_words, spans_from_words, spans_to_words,
};

const SAMPLE: &str = include_str!("fixtures/sample.org");

fn registry() -> Arc<NodeTypeRegistry> {
    Arc::new(NodeTypeRegistry::org().unwrap())
}

fn outline_parser() -> ParseAdapter<OutlineTokenizer> {
    ParseAdapter::new(OutlineTokenizer, registry())
}

fn assert_contained(node: &SyntaxNode) {
    let mut prev_end = node.start();
    for child in node.children() {
        assert!(child.start() >= prev_end, "siblings overlap at {}", child.start());
        assert!(child.end() <= node.end(), "child leaves parent at {}", child.end());
        assert!(child.start() <= child.end());
        prev_end = child.end();
        assert_contained(child);
    }
}

#[test]
fn test_sample_document_structure() {
    let parser = outline_parser();
    let tree = parser.parse_whole(SAMPLE).unwrap();
    assert_eq!(
        tree.to_outline(parser.registry()),
        concat!(
            "topNode(keyword,keyword,heading,",
            "paragraph(bold,italic,underline,verbatim,code,strikethrough),",
            "comment,heading,paragraph(regularlink,plainlink),",
            "heading,list(bold),heading,table,heading,paragraph)"
        )
    );
    assert_eq!(tree.len(), SAMPLE.len());
}

#[test]
fn test_sample_tree_respects_containment() {
    let tree = outline_parser().parse_whole(SAMPLE).unwrap();
    assert_contained(tree.root());
}

#[test]
fn test_tree_re_encodes_to_tokenizer_output() {
    let spans = OutlineTokenizer.tokenize(SAMPLE);
    let tree = outline_parser().parse_whole(SAMPLE).unwrap();
    assert_eq!(tree.to_spans(), spans);
    assert_eq!(tree.node_count(), spans.len() + 1);
}

#[test]
fn test_packed_words_build_the_same_tree() {
    let registry = registry();
    let spans = OutlineTokenizer.tokenize(SAMPLE);
    let words = spans_to_words(&spans);
    assert_eq!(words.len(), spans.len() * 4);

    let decoded = spans_from_words(&words).unwrap();
    let builder = TreeBuilder::new(&registry);
    assert_eq!(
        builder.build(&decoded, SAMPLE.len()).unwrap(),
        builder.build(&spans, SAMPLE.len()).unwrap()
    );
}

#[test]
fn test_postfix_buffer_with_root_builds_tree() {
    // "*a*\n" as bold, paragraph, then the document root.
    let words = [2, 0, 3, 4, 19, 0, 4, 8, 0, 0, 4, 12];
    let registry = registry();
    let spans = spans_from_postfix_words(&words).unwrap();
    let tree = TreeBuilder::new(&registry).build(&spans, 4).unwrap();
    assert_eq!(tree.to_outline(&registry), "topNode(paragraph(bold))");
    assert_eq!(tree.root().children()[0].children()[0].range, 0..3);

    // The same buffer over a longer document leaves the root short.
    assert_eq!(
        TreeBuilder::new(&registry).build(&spans, 6),
        Err(BuildError::MalformedTokenStream {
            index: 0,
            reason: Malformation::NotContained,
        })
    );
}

#[test]
fn test_postfix_words_of_sample_match_tokenizer_order() {
    let spans = OutlineTokenizer.tokenize(SAMPLE);
    let tree = outline_parser().parse_whole(SAMPLE).unwrap();
    let mut postfix = Vec::new();
    push_postfix(tree.root(), &mut postfix);
    let words = spans_to_words(&postfix);

    let mut decoded = spans_from_postfix_words(&words).unwrap();
    let root = decoded.remove(0);
    assert_eq!(root, TokenSpan::new(org::TOP, 0, SAMPLE.len(), spans.len() + 1));
    assert_eq!(decoded, spans);
}

fn push_postfix(node: &SyntaxNode, out: &mut Vec<TokenSpan>) -> usize {
    let mut size = 1;
    for child in node.children() {
        size += push_postfix(child, out);
    }
    out.push(TokenSpan::new(node.kind, node.start(), node.end(), size));
    size
}

#[test]
fn test_parsing_is_deterministic() {
    let parser = outline_parser();
    assert_eq!(
        parser.parse_whole(SAMPLE).unwrap(),
        parser.parse_whole(SAMPLE).unwrap()
    );
}

#[test]
fn test_empty_document() {
    let parser = outline_parser();
    let tree = parser.parse_whole("").unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree, parser.parse_whole("").unwrap());
}

#[test]
fn test_incremental_parse_is_a_full_parse() {
    let parser = outline_parser();
    let mut partial = parser.parse_incremental(SAMPLE, &[], &[3..9]).unwrap();
    assert_eq!(partial.parsed_pos(), SAMPLE.len());
    partial.stop_at(10);
    assert_eq!(partial.advance(), Some(parser.parse_whole(SAMPLE).unwrap()));
    assert_eq!(partial.advance(), None);
}

fn overlapping(_: &str) -> Vec<TokenSpan> {
    vec![
        TokenSpan::leaf(org::PARAGRAPH, 0, 5),
        TokenSpan::leaf(org::PARAGRAPH, 3, 8),
    ]
}

fn escaping_child(_: &str) -> Vec<TokenSpan> {
    vec![
        TokenSpan::new(org::PARAGRAPH, 0, 4, 2),
        TokenSpan::leaf(org::BOLD, 2, 6),
    ]
}

fn oversized(_: &str) -> Vec<TokenSpan> {
    vec![TokenSpan::new(org::LIST, 0, 4, 3), TokenSpan::leaf(org::BOLD, 0, 2)]
}

#[test]
fn test_malformed_streams_are_rejected_whole() {
    let cases: [(fn(&str) -> Vec<TokenSpan>, usize, Malformation); 3] = [
        (overlapping, 1, Malformation::Overlap),
        (escaping_child, 1, Malformation::NotContained),
        (
            oversized,
            0,
            Malformation::SizeOverflow {
                size: 3,
                remaining: 2,
            },
        ),
    ];
    for (tokenize, index, reason) in cases {
        let parser = ParseAdapter::new(FnTokenizer(tokenize), registry());
        assert_eq!(
            parser.parse_whole("0123456789"),
            Err(BuildError::MalformedTokenStream { index, reason })
        );
        assert!(parser.parse_incremental("0123456789", &[], &[]).is_err());
    }
}

#[test]
fn test_exports_of_sample() {
    let mut exporter = OutlineExporter::new(registry());
    let mut input = String::new();
    export_input(SAMPLE, &mut input);

    let mut html = String::new();
    exporter.export(ExportKind::Html, &input, &mut html).unwrap();
    assert!(html.contains("<h2>Links</h2>"));
    assert!(html.contains("<a href=\"https://orgmode.org\">the Org site</a>"));
    assert!(html.contains("<li>second item with <b>emphasis</b></li>"));
    assert!(html.contains("<pre>| name  | value |"));
    assert!(!html.contains("comment line"));
    assert!(!html.contains("#+TITLE"));

    let mut org_text = String::new();
    exporter
        .export(ExportKind::Markup, &input, &mut org_text)
        .unwrap();
    assert_eq!(org_text, SAMPLE);
}
