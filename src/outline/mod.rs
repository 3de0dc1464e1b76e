//! Line-level stand-in for the external Org tokenizer and exporter.
//!
//! Recognizes headings, keywords, comments, plain lists, tables and
//! paragraphs by their first characters, plus flat inline markup and links.
//! It exists so the shell and its tests have a real collaborator; it is not
//! an Org lexer.

use std::ops::Range;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::export::{ExportError, ExportKind, Exporter};
use crate::syntax::node_type::org;
use crate::syntax::{NodeTypeId, NodeTypeRegistry, SyntaxNode, TokenSpan, Tokenizer, TreeBuilder};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*+)\s+").expect("valid heading pattern"));
static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\+\S*:").expect("valid keyword pattern"));
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#(?:\s|$)").expect("valid comment pattern"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-+]|\d+[.)])\s+").expect("valid list pattern"));
static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|").expect("valid table pattern"));
static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<link>\[\[[^\]\n]+\](?:\[[^\]\n]+\])?\])",
        r"|(?P<plain>https?://[^\s\]>]+)",
        r"|(?P<bold>\*[^\s*](?:[^*\n]*[^\s*])?\*)",
        r"|(?P<italic>/[^\s/](?:[^/\n]*[^\s/])?/)",
        r"|(?P<underline>_[^\s_](?:[^_\n]*[^\s_])?_)",
        r"|(?P<verbatim>=[^\s=](?:[^=\n]*[^\s=])?=)",
        r"|(?P<code>~[^\s~](?:[^~\n]*[^\s~])?~)",
        r"|(?P<strike>\+[^\s+](?:[^+\n]*[^\s+])?\+)",
    ))
    .expect("valid inline pattern")
});

const INLINE_KINDS: [(&str, NodeTypeId); 8] = [
    ("link", org::REGULAR_LINK),
    ("plain", org::PLAIN_LINK),
    ("bold", org::BOLD),
    ("italic", org::ITALIC),
    ("underline", org::UNDERLINE),
    ("verbatim", org::VERBATIM),
    ("code", org::CODE),
    ("strike", org::STRIKETHROUGH),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    /// Byte offset of the title within the line.
    Heading(usize),
    Keyword,
    Comment,
    /// Byte offset of the item text within the line.
    ListItem(usize),
    TableRow,
    Text,
}

impl LineKind {
    fn classify(line: &str) -> Self {
        if line.trim().is_empty() {
            Self::Blank
        } else if let Some(m) = HEADING.find(line) {
            Self::Heading(m.end())
        } else if KEYWORD.is_match(line) {
            Self::Keyword
        } else if COMMENT.is_match(line) {
            Self::Comment
        } else if let Some(m) = LIST_ITEM.find(line) {
            Self::ListItem(m.end())
        } else if TABLE_ROW.is_match(line) {
            Self::TableRow
        } else {
            Self::Text
        }
    }

    const fn groups_with(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::ListItem(_), Self::ListItem(_))
                | (Self::TableRow, Self::TableRow)
                | (Self::Text, Self::Text)
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    end: usize,
    kind: LineKind,
}

/// Lines of `text` with byte ranges excluding the line terminator.
fn split_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for raw in text.split_inclusive('\n') {
        let content = raw.trim_end_matches(['\n', '\r']);
        lines.push(Line {
            start,
            end: start + content.len(),
            kind: LineKind::classify(content),
        });
        start += raw.len();
    }
    lines
}

/// Emits headings, lists, tables and paragraphs with flat inline children.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineTokenizer;

impl Tokenizer for OutlineTokenizer {
    fn tokenize(&self, text: &str) -> Vec<TokenSpan> {
        let lines = split_lines(text);
        let mut spans = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            match line.kind {
                LineKind::Blank => {
                    i += 1;
                }
                LineKind::Heading(title) => {
                    emit_block(
                        text,
                        org::HEADING,
                        line.start..line.end,
                        &[line.start + title..line.end],
                        &mut spans,
                    );
                    i += 1;
                }
                LineKind::Keyword => {
                    spans.push(TokenSpan::leaf(org::KEYWORD, line.start, line.end));
                    i += 1;
                }
                LineKind::Comment => {
                    spans.push(TokenSpan::leaf(org::COMMENT, line.start, line.end));
                    i += 1;
                }
                LineKind::ListItem(_) | LineKind::TableRow | LineKind::Text => {
                    let mut j = i + 1;
                    while j < lines.len() && lines[j].kind.groups_with(line.kind) {
                        j += 1;
                    }
                    let group = &lines[i..j];
                    let range = line.start..group[group.len() - 1].end;
                    let areas: Vec<Range<usize>> = group
                        .iter()
                        .filter_map(|l| match l.kind {
                            LineKind::ListItem(body) => Some(l.start + body..l.end),
                            LineKind::Text => Some(l.start..l.end),
                            _ => None,
                        })
                        .collect();
                    let kind = match line.kind {
                        LineKind::ListItem(_) => org::LIST,
                        LineKind::TableRow => org::TABLE,
                        _ => org::PARAGRAPH,
                    };
                    emit_block(text, kind, range, &areas, &mut spans);
                    i = j;
                }
            }
        }
        spans
    }
}

fn emit_block(
    text: &str,
    kind: NodeTypeId,
    range: Range<usize>,
    areas: &[Range<usize>],
    spans: &mut Vec<TokenSpan>,
) {
    let at = spans.len();
    spans.push(TokenSpan::leaf(kind, range.start, range.end));
    for area in areas {
        for caps in INLINE.captures_iter(&text[area.clone()]) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(&(_, inline)) = INLINE_KINDS
                .iter()
                .find(|(name, _)| caps.name(name).is_some())
            else {
                continue;
            };
            spans.push(TokenSpan::leaf(
                inline,
                area.start + whole.start(),
                area.start + whole.end(),
            ));
        }
    }
    spans[at].size = spans.len() - at;
}

/// Org and HTML exports over [`OutlineTokenizer`] trees.
pub struct OutlineExporter {
    registry: Arc<NodeTypeRegistry>,
}

impl OutlineExporter {
    pub const fn new(registry: Arc<NodeTypeRegistry>) -> Self {
        Self { registry }
    }
}

impl Exporter for OutlineExporter {
    fn export(
        &mut self,
        kind: ExportKind,
        input: &str,
        out: &mut String,
    ) -> Result<(), ExportError> {
        match kind {
            ExportKind::Markup => {
                let lines: Vec<&str> = input.lines().map(str::trim_end).collect();
                let kept = lines.iter().rposition(|l| !l.is_empty()).map_or(0, |i| i + 1);
                for line in &lines[..kept] {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            ExportKind::Html => {
                let spans = OutlineTokenizer.tokenize(input);
                let tree = TreeBuilder::new(&self.registry)
                    .build(&spans, input.len())
                    .map_err(|err| ExportError {
                        kind,
                        message: err.to_string(),
                    })?;
                for block in tree.root().children() {
                    write_block(input, block, out);
                }
            }
        }
        Ok(())
    }
}

fn write_block(input: &str, block: &SyntaxNode, out: &mut String) {
    let src = &input[block.range.clone()];
    match block.kind {
        org::HEADING => {
            let level = src.bytes().take_while(|b| *b == b'*').count().clamp(1, 6);
            let title = HEADING.find(src).map_or(0, |m| m.end());
            out.push_str(&format!("<h{level}>"));
            write_inline(input, block.start() + title..block.end(), block.children(), out);
            out.push_str(&format!("</h{level}>\n"));
        }
        org::PARAGRAPH => {
            out.push_str("<p>");
            write_inline(input, block.range.clone(), block.children(), out);
            out.push_str("</p>\n");
        }
        org::LIST => {
            out.push_str("<ul>\n");
            for line in split_lines(src) {
                let LineKind::ListItem(body) = line.kind else {
                    continue;
                };
                let area = block.start() + line.start + body..block.start() + line.end;
                out.push_str("<li>");
                write_inline(input, area, block.children(), out);
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n");
        }
        org::TABLE => {
            out.push_str("<pre>");
            escape_into(src, out);
            out.push_str("</pre>\n");
        }
        _ => {}
    }
}

fn write_inline(input: &str, area: Range<usize>, children: &[SyntaxNode], out: &mut String) {
    let mut cursor = area.start;
    for child in children
        .iter()
        .filter(|c| c.start() >= area.start && c.end() <= area.end)
    {
        escape_into(&input[cursor..child.start()], out);
        write_markup(&input[child.range.clone()], child.kind, out);
        cursor = child.end();
    }
    escape_into(&input[cursor..area.end], out);
}

fn write_markup(src: &str, kind: NodeTypeId, out: &mut String) {
    let tag = match kind {
        org::REGULAR_LINK => {
            let inner = &src[2..src.len() - 2];
            let (target, desc) = inner.split_once("][").unwrap_or((inner, inner));
            write_link(target, desc, out);
            return;
        }
        org::PLAIN_LINK => {
            write_link(src, src, out);
            return;
        }
        org::BOLD => "b",
        org::ITALIC => "i",
        org::UNDERLINE => "u",
        org::VERBATIM | org::CODE => "code",
        org::STRIKETHROUGH => "del",
        _ => {
            escape_into(src, out);
            return;
        }
    };
    out.push_str(&format!("<{tag}>"));
    escape_into(&src[1..src.len() - 1], out);
    out.push_str(&format!("</{tag}>"));
}

fn write_link(target: &str, desc: &str, out: &mut String) {
    out.push_str("<a href=\"");
    escape_into(target, out);
    out.push_str("\">");
    escape_into(desc, out);
    out.push_str("</a>");
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<NodeTypeRegistry> {
        Arc::new(NodeTypeRegistry::org().unwrap())
    }

    fn outline(text: &str) -> String {
        let registry = registry();
        let spans = OutlineTokenizer.tokenize(text);
        TreeBuilder::new(&registry)
            .build(&spans, text.len())
            .unwrap()
            .to_outline(&registry)
    }

    fn html(text: &str) -> String {
        let mut out = String::new();
        OutlineExporter::new(registry())
            .export(ExportKind::Html, text, &mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_empty_text_has_no_spans() {
        assert!(OutlineTokenizer.tokenize("").is_empty());
        assert!(OutlineTokenizer.tokenize("\n\n").is_empty());
    }

    #[test]
    fn test_block_kinds() {
        let text = "#+TITLE: doc\n* Head\n# note\n\ntext line\nmore\n- a\n- b\n| x |\n";
        assert_eq!(
            outline(text),
            "topNode(keyword,heading,comment,paragraph,list,table)"
        );
    }

    #[test]
    fn test_inline_children_nest_under_blocks() {
        let text = "* A *big* title\nsee [[https://x.org][site]] and /this/\n";
        assert_eq!(
            outline(text),
            "topNode(heading(bold),paragraph(regularlink,italic))"
        );
    }

    #[test]
    fn test_span_ranges_and_sizes() {
        let text = "para *b*\n";
        assert_eq!(
            OutlineTokenizer.tokenize(text),
            vec![
                TokenSpan::new(org::PARAGRAPH, 0, 8, 2),
                TokenSpan::leaf(org::BOLD, 5, 8),
            ]
        );
    }

    #[test]
    fn test_heading_stars_are_not_bold() {
        let spans = OutlineTokenizer.tokenize("** Two\n");
        assert_eq!(spans, vec![TokenSpan::leaf(org::HEADING, 0, 6)]);
    }

    #[test]
    fn test_html_export() {
        let text = "* Title\nhello *world* & [[https://a.b][link]]\n- one\n- /two/\n# hidden\n";
        assert_eq!(
            html(text),
            concat!(
                "<h1>Title</h1>\n",
                "<p>hello <b>world</b> &amp; <a href=\"https://a.b\">link</a></p>\n",
                "<ul>\n<li>one</li>\n<li><i>two</i></li>\n</ul>\n",
            )
        );
    }

    #[test]
    fn test_html_heading_level_and_plain_link() {
        assert_eq!(
            html("*** Deep https://example.com\n"),
            "<h3>Deep <a href=\"https://example.com\">https://example.com</a></h3>\n"
        );
    }

    #[test]
    fn test_markup_export_trims_trailing_whitespace() {
        let mut out = String::new();
        OutlineExporter::new(registry())
            .export(ExportKind::Markup, "* a  \n\nb\t\n\n\n", &mut out)
            .unwrap();
        assert_eq!(out, "* a\n\nb\n");
    }

    #[test]
    fn test_crlf_lines() {
        assert_eq!(outline("* a\r\nbody\r\n"), "topNode(heading,paragraph)");
    }
}
