//! Tree Module — Document node tree built from the Markdown parser.
//!
//! Responsibilities:
//! - Owned, immutable node tree (`MdNode`) with one variant per construct
//! - Folding pulldown-cmark's flat event stream into that tree
//! - Normalising the stream into a single shape: table head rows and body
//!   sections are explicit, list items always hold paragraphs, and task
//!   markers sit directly under their list item
//! - Turning bare URLs and email addresses in text into links

use linkify::{LinkFinder, LinkKind};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

// ============================================================================
// Node Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Heading { level: u8 },
    Paragraph,
    Text(String),
    Emphasis,
    Strong,
    Strikethrough,
    /// Inline code span.
    Code(String),
    FencedCode { info: String, literal: String },
    IndentedCode { literal: String },
    BulletList,
    OrderedList { start: u64 },
    ListItem,
    TaskMarker { checked: bool },
    BlockQuote,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell { header: bool },
    Link { destination: String, title: Option<String> },
    Image { destination: String, title: Option<String> },
    HtmlBlock(String),
    HtmlInline(String),
    ThematicBreak,
    SoftBreak,
    HardBreak,
    LinkReferenceDefinition { label: String, destination: String },
    /// Any construct without dedicated handling. Its children still render.
    Unknown,
}

impl NodeKind {
    /// Whether the node belongs inside a paragraph.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Text(_)
                | Self::Emphasis
                | Self::Strong
                | Self::Strikethrough
                | Self::Code(_)
                | Self::Link { .. }
                | Self::Image { .. }
                | Self::HtmlInline(_)
                | Self::SoftBreak
                | Self::HardBreak
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdNode {
    pub kind: NodeKind,
    pub children: Vec<MdNode>,
}

impl MdNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<MdNode>) -> Self {
        Self { kind, children }
    }

    pub fn text(literal: &str) -> Self {
        Self::new(NodeKind::Text(literal.to_string()))
    }

    pub fn first_child(&self) -> Option<&MdNode> {
        self.children.first()
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Markdown dialect: CommonMark plus GFM tables, strikethrough and task lists.
/// Bare URLs are linked after parsing by [`parse_document`].
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Parse Markdown source into a document tree.
pub fn parse_document(source: &str) -> MdNode {
    let mut parser = Parser::new_ext(source, parser_options());
    let mut builder = TreeBuilder::new();
    for event in parser.by_ref() {
        builder.push_event(event);
    }

    let mut definitions: Vec<(String, String)> = parser
        .reference_definitions()
        .iter()
        .map(|(label, def)| (label.to_string(), def.dest.to_string()))
        .collect();
    definitions.sort();
    for (label, destination) in definitions {
        builder.leaf(NodeKind::LinkReferenceDefinition { label, destination });
    }

    builder.finish()
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn non_empty(title: CowStr<'_>) -> Option<String> {
    (!title.is_empty()).then(|| title.to_string())
}

/// Stack of partially built nodes; index 0 is always the document.
struct TreeBuilder {
    stack: Vec<MdNode>,
    in_table_head: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![MdNode::new(NodeKind::Document)],
            in_table_head: false,
        }
    }

    fn top(&mut self) -> &mut MdNode {
        // index 0 is never popped
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn open(&mut self, kind: NodeKind) {
        self.stack.push(MdNode::new(kind));
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(mut node) = self.stack.pop() {
            if node.kind == NodeKind::ListItem {
                node.children = normalize_list_item(std::mem::take(&mut node.children));
            }
            self.top().children.push(node);
        }
    }

    fn leaf(&mut self, kind: NodeKind) {
        self.top().children.push(MdNode::new(kind));
    }

    fn push_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(end) => self.end(end),
            Event::Text(text) => self.text(&text),
            Event::Code(code) | Event::InlineMath(code) | Event::DisplayMath(code) => {
                self.leaf(NodeKind::Code(code.to_string()))
            }
            Event::Html(html) => self.html(&html),
            Event::InlineHtml(html) => self.leaf(NodeKind::HtmlInline(html.to_string())),
            Event::SoftBreak => self.leaf(NodeKind::SoftBreak),
            Event::HardBreak => self.leaf(NodeKind::HardBreak),
            Event::Rule => self.leaf(NodeKind::ThematicBreak),
            Event::TaskListMarker(checked) => self.leaf(NodeKind::TaskMarker { checked }),
            Event::FootnoteReference(_) => self.leaf(NodeKind::Unknown),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading {
                level: heading_level(level),
            },
            Tag::BlockQuote(_) => NodeKind::BlockQuote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => NodeKind::FencedCode {
                info: info.to_string(),
                literal: String::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => NodeKind::IndentedCode {
                literal: String::new(),
            },
            Tag::HtmlBlock => NodeKind::HtmlBlock(String::new()),
            Tag::List(Some(start)) => NodeKind::OrderedList { start },
            Tag::List(None) => NodeKind::BulletList,
            Tag::Item => NodeKind::ListItem,
            Tag::Table(_) => NodeKind::Table,
            Tag::TableHead => {
                // Head cells arrive without a row; give them one.
                self.in_table_head = true;
                self.open(NodeKind::TableHead);
                NodeKind::TableRow
            }
            Tag::TableRow => {
                if self.top().kind == NodeKind::Table {
                    self.open(NodeKind::TableBody);
                }
                NodeKind::TableRow
            }
            Tag::TableCell => NodeKind::TableCell {
                header: self.in_table_head,
            },
            Tag::Emphasis => NodeKind::Emphasis,
            Tag::Strong => NodeKind::Strong,
            Tag::Strikethrough => NodeKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => NodeKind::Link {
                destination: dest_url.to_string(),
                title: non_empty(title),
            },
            Tag::Image {
                dest_url, title, ..
            } => NodeKind::Image {
                destination: dest_url.to_string(),
                title: non_empty(title),
            },
            _ => NodeKind::Unknown,
        };
        self.open(kind);
    }

    fn end(&mut self, end: TagEnd) {
        match end {
            TagEnd::TableHead => {
                self.close(); // row
                self.close(); // head
                self.in_table_head = false;
            }
            TagEnd::Table => {
                if self.top().kind == NodeKind::TableBody {
                    self.close();
                }
                self.close();
            }
            _ => self.close(),
        }
    }

    fn text(&mut self, text: &str) {
        let top = self.top();
        match &mut top.kind {
            NodeKind::FencedCode { literal, .. }
            | NodeKind::IndentedCode { literal }
            | NodeKind::HtmlBlock(literal) => literal.push_str(text),
            _ => {
                // Merge with a preceding text leaf so wrap units never
                // split across parser chunks.
                if let Some(MdNode {
                    kind: NodeKind::Text(prev),
                    ..
                }) = top.children.last_mut()
                {
                    prev.push_str(text);
                } else {
                    top.children.push(MdNode::text(text));
                }
            }
        }
    }

    fn html(&mut self, html: &str) {
        let top = self.top();
        if let NodeKind::HtmlBlock(literal) = &mut top.kind {
            literal.push_str(html);
        } else {
            top.children.push(MdNode::new(NodeKind::HtmlInline(html.to_string())));
        }
    }

    fn finish(mut self) -> MdNode {
        while self.stack.len() > 1 {
            self.close();
        }
        let mut document = self
            .stack
            .pop()
            .unwrap_or_else(|| MdNode::new(NodeKind::Document));

        let mut finder = LinkFinder::new();
        finder.kinds(&[LinkKind::Url, LinkKind::Email]);
        autolink(&mut document, &finder);
        document
    }
}

/// Split text leaves around bare URLs and email addresses, wrapping each
/// match in a `Link`. Text already inside a link or image is left alone.
fn autolink(node: &mut MdNode, finder: &LinkFinder) {
    if matches!(node.kind, NodeKind::Link { .. } | NodeKind::Image { .. }) {
        return;
    }
    for mut child in std::mem::take(&mut node.children) {
        match &child.kind {
            NodeKind::Text(text) => node.children.extend(split_links(text, finder)),
            _ => {
                autolink(&mut child, finder);
                node.children.push(child);
            }
        }
    }
}

fn split_links(text: &str, finder: &LinkFinder) -> Vec<MdNode> {
    finder
        .spans(text)
        .map(|span| {
            let literal = span.as_str();
            let destination = match span.kind() {
                None => return MdNode::text(literal),
                Some(LinkKind::Email) => format!("mailto:{literal}"),
                Some(_) => literal.to_string(),
            };
            MdNode::with_children(
                NodeKind::Link {
                    destination,
                    title: None,
                },
                vec![MdNode::text(literal)],
            )
        })
        .collect()
}

/// Wrap runs of inline children in paragraphs and move a leading task
/// marker out of the first paragraph so it precedes it.
fn normalize_list_item(children: Vec<MdNode>) -> Vec<MdNode> {
    let mut out = Vec::with_capacity(children.len());
    let mut run: Vec<MdNode> = Vec::new();

    for child in children {
        if child.kind.is_inline() {
            run.push(child);
        } else {
            if !run.is_empty() {
                out.push(MdNode::with_children(
                    NodeKind::Paragraph,
                    std::mem::take(&mut run),
                ));
            }
            out.push(child);
        }
    }
    if !run.is_empty() {
        out.push(MdNode::with_children(NodeKind::Paragraph, run));
    }

    if let Some(first) = out.first_mut() {
        let leading_marker = first.kind == NodeKind::Paragraph
            && matches!(
                first.first_child().map(|c| &c.kind),
                Some(NodeKind::TaskMarker { .. })
            );
        if leading_marker {
            let marker = first.children.remove(0);
            out.insert(0, marker);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(nodes: &[MdNode]) -> Vec<&NodeKind> {
        nodes.iter().map(|n| &n.kind).collect()
    }

    #[test]
    fn test_parse_paragraph() {
        let doc = parse_document("Hello World");
        assert_eq!(doc.kind, NodeKind::Document);
        assert_eq!(kinds(&doc.children), vec![&NodeKind::Paragraph]);
        assert_eq!(doc.children[0].children, vec![MdNode::text("Hello World")]);
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        // pulldown-cmark splits text around brackets it considered as links
        let doc = parse_document("a [b] c");
        let para = &doc.children[0];
        assert_eq!(para.children, vec![MdNode::text("a [b] c")]);
    }

    #[test]
    fn test_heading_levels() {
        let doc = parse_document("# One\n\n###### Six");
        assert_eq!(doc.children[0].kind, NodeKind::Heading { level: 1 });
        assert_eq!(doc.children[1].kind, NodeKind::Heading { level: 6 });
    }

    #[test]
    fn test_tight_list_items_get_paragraphs() {
        let doc = parse_document("- Item 1\n- Item 2");
        let list = &doc.children[0];
        assert_eq!(list.kind, NodeKind::BulletList);
        for item in &list.children {
            assert_eq!(item.kind, NodeKind::ListItem);
            assert_eq!(kinds(&item.children), vec![&NodeKind::Paragraph]);
        }
    }

    #[test]
    fn test_ordered_list_start() {
        let doc = parse_document("3. three\n4. four");
        assert_eq!(doc.children[0].kind, NodeKind::OrderedList { start: 3 });
    }

    #[test]
    fn test_task_marker_precedes_paragraph() {
        for src in ["- [x] done", "- [x] done\n\n- [ ] open"] {
            let doc = parse_document(src);
            let item = &doc.children[0].children[0];
            assert_eq!(
                kinds(&item.children),
                vec![&NodeKind::TaskMarker { checked: true }, &NodeKind::Paragraph],
                "source: {src:?}"
            );
        }
    }

    #[test]
    fn test_table_shape() {
        let doc = parse_document("| A | B |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |");
        let table = &doc.children[0];
        assert_eq!(table.kind, NodeKind::Table);
        assert_eq!(
            kinds(&table.children),
            vec![&NodeKind::TableHead, &NodeKind::TableBody]
        );

        let head_row = &table.children[0].children[0];
        assert_eq!(head_row.kind, NodeKind::TableRow);
        assert_eq!(
            kinds(&head_row.children),
            vec![
                &NodeKind::TableCell { header: true },
                &NodeKind::TableCell { header: true }
            ]
        );

        let body = &table.children[1];
        assert_eq!(body.children.len(), 2);
        assert_eq!(
            body.children[0].children[0].kind,
            NodeKind::TableCell { header: false }
        );
    }

    #[test]
    fn test_code_block_literal() {
        let doc = parse_document("```rust\nfn main() {}\nlet x = 1;\n```");
        assert_eq!(
            doc.children[0].kind,
            NodeKind::FencedCode {
                info: "rust".to_string(),
                literal: "fn main() {}\nlet x = 1;\n".to_string()
            }
        );

        let doc = parse_document("    indented\n");
        assert_eq!(
            doc.children[0].kind,
            NodeKind::IndentedCode {
                literal: "indented\n".to_string()
            }
        );
    }

    #[test]
    fn test_html_block_and_inline() {
        let doc = parse_document("<div>\nhi\n</div>\n\ntext <b>bold</b>");
        assert!(matches!(&doc.children[0].kind, NodeKind::HtmlBlock(s) if s.contains("<div>")));
        let para = &doc.children[1];
        assert!(para
            .children
            .iter()
            .any(|c| c.kind == NodeKind::HtmlInline("<b>".to_string())));
    }

    #[test]
    fn test_link_and_image_attributes() {
        let doc = parse_document("[L](https://a.b \"T\") ![alt](i.png)");
        let para = &doc.children[0];
        assert_eq!(
            para.children[0].kind,
            NodeKind::Link {
                destination: "https://a.b".to_string(),
                title: Some("T".to_string())
            }
        );
        let image = para.children.last().unwrap();
        assert_eq!(
            image.kind,
            NodeKind::Image {
                destination: "i.png".to_string(),
                title: None
            }
        );
    }

    #[test]
    fn test_reference_definitions_are_kept() {
        let doc = parse_document("[x][r]\n\n[r]: https://example.com");
        assert!(doc.children.iter().any(|c| matches!(
            &c.kind,
            NodeKind::LinkReferenceDefinition { destination, .. } if destination == "https://example.com"
        )));
    }

    #[test]
    fn test_breaks_and_rule() {
        let doc = parse_document("a\nb  \nc\n\n---");
        let para = &doc.children[0];
        assert!(para.children.contains(&MdNode::new(NodeKind::SoftBreak)));
        assert!(para.children.contains(&MdNode::new(NodeKind::HardBreak)));
        assert_eq!(doc.children[1].kind, NodeKind::ThematicBreak);
    }

    #[test]
    fn test_bare_url_becomes_link() {
        let doc = parse_document("see https://example.com now");
        let para = &doc.children[0];
        assert_eq!(
            para.children,
            vec![
                MdNode::text("see "),
                MdNode::with_children(
                    NodeKind::Link {
                        destination: "https://example.com".to_string(),
                        title: None
                    },
                    vec![MdNode::text("https://example.com")]
                ),
                MdNode::text(" now"),
            ]
        );
    }

    #[test]
    fn test_bare_email_links_to_mailto() {
        let doc = parse_document("mail foo@example.com");
        let link = &doc.children[0].children[1];
        assert_eq!(
            link.kind,
            NodeKind::Link {
                destination: "mailto:foo@example.com".to_string(),
                title: None
            }
        );
    }

    #[test]
    fn test_autolink_skips_links_and_code() {
        let doc = parse_document("[https://a.example](https://b.example) `https://c.example`");
        let para = &doc.children[0];
        assert_eq!(para.children.len(), 3);
        assert_eq!(
            para.children[0].children,
            vec![MdNode::text("https://a.example")]
        );
        assert_eq!(
            para.children[2].kind,
            NodeKind::Code("https://c.example".to_string())
        );
    }

    #[test]
    fn test_empty_source() {
        let doc = parse_document("");
        assert_eq!(doc, MdNode::new(NodeKind::Document));
    }
}
