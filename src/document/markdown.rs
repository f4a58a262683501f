// src/document/markdown.rs
// =============================================================================
// This module turns markdown text into a Document tree.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Reports the byte range of every event, which we turn into line numbers
//
// pulldown-cmark gives us a flat stream: Start(tag) ... End(tag). We fold it
// into a tree by keeping a stack of the nodes that are currently open.
// =============================================================================

use std::ops::Range;

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};

use super::{Document, Link, Node, NodeId, NodeKind};

/// Options shared by parsing and HTML rendering, so both see the same tree
pub(crate) fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Parses markdown text into a Document
///
/// Reference definitions (`[label]: url`) never show up in the event
/// stream, so they are read from the parser up front and slotted into the
/// root container as link blocks at their source position.
///
/// Example:
///   "# Intro\n\nSee [docs](./docs.md)"
///   -> root
///      ├── Heading "Intro"
///      └── Leaf
///          ├── Text "See "
///          └── Link ./docs.md
pub fn parse(markdown: &str) -> Document {
    let lines = LineIndex::new(markdown);
    let parser = Parser::new_ext(markdown, markdown_options());

    let mut definitions: Vec<(String, String, Range<usize>)> = parser
        .reference_definitions()
        .iter()
        .map(|(label, def)| (label.to_string(), def.dest.to_string(), def.span.clone()))
        .collect();
    definitions.sort_by_key(|(_, _, span)| span.start);

    let mut builder = TreeBuilder::new();
    for (event, range) in parser.into_offset_iter() {
        builder.push(event, lines.line_of(range.start));
    }
    for (label, url, span) in definitions {
        builder.add_definition(label, url, lines.line_of(span.start));
    }

    Document::from_parts(markdown.to_string(), builder.finish())
}

// A node that has been started but not ended yet
struct Open {
    id: NodeId,
    // Paragraph we made up for inline content sitting directly in a
    // container, like the text of a tight list item
    implicit: bool,
}

struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<Open>,
}

impl TreeBuilder {
    fn new() -> Self {
        let root = Node {
            kind: NodeKind::Container(Vec::new()),
            parent: None,
            line: None,
        };
        TreeBuilder {
            nodes: vec![root],
            stack: vec![Open {
                id: NodeId(0),
                implicit: false,
            }],
        }
    }

    fn push(&mut self, event: Event<'_>, line: usize) {
        match event {
            Event::Start(tag) => self.start(tag, line),
            Event::End(_) => self.end(),
            Event::Text(text) => {
                self.add_label_text(&text);
                self.add_inline(NodeKind::Text(text.to_string()), line);
            }
            Event::Code(code) => {
                self.add_label_text(&code);
                self.add_inline(NodeKind::Other, line);
            }
            Event::Html(_) => {
                if self.top_is_container() {
                    self.add_block(NodeKind::Other, line);
                } else {
                    self.add_inline(NodeKind::Other, line);
                }
            }
            Event::Rule => {
                self.add_block(NodeKind::Other, line);
            }
            Event::SoftBreak | Event::HardBreak => {
                self.add_label_text(" ");
                self.add_inline(NodeKind::Other, line);
            }
            Event::FootnoteReference(_) | Event::TaskListMarker(_) => {
                self.add_inline(NodeKind::Other, line);
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>, line: usize) {
        match tag {
            Tag::Paragraph | Tag::CodeBlock(_) | Tag::TableCell => {
                self.open_block(NodeKind::Leaf(Vec::new()), line)
            }
            Tag::Heading(..) => self.open_block(NodeKind::Heading(Vec::new()), line),
            Tag::BlockQuote
            | Tag::List(_)
            | Tag::Item
            | Tag::FootnoteDefinition(_)
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow => self.open_block(NodeKind::Container(Vec::new()), line),
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough => {
                self.open_inline(NodeKind::Span(Vec::new()), line)
            }
            // In pulldown-cmark 0.9, Link is Tag::Link(link_type, dest_url, title).
            // Reference-style uses arrive here already resolved to their URL.
            // An email autolink <someone@example.com> carries the bare address
            Tag::Link(LinkType::Email, dest, _title) => {
                self.open_inline(link_node(format!("mailto:{}", dest)), line)
            }
            Tag::Link(_link_type, dest, _title) | Tag::Image(_link_type, dest, _title) => {
                self.open_inline(link_node(dest.to_string()), line)
            }
        }
    }

    fn end(&mut self) {
        self.close_implicit();
        // Never pop the root, even on an unbalanced stream
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn add_definition(&mut self, label: String, url: String, line: usize) {
        let kind = NodeKind::Link(Link {
            url,
            label,
            children: Vec::new(),
        });
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(NodeId(0)),
            line: Some(line),
        });

        // Keep the root's children ordered by line
        let nodes = &self.nodes;
        let position = nodes[0]
            .kind
            .children()
            .iter()
            .position(|child| nodes[child.0].line.map_or(false, |l| l > line));
        if let Some(children) = self.nodes[0].kind.children_mut() {
            match position {
                Some(index) => children.insert(index, id),
                None => children.push(id),
            }
        }
    }

    fn finish(self) -> Vec<Node> {
        self.nodes
    }

    fn top(&self) -> &Open {
        // The root entry is never popped
        &self.stack[self.stack.len() - 1]
    }

    fn top_is_container(&self) -> bool {
        matches!(self.nodes[self.top().id.0].kind, NodeKind::Container(_))
    }

    fn close_implicit(&mut self) {
        if self.top().implicit {
            self.stack.pop();
        }
    }

    fn attach(&mut self, kind: NodeKind, line: usize) -> NodeId {
        let parent = self.top().id;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            line: Some(line),
        });
        if let Some(children) = self.nodes[parent.0].kind.children_mut() {
            children.push(id);
        }
        id
    }

    fn add_block(&mut self, kind: NodeKind, line: usize) -> NodeId {
        self.close_implicit();
        self.attach(kind, line)
    }

    fn open_block(&mut self, kind: NodeKind, line: usize) {
        let id = self.add_block(kind, line);
        self.stack.push(Open {
            id,
            implicit: false,
        });
    }

    fn ensure_inline_parent(&mut self, line: usize) {
        if self.top_is_container() {
            let id = self.attach(NodeKind::Leaf(Vec::new()), line);
            self.stack.push(Open { id, implicit: true });
        }
    }

    fn add_inline(&mut self, kind: NodeKind, line: usize) -> NodeId {
        self.ensure_inline_parent(line);
        self.attach(kind, line)
    }

    fn open_inline(&mut self, kind: NodeKind, line: usize) {
        let id = self.add_inline(kind, line);
        self.stack.push(Open {
            id,
            implicit: false,
        });
    }

    // Every open link collects the text inside it as its label
    fn add_label_text(&mut self, text: &str) {
        for open in &self.stack {
            if let NodeKind::Link(link) = &mut self.nodes[open.id.0].kind {
                link.label.push_str(text);
            }
        }
    }
}

fn link_node(url: String) -> NodeKind {
    NodeKind::Link(Link {
        url,
        label: String::new(),
        children: Vec::new(),
    })
}

/// Maps byte offsets to 0-based line numbers
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(index, _)| index + 1));
        LineIndex { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset).saturating_sub(1)
    }
}
