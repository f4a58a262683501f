// src/document/mod.rs
// =============================================================================
// The parsed form of one markdown file.
//
// A Document owns every node of its tree in a single Vec (an "arena").
// Nodes point at each other with NodeId indices instead of references:
// - children are listed by the parent
// - each node remembers its parent, which is only a relation, not ownership
//
// Submodules:
// - markdown: builds a Document from markdown text (pulldown-cmark)
// - html: renders a Document to HTML and collects id/name anchors (scraper)
// - cache: shares parsed Documents between concurrent validations
// =============================================================================

mod cache;
mod html;
mod markdown;

pub use cache::DocumentCache;
pub use markdown::parse;

use std::sync::OnceLock;

/// Index of a node inside its Document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A link in the shape the link rule consumes, whatever its markdown syntax:
/// `[text](url)`, `![alt](url)`, a reference use, or a `[label]: url`
/// definition block
#[derive(Debug, Clone)]
pub struct Link {
    pub url: String,
    pub label: String,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Blocks holding other blocks: the document root, block quotes,
    /// lists, list items, tables, table rows, footnote definitions
    Container(Vec<NodeId>),
    /// Blocks holding inline content: paragraphs, code blocks, table cells
    Leaf(Vec<NodeId>),
    Heading(Vec<NodeId>),
    /// Emphasis, strong, strikethrough
    Span(Vec<NodeId>),
    Link(Link),
    Text(String),
    Other,
}

impl NodeKind {
    /// Direct children, in document order
    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeKind::Container(children)
            | NodeKind::Leaf(children)
            | NodeKind::Span(children)
            | NodeKind::Heading(children) => children,
            NodeKind::Link(link) => &link.children,
            NodeKind::Text(_) | NodeKind::Other => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            NodeKind::Container(children)
            | NodeKind::Leaf(children)
            | NodeKind::Span(children)
            | NodeKind::Heading(children) => Some(children),
            NodeKind::Link(link) => Some(&mut link.children),
            NodeKind::Text(_) | NodeKind::Other => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// 0-based source line, if the parser knew one
    pub line: Option<usize>,
}

/// An immutable parsed markdown file
#[derive(Debug)]
pub struct Document {
    source: String,
    nodes: Vec<Node>,
    // Filled the first time anchors are looked up, see html.rs
    anchors: OnceLock<Vec<String>>,
}

impl Document {
    pub(crate) fn from_parts(source: String, nodes: Vec<Node>) -> Self {
        Document {
            source,
            nodes,
            anchors: OnceLock::new(),
        }
    }

    /// The root container. Always the first node of the arena.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Heading blocks that sit directly under the root, in document order
    pub fn headings(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node(self.root())
            .kind
            .children()
            .iter()
            .copied()
            .filter(move |id| matches!(self.node(*id).kind, NodeKind::Heading(_)))
    }

    /// The literal text of a heading: its direct text runs concatenated.
    /// Text nested inside emphasis or code is not part of it.
    pub fn heading_text(&self, id: NodeId) -> String {
        match &self.node(id).kind {
            NodeKind::Heading(inlines) => inlines
                .iter()
                .filter_map(|child| match &self.node(*child).kind {
                    NodeKind::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            _ => String::new(),
        }
    }

    /// Every link node in the document, in arena (document) order
    pub fn links(&self) -> impl Iterator<Item = (NodeId, &Link)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match &node.kind {
                NodeKind::Link(link) => Some((NodeId(index), link)),
                _ => None,
            })
    }

    /// First line found walking up from `id` through its ancestors.
    ///
    /// The walk is bounded by the number of nodes, so a malformed parent
    /// chain cannot loop forever.
    pub fn line_of(&self, id: NodeId) -> Option<usize> {
        let mut current = Some(id);
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(current?.0)?;
            if let Some(line) = node.line {
                return Some(line);
            }
            current = node.parent;
        }
        None
    }
}
