// src/validator.rs
// =============================================================================
// Runs rules over a whole document with a breadth-first walk.
//
// How it works:
// 1. Start with the document root in a queue
// 2. Pop a container and visit each of its child blocks:
//    - every rule sees the block
//    - containers go to the back of the queue
//    - leaf blocks and headings hand their inline nodes to every rule
// 3. Repeat until the queue is empty
//
// Siblings are visited left to right; a container's children are visited
// after its later siblings (plain BFS), so problems do not always come out
// in reading order.
// =============================================================================

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::checker::LinkExistsRule;
use crate::context::ValidationContext;
use crate::document::{Document, NodeId, NodeKind};
use crate::problem::Problem;
use crate::rule::Rule;

/// Rule identity of the problem reported when a file cannot be read
pub const IO_ERROR: &str = "IoError";

pub struct Validator {
    context: Arc<ValidationContext>,
    rules: Vec<Box<dyn Rule>>,
}

impl Validator {
    pub fn new(context: Arc<ValidationContext>, rules: Vec<Box<dyn Rule>>) -> Self {
        Validator { context, rules }
    }

    /// A validator running only the link rule
    pub fn with_link_rule(context: Arc<ValidationContext>) -> Self {
        Self::new(context, vec![Box::new(LinkExistsRule::new())])
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Every problem every rule finds in `file`, in traversal order.
    ///
    /// Never fails: a file that cannot be read comes back as a single
    /// IoError problem.
    pub async fn check_document(&self, file: &Path) -> Vec<Problem> {
        let document = match self.context.document(file) {
            Ok(document) => document,
            Err(e) => return vec![Problem::new(IO_ERROR, None, file, e.to_string())],
        };
        debug!(file = %file.display(), nodes = document.len(), "checking document");

        let mut problems = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(document.root());

        while let Some(container) = queue.pop_front() {
            for &block in document.node(container).kind.children() {
                problems.extend(self.run_rules(block, &document, file).await);

                match &document.node(block).kind {
                    NodeKind::Container(_) => queue.push_back(block),
                    NodeKind::Leaf(inlines) | NodeKind::Heading(inlines) => {
                        for inline in inline_nodes(&document, inlines) {
                            problems.extend(self.run_rules(inline, &document, file).await);
                        }
                    }
                    _ => {}
                }
            }
        }

        problems
    }

    async fn run_rules(&self, node: NodeId, document: &Arc<Document>, file: &Path) -> Vec<Problem> {
        let mut problems = Vec::new();
        for rule in &self.rules {
            problems.extend(rule.problems(node, document, file, &self.context).await);
        }
        problems
    }
}

// Inline nodes under a leaf block in pre-order, so a link nested in
// emphasis is visited right after the emphasis itself
fn inline_nodes(document: &Document, inlines: &[NodeId]) -> Vec<NodeId> {
    let mut ordered = Vec::new();
    let mut stack: Vec<NodeId> = inlines.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        ordered.push(id);
        stack.extend(document.node(id).kind.children().iter().rev().copied());
    }

    ordered
}
