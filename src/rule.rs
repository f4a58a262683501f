// src/rule.rs
// =============================================================================
// A Rule looks at one node of a document and reports what is wrong with it.
//
// The validator hands every block and inline node to every rule. Most rules
// ignore most nodes and return an empty Vec.
//
// Rules are async because checking a remote link waits on the network.
// Trait methods cannot be `async fn` and still be used as `dyn Rule`, so the
// method returns a boxed future instead (BoxFuture from the futures crate).
// =============================================================================

use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::context::ValidationContext;
use crate::document::{Document, NodeId};
use crate::problem::Problem;

pub trait Rule: Send + Sync {
    /// Identity printed at the start of each problem line
    fn name(&self) -> &'static str;

    /// Problems found on `node` of `document`, which was read from `file`
    fn problems<'a>(
        &'a self,
        node: NodeId,
        document: &'a Arc<Document>,
        file: &'a Path,
        context: &'a ValidationContext,
    ) -> BoxFuture<'a, Vec<Problem>>;
}
