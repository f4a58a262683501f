// src/checker/link.rs
// =============================================================================
// The link rule: decides whether each link in a document goes somewhere.
//
// A link's URL is classified first, then checked the way its kind needs:
//
//   ""                      -> problem, nothing to follow
//   "#section"              -> anchor in this document
//   "mailto:someone@x.io"   -> accepted, mail delivery is not verified
//   "https://x.io/page"     -> remote, GET it and look at the status
//   "docs/page.md#section"  -> local file (and maybe an anchor in it)
//
// Inline links, images and reference definitions all reach this rule as
// the same Link node shape, so they share this one code path.
// =============================================================================

use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};
use url::Url;

use super::anchor::has_anchor;
use super::local::{resolve_local, LocalTarget};
use crate::context::ValidationContext;
use crate::document::{Document, Link, NodeId, NodeKind};
use crate::problem::{Location, Problem};
use crate::rule::Rule;

pub const LINK_EXISTS: &str = "LinkExists";

/// What kind of target a link URL names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget<'u> {
    Empty,
    Anchor(&'u str),
    Mail,
    Remote(Url),
    Local(&'u str),
}

/// Classifies a link URL. First match wins.
pub fn classify(url: &str) -> LinkTarget<'_> {
    if url.is_empty() {
        return LinkTarget::Empty;
    }
    if url.starts_with('#') {
        return LinkTarget::Anchor(url);
    }
    if url.starts_with("mailto:") {
        return LinkTarget::Mail;
    }

    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => LinkTarget::Remote(parsed),
        // Catches scheme spellings the prefix check above does not, like "MAILTO:"
        Ok(parsed) if parsed.scheme() == "mailto" => LinkTarget::Mail,
        _ => LinkTarget::Local(url),
    }
}

/// Checks that every link points at something that exists
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkExistsRule;

impl LinkExistsRule {
    pub fn new() -> Self {
        LinkExistsRule
    }

    /// Problem description for `link`, or None if it resolves
    async fn check_link(
        &self,
        link: &Link,
        document: &Document,
        file: &Path,
        context: &ValidationContext,
    ) -> Option<String> {
        match classify(&link.url) {
            LinkTarget::Empty => Some(format!("Empty link on [{}]", link.label)),
            LinkTarget::Anchor(anchor) => check_anchor(anchor, document, None),
            LinkTarget::Mail => None,
            LinkTarget::Remote(url) => {
                let outcome = context.remote().fetch(&url).await;
                let problem = outcome.describe(&link.url);
                if problem.is_some() {
                    debug!(url = %link.url, ?outcome, "remote link is broken");
                }
                problem
            }
            LinkTarget::Local(url) => check_local(url, &link.label, file, context),
        }
    }
}

impl Rule for LinkExistsRule {
    fn name(&self) -> &'static str {
        LINK_EXISTS
    }

    fn problems<'a>(
        &'a self,
        node: NodeId,
        document: &'a Arc<Document>,
        file: &'a Path,
        context: &'a ValidationContext,
    ) -> BoxFuture<'a, Vec<Problem>> {
        Box::pin(async move {
            let NodeKind::Link(link) = &document.node(node).kind else {
                return Vec::new();
            };

            match self.check_link(link, document, file, context).await {
                Some(description) => {
                    let location = Location {
                        document: Arc::clone(document),
                        node,
                    };
                    vec![Problem::new(self.name(), Some(location), file, description)]
                }
                None => Vec::new(),
            }
        })
    }
}

// `foreign` is the file the anchor is looked up in when it is not the
// document holding the link; it only changes the wording of the problem
fn check_anchor(anchor: &str, document: &Document, foreign: Option<&Path>) -> Option<String> {
    if has_anchor(document, anchor) {
        return None;
    }

    Some(match foreign {
        Some(page) => format!(
            "Cannot find anchor [#{}] on page [{}]",
            anchor.trim_start_matches('#'),
            page.display()
        ),
        None => format!("Cannot find anchor in document [{}]", anchor),
    })
}

fn check_local(url: &str, label: &str, file: &Path, context: &ValidationContext) -> Option<String> {
    let target = match resolve_local(url, label, file, context.root()) {
        Ok(target) => target,
        Err(problem) => return Some(problem),
    };

    match target {
        LocalTarget::File {
            fragment: None, ..
        }
        | LocalTarget::Directory {
            fragment: None, ..
        } => None,
        LocalTarget::Directory {
            path,
            fragment: Some(fragment),
        } => Some(format!(
            "Cannot resolve anchor [#{}] on directory [{}]",
            fragment,
            path.display()
        )),
        LocalTarget::File {
            path,
            fragment: Some(fragment),
        } => match context.document(&path) {
            Ok(target) => check_anchor(&fragment, &target, Some(&path)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read link target");
                Some(format!("Cannot read [{}] to find anchor [#{}]: {}", path.display(), fragment, e))
            }
        },
    }
}
