// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - link: the LinkExists rule; classifies a link and dispatches it
// - anchor: "#fragment" normalization and lookup
// - local: resolves file links against the repository on disk
// - http: checks remote links with a shared, rate-limited HTTP client
// =============================================================================

mod anchor;
mod http;
mod link;
mod local;

pub use anchor::{has_anchor, normalize_anchor, normalize_text};
pub use http::{innermost_message, RemoteChecker, RemoteOutcome};
pub use link::{classify, LinkExistsRule, LinkTarget, LINK_EXISTS};
pub use local::{resolve_local, LocalTarget};
