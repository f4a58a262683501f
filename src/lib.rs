// src/lib.rs
// =============================================================================
// markval: validates the links in a repository of markdown documents.
//
// Modules:
// - document: the parsed tree of one file, and the cache sharing them
// - checker: the link rule (anchors, local files, remote URLs)
// - validator: walks a document and runs rules on every node
// - problem: what a rule reports
// - context: state shared by one validation run
// - scan: finds the files to validate
// =============================================================================

pub mod checker;
pub mod context;
pub mod document;
pub mod error;
pub mod problem;
pub mod rule;
pub mod scan;
pub mod validator;

pub use checker::LinkExistsRule;
pub use context::{CheckerConfig, ValidationContext};
pub use document::{Document, DocumentCache};
pub use error::DocumentError;
pub use problem::{Problem, ProblemReport};
pub use rule::Rule;
pub use validator::Validator;
