// src/problem.rs
// =============================================================================
// A Problem is one reported validation failure: which rule found it, on
// which node of which file, and what is wrong.
//
// The line number is not stored. It is worked out from the node when asked
// for, by walking up the tree until a node that knows its line is found.
//
// Display format (one line per problem):
//   LinkExists: /repo/docs/a.md @ Line 12 : Cannot find file [b.md] in [docs]
// =============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::document::{Document, NodeId};

/// Line reported when no node on the chain carries a line
pub const UNKNOWN_LINE: usize = 0;

/// The node a problem is attached to
#[derive(Debug, Clone)]
pub struct Location {
    pub document: Arc<Document>,
    pub node: NodeId,
}

#[derive(Debug, Clone)]
pub struct Problem {
    rule: &'static str,
    location: Option<Location>,
    file: PathBuf,
    description: String,
}

impl Problem {
    pub fn new(
        rule: &'static str,
        location: Option<Location>,
        file: impl Into<PathBuf>,
        description: impl Into<String>,
    ) -> Self {
        Problem {
            rule,
            location,
            file: file.into(),
            description: description.into(),
        }
    }

    pub fn rule(&self) -> &'static str {
        self.rule
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// 1-based line of the offending node, or UNKNOWN_LINE
    pub fn line(&self) -> usize {
        self.location
            .as_ref()
            .and_then(|location| location.document.line_of(location.node))
            .map_or(UNKNOWN_LINE, |line| line + 1)
    }

    /// Flat, serializable copy for JSON output
    pub fn report(&self) -> ProblemReport {
        ProblemReport {
            rule: self.rule.to_string(),
            file: self.file.display().to_string(),
            line: self.line(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} @ Line {} : {}",
            self.rule,
            self.file.display(),
            self.line(),
            self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemReport {
    pub rule: String,
    pub file: String,
    pub line: usize,
    pub description: String,
}
