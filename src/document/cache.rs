// src/document/cache.rs
// =============================================================================
// Parsed documents, shared by every validation in a run.
//
// A link in a.md may point at an anchor in b.md while b.md is being
// validated by another task. Both need the same parsed b.md, so documents
// are parsed once and kept in a map keyed by canonical path.
//
// Contract: insert-if-absent. Two tasks may both parse the same file when
// they miss at the same moment; whichever commits first wins and the other
// task gets (and returns) the winner, so a path always maps to one Document.
// =============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::{parse, Document};
use crate::error::DocumentError;

#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: RwLock<HashMap<PathBuf, Arc<Document>>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parsed document for `path`, reading and parsing it on
    /// first use. Read failures are returned, never cached.
    pub fn get(&self, path: &Path) -> Result<Arc<Document>, DocumentError> {
        let key = fs::canonicalize(path).map_err(|e| DocumentError::read(path, e))?;

        if let Some(document) = self.lookup(&key) {
            return Ok(document);
        }

        debug!(path = %key.display(), "parsing document");
        let text = fs::read_to_string(&key).map_err(|e| DocumentError::read(&key, e))?;
        let parsed = Arc::new(parse(&text));

        // A poisoned lock only means another task panicked mid-insert; the
        // map itself is still a valid map
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.entry(key).or_insert(parsed).clone())
    }

    /// Number of documents parsed so far
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &Path) -> Option<Arc<Document>> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
