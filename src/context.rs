// src/context.rs
// =============================================================================
// State shared by every rule invocation of one validation run:
// - the repository root every "/..." link and every ".." check is tied to
// - the document cache, so each file is parsed once per run
// - the remote checker (HTTP client + concurrency limit)
//
// One ValidationContext is built per run and shared between tasks with Arc.
// =============================================================================

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::checker::RemoteChecker;
use crate::document::{Document, DocumentCache};
use crate::error::DocumentError;

pub const DEFAULT_MAX_CONNECTIONS: usize = 16;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for remote link checks
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Upper bound on HTTP requests in flight at once, and on pooled
    /// connections per host
    pub max_connections: usize,
    /// Per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
    /// Honor the system proxy settings (HTTP_PROXY, HTTPS_PROXY, ...)
    pub use_proxy: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("markval/{}", env!("CARGO_PKG_VERSION")),
            use_proxy: true,
        }
    }
}

#[derive(Debug)]
pub struct ValidationContext {
    root: PathBuf,
    documents: DocumentCache,
    remote: RemoteChecker,
}

impl ValidationContext {
    /// Creates a context for the repository at `root`.
    ///
    /// The root is canonicalized so that ".." checks can compare it against
    /// the canonical directories link resolution walks through.
    pub fn new(root: impl AsRef<Path>, config: &CheckerConfig) -> Result<Self> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .with_context(|| format!("Invalid repository directory: {}", root.display()))?;
        if !root.is_dir() {
            anyhow::bail!("Not a directory: {}", root.display());
        }

        Ok(ValidationContext {
            root,
            documents: DocumentCache::new(),
            remote: RemoteChecker::new(config)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn documents(&self) -> &DocumentCache {
        &self.documents
    }

    pub fn remote(&self) -> &RemoteChecker {
        &self.remote
    }

    /// Shorthand for `documents().get(path)`
    pub fn document(&self, path: &Path) -> Result<Arc<Document>, DocumentError> {
        self.documents.get(path)
    }
}
