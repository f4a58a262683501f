// src/scan.rs
// =============================================================================
// Finds the files of a repository to validate.
//
// A pattern without a '/' is matched against file names only, so "*.md"
// finds markdown files at any depth. A pattern with a '/' is matched
// against the path relative to the repository root ("docs/**/*.md").
//
// Hidden directories (.git, .github, ...) are not entered.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobBuilder;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

pub const DEFAULT_PATTERN: &str = "*.md";

/// Files under `root` matching `pattern`, sorted by path
pub fn find_documents(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    // '*' stops at '/', so "docs/*.md" does not reach into docs/deep/
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("Invalid file pattern '{}'", pattern))?
        .compile_matcher();
    let match_full_path = pattern.contains('/');

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let is_match = if match_full_path {
            entry
                .path()
                .strip_prefix(root)
                .map(|relative| matcher.is_match(relative))
                .unwrap_or(false)
        } else {
            matcher.is_match(entry.file_name())
        };
        if is_match {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("docs/deep")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("docs/guide.md"), "").unwrap();
        fs::write(root.join("docs/deep/page.md"), "").unwrap();
        fs::write(root.join(".git/HEAD.md"), "").unwrap();
        dir
    }

    #[test]
    fn test_default_pattern_finds_markdown_at_any_depth() {
        let dir = setup();
        let files = find_documents(dir.path(), DEFAULT_PATTERN).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("docs/deep/page.md"),
                PathBuf::from("docs/guide.md"),
            ]
        );
    }

    #[test]
    fn test_path_pattern() {
        let dir = setup();
        let files = find_documents(dir.path(), "docs/*.md").unwrap();
        assert_eq!(files, vec![dir.path().join("docs/guide.md")]);
    }

    #[test]
    fn test_single_file_name() {
        let dir = setup();
        let files = find_documents(dir.path(), "page.md").unwrap();
        assert_eq!(files, vec![dir.path().join("docs/deep/page.md")]);
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = setup();
        assert!(find_documents(dir.path(), "[").is_err());
    }
}
