// src/checker/local.rs
// =============================================================================
// Resolves relative and repository-absolute links against the filesystem.
//
//   docs/guide.md#install      relative to the linking file's directory
//   /docs/guide#install        relative to the repository root
//
// Walk, one path segment at a time:
// - "."  stays put
// - ".." goes up, but never above the repository root
// - any other directory name is matched case-insensitively, since the link
//   may have been written on a filesystem with different case rules
// - the last segment names a file, tried as written and then with ".md"
//   appended (links usually leave the extension off)
//
// Resolution stops at the first segment that fails.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Where a local link points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalTarget {
    File {
        path: PathBuf,
        fragment: Option<String>,
    },
    Directory {
        path: PathBuf,
        fragment: Option<String>,
    },
}

/// Resolves `url` found in `file` against the repository at `root`.
///
/// `root` must be canonical. On failure the error is the problem
/// description.
pub fn resolve_local(url: &str, label: &str, file: &Path, root: &Path) -> Result<LocalTarget, String> {
    let (absolute, rest) = match url.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, url),
    };

    let mut dir = if absolute {
        root.to_path_buf()
    } else {
        containing_dir(file)
    };
    // Path walked so far, as shown in error messages
    let mut shown = if absolute { "/".to_string() } else { String::new() };

    let mut segments: Vec<&str> = rest.split('/').collect();
    let leaf = segments.pop().unwrap_or_default();

    for raw in segments {
        let segment = decode(raw);
        match segment.as_str() {
            "" | "." => {}
            ".." => dir = parent_dir(&dir, root, label)?,
            name => match find_child(&dir, name, EntryKind::Directory) {
                Some(child) => dir = child,
                None => return Err(format!("Cannot find dir [{}] in [{}]", name, shown)),
            },
        }

        if !shown.is_empty() && shown != "/" {
            shown.push('/');
        }
        shown.push_str(&segment);
    }

    let leaf = decode(leaf);
    let mut parts = leaf.split('#');
    let name = parts.next().unwrap_or_default();
    let fragment = parts.next().filter(|f| !f.is_empty()).map(str::to_string);
    if parts.next().is_some() {
        return Err(format!("Ill-formed anchor in [{}]", url));
    }
    // Query strings do not name anything on disk
    let name = name.split('?').next().unwrap_or_default();

    // "docs/", "." and ".." all name a directory
    match name {
        "" | "." => return Ok(LocalTarget::Directory { path: dir, fragment }),
        ".." => {
            let path = parent_dir(&dir, root, label)?;
            return Ok(LocalTarget::Directory { path, fragment });
        }
        _ => {}
    }

    let with_extension = format!("{}.md", name);
    let file_match = find_child(&dir, name, EntryKind::File)
        .or_else(|| find_child(&dir, &with_extension, EntryKind::File));
    if let Some(path) = file_match {
        return Ok(LocalTarget::File { path, fragment });
    }

    if let Some(path) = find_child(&dir, name, EntryKind::Directory) {
        return Ok(LocalTarget::Directory { path, fragment });
    }

    Err(format!("Cannot find file [{}] in [{}]", name, shown))
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

fn containing_dir(file: &Path) -> PathBuf {
    let file = fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
    file.parent().map(Path::to_path_buf).unwrap_or_default()
}

// One step up from `dir`, refusing to leave the repository root
fn parent_dir(dir: &Path, root: &Path, label: &str) -> Result<PathBuf, String> {
    let above = || format!("link for [{}] went above markdown base directory", label);
    if same_dir(dir, root) {
        return Err(above());
    }
    dir.parent().map(Path::to_path_buf).ok_or_else(above)
}

/// Case-insensitive comparison of two directory paths
fn same_dir(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
}

// Finds a child of `dir` named `name`, ignoring case.
// An exact match wins over a case-insensitive one, so "Docs" and "docs"
// side by side on a case-sensitive filesystem resolve predictably.
fn find_child(dir: &Path, name: &str, kind: EntryKind) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let wanted = name.to_lowercase();
    let mut fallback = None;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let matches_kind = match kind {
            EntryKind::File => path.is_file(),
            EntryKind::Directory => path.is_dir(),
        };
        if !matches_kind {
            continue;
        }

        let entry_name = entry.file_name();
        let entry_name = decode(&entry_name.to_string_lossy());
        if entry_name == name {
            return Some(path);
        }
        if fallback.is_none() && entry_name.to_lowercase() == wanted {
            fallback = Some(path);
        }
    }

    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // repo/
    //   README.md
    //   docs/
    //     guide.md
    //     My Notes.md
    //     deep/
    //       page.md
    //   Images/
    //     logo.png
    fn setup_repo() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("docs/deep")).unwrap();
        fs::create_dir_all(root.join("Images")).unwrap();
        fs::write(root.join("README.md"), "# Readme\n").unwrap();
        fs::write(root.join("docs/guide.md"), "# Guide\n").unwrap();
        fs::write(root.join("docs/My Notes.md"), "# Notes\n").unwrap();
        fs::write(root.join("docs/deep/page.md"), "# Page\n").unwrap();
        fs::write(root.join("Images/logo.png"), "png").unwrap();
        (dir, root)
    }

    #[test]
    fn test_relative_file() {
        let (_dir, root) = setup_repo();
        let file = root.join("docs/guide.md");

        let target = resolve_local("deep/page.md", "x", &file, &root).unwrap();
        assert_eq!(
            target,
            LocalTarget::File {
                path: root.join("docs/deep/page.md"),
                fragment: None
            }
        );
    }

    #[test]
    fn test_missing_extension_and_case() {
        let (_dir, root) = setup_repo();
        let file = root.join("README.md");

        let target = resolve_local("./DOCS/Guide", "x", &file, &root).unwrap();
        assert!(matches!(target, LocalTarget::File { ref path, .. } if path == &root.join("docs/guide.md")));
    }

    #[test]
    fn test_percent_encoded_name_and_fragment() {
        let (_dir, root) = setup_repo();
        let file = root.join("README.md");

        let target = resolve_local("docs/My%20Notes#notes", "x", &file, &root).unwrap();
        assert_eq!(
            target,
            LocalTarget::File {
                path: root.join("docs/My Notes.md"),
                fragment: Some("notes".to_string())
            }
        );
    }

    #[test]
    fn test_root_relative() {
        let (_dir, root) = setup_repo();
        let file = root.join("docs/deep/page.md");

        let target = resolve_local("/images/logo.png", "logo", &file, &root).unwrap();
        assert!(matches!(target, LocalTarget::File { ref path, .. } if path == &root.join("Images/logo.png")));
    }

    #[test]
    fn test_missing_file() {
        let (_dir, root) = setup_repo();
        let file = root.join("docs/guide.md");

        let error = resolve_local("./missing.md", "x", &file, &root).unwrap_err();
        assert_eq!(error, "Cannot find file [missing.md] in [.]");
    }

    #[test]
    fn test_missing_dir_reports_path_so_far() {
        let (_dir, root) = setup_repo();
        let file = root.join("README.md");

        let error = resolve_local("/docs/nope/page.md", "x", &file, &root).unwrap_err();
        assert_eq!(error, "Cannot find dir [nope] in [/docs]");
    }

    #[test]
    fn test_parent_above_root() {
        let (_dir, root) = setup_repo();
        let file = root.join("docs/guide.md");

        assert!(resolve_local("../README.md", "x", &file, &root).is_ok());
        let error = resolve_local("../../secret.md", "x", &file, &root).unwrap_err();
        assert!(error.contains("went above markdown base directory"));

        // Going deep first does not help
        let deep = root.join("docs/deep/page.md");
        let error = resolve_local("../../../deep/page.md", "y", &deep, &root).unwrap_err();
        assert_eq!(error, "link for [y] went above markdown base directory");
    }

    #[test]
    fn test_ill_formed_anchor() {
        let (_dir, root) = setup_repo();
        let file = root.join("README.md");

        let error = resolve_local("docs/guide.md#a#b", "x", &file, &root).unwrap_err();
        assert_eq!(error, "Ill-formed anchor in [docs/guide.md#a#b]");
    }

    #[test]
    fn test_directory_links() {
        let (_dir, root) = setup_repo();
        let file = root.join("README.md");

        assert_eq!(
            resolve_local("docs/", "x", &file, &root).unwrap(),
            LocalTarget::Directory {
                path: root.join("docs"),
                fragment: None
            }
        );
        assert!(matches!(
            resolve_local("docs/deep", "x", &file, &root).unwrap(),
            LocalTarget::Directory { .. }
        ));
    }

    #[test]
    fn test_dot_segments_as_last_segment() {
        let (_dir, root) = setup_repo();
        let file = root.join("docs/deep/page.md");

        assert_eq!(
            resolve_local("..", "up", &file, &root).unwrap(),
            LocalTarget::Directory {
                path: root.join("docs"),
                fragment: None
            }
        );
        assert_eq!(
            resolve_local("../", "up", &file, &root).unwrap(),
            LocalTarget::Directory {
                path: root.join("docs"),
                fragment: None
            }
        );
        assert_eq!(
            resolve_local(".", "here", &file, &root).unwrap(),
            LocalTarget::Directory {
                path: root.join("docs/deep"),
                fragment: None
            }
        );
        assert_eq!(
            resolve_local("../..", "top", &file, &root).unwrap(),
            LocalTarget::Directory {
                path: root.clone(),
                fragment: None
            }
        );
    }

    #[test]
    fn test_dot_dot_leaf_above_root() {
        let (_dir, root) = setup_repo();
        let file = root.join("README.md");

        let error = resolve_local("..", "above", &file, &root).unwrap_err();
        assert_eq!(error, "link for [above] went above markdown base directory");
        let error = resolve_local("docs/../..", "above", &file, &root).unwrap_err();
        assert_eq!(error, "link for [above] went above markdown base directory");
    }

    #[test]
    fn test_query_string_is_ignored() {
        let (_dir, root) = setup_repo();
        let file = root.join("README.md");

        let target = resolve_local("docs/guide.md?plain=1#guide", "x", &file, &root).unwrap();
        assert_eq!(
            target,
            LocalTarget::File {
                path: root.join("docs/guide.md"),
                fragment: Some("guide".to_string())
            }
        );
    }
}
