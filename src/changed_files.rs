//! The list of files touched by a change, as a JSON array of paths relative
//! to the repository root.
//!
//! Coverage profiles name files by their full import path
//! (`github.com/user/repo/pkg/file.go`), so every entry is prefixed with the
//! repository's root import path before it is matched against a profile.
use std::path::Path;

use crate::error::{CovdeltaError, Result};

/// Read a changed-files list from disk. See [`parse`].
pub fn load(path: &Path, root: &str, project_path: &str) -> Result<Vec<String>> {
    let json = std::fs::read_to_string(path)?;
    parse(&json, root, project_path)
}

/// Decode a JSON array of paths and map every entry onto a profile file name.
///
/// When `project_path` is non-empty, its first occurrence is removed from each
/// entry first; this maps paths of a repository with the Go module in a
/// subdirectory onto the module's import path.
pub fn parse(json: &str, root: &str, project_path: &str) -> Result<Vec<String>> {
    let files: Vec<String> = serde_json::from_str(json).map_err(CovdeltaError::ChangedFiles)?;

    Ok(files
        .into_iter()
        .map(|file| {
            let file = if project_path.is_empty() {
                file
            } else {
                file.replacen(project_path, "", 1)
            };
            join_root(root, &file)
        })
        .collect())
}

/// Join `file` onto `root` and clean the result with [`clean_path`].
#[must_use]
pub fn join_root(root: &str, file: &str) -> String {
    match (root.is_empty(), file.is_empty()) {
        (true, true) => String::new(),
        (true, false) => clean_path(file),
        (false, true) => clean_path(root),
        (false, false) => clean_path(&format!("{root}/{file}")),
    }
}

/// Lexically normalise a slash-separated path: repeated separators and `.`
/// segments are dropped, `..` removes the segment before it. A rooted path
/// stays rooted and never climbs above `/`. An empty result is `.`.
#[must_use]
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
