//! Recursive filesystem scanner.
//!
//! Lists every regular file under a root directory, sorted for
//! deterministic ordering. A non-existent or unreadable root yields an
//! empty list rather than an error; unreadable subtrees are skipped.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ScannerConfig;

/// Always excluded from traversal, on top of any configured patterns.
const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.git/**",
    "**/target/**",
    "**/node_modules/**",
    "**/vectordb/**",
];

/// Recursively list regular files under `root`.
///
/// Directories are never returned. Paths are root-joined (e.g.
/// `data/notes/a.txt` for root `data`) and sorted.
pub fn scan_folder(root: &Path, config: &ScannerConfig) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let exclude_set = build_excludes(&config.exclude_globs);

    let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    let mut files = Vec::new();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude_set.is_match(relative) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    files
}

fn build_excludes(user_globs: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_EXCLUDES {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    for pattern in user_globs {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => eprintln!("Warning: ignoring invalid exclude glob '{}': {}", pattern, e),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}
