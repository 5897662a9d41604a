//! Deterministic directory walk used to enumerate candidate files for
//! extractors and detectors.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walk `root` in sorted preorder, returning paths relative to `root`. The
/// sort keeps scan output reproducible across runs and platforms, which
/// matters for anything that hashes or diffs the resulting inventory.
pub fn walk(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(|p| p.to_path_buf()))
        .collect()
}
