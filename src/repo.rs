//! Repository and workspace marker discovery.
//!
//! Formatting is only meaningful inside a git checkout that opts into the
//! style guide, so everything here is a filesystem existence probe: walk
//! upward for a `.git` entry, and look for a `.styleguide` marker at a
//! workspace folder's root.

use std::path::{Path, PathBuf};

/// Find the nearest ancestor directory containing a `.git` entry.
///
/// The walk starts at `path` itself and moves toward the filesystem root,
/// returning the first directory whose direct child `.git` exists. Passing
/// a file path is fine: a file has no children, so the first probe that can
/// match is the file's parent directory. Returns `None` when the root is
/// reached without a match.
///
/// `.git` is probed with `exists()` rather than `is_dir()` so that
/// worktrees and submodules, where `.git` is a file, are recognized too.
pub fn find_repo_root(path: &Path) -> Option<PathBuf> {
    for dir in path.ancestors() {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
    }
    None
}

/// Whether `dir` carries a `.styleguide` marker file at its root.
pub fn has_style_guide(dir: &Path) -> bool {
    dir.join(".styleguide").exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_without_markers_is_none() {
        assert_eq!(find_repo_root(Path::new("no/such/dir/anywhere")), None);
    }
}
