//! Directory traversal for `recursive` entries

use logrotor_domain::traits::PathWalker;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Depth-first walker yielding the files of leaf directories
///
/// Entries of each directory are visited in descending lexicographic order.
/// Files are candidates only when their directory has no subdirectories;
/// symlinks to directories count as directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkdirWalker;

impl WalkdirWalker {
    /// Create a walker
    pub fn new() -> Self {
        Self
    }
}

fn is_leaf(dir: &Path) -> walkdir::Result<bool> {
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        if entry?.file_type().is_dir() {
            return Ok(false);
        }
    }
    Ok(true)
}

impl PathWalker for WalkdirWalker {
    type Error = walkdir::Error;

    fn walk(&self, root: &Path) -> Result<Vec<PathBuf>, Self::Error> {
        let mut leaves: HashMap<PathBuf, bool> = HashMap::new();
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .sort_by(|a, b| b.file_name().cmp(a.file_name()));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }

            let parent = entry.path().parent().unwrap_or(root).to_path_buf();
            let leaf = match leaves.get(&parent) {
                Some(leaf) => *leaf,
                None => {
                    let leaf = is_leaf(&parent)?;
                    leaves.insert(parent, leaf);
                    leaf
                }
            };

            if leaf {
                files.push(entry.into_path());
            } else {
                tracing::debug!("{} is not in a leaf directory, skipping", entry.path().display());
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_leaf_files_in_descending_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        for name in ["a/1.log", "a/2.log", "b/x.log", "b/y.log"] {
            fs::write(root.join(name), "").unwrap();
        }

        let files = WalkdirWalker::new().walk(root).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("b/y.log"),
                root.join("b/x.log"),
                root.join("a/2.log"),
                root.join("a/1.log"),
            ]
        );
    }

    #[test]
    fn test_files_beside_subdirectories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("nested/deeper")).unwrap();
        fs::write(root.join("top.log"), "").unwrap();
        fs::write(root.join("nested/mid.log"), "").unwrap();
        fs::write(root.join("nested/deeper/leaf.log"), "").unwrap();

        let files = WalkdirWalker::new().walk(root).unwrap();
        assert_eq!(files, vec![root.join("nested/deeper/leaf.log")]);
    }

    #[test]
    fn test_flat_directory_is_a_leaf() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.log"), "").unwrap();
        fs::write(dir.path().join("c.log"), "").unwrap();

        let files = WalkdirWalker::new().walk(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("c.log"), dir.path().join("a.log")]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(WalkdirWalker::new().walk(&dir.path().join("gone")).is_err());
    }
}
