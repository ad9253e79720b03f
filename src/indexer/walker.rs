use std::collections::HashSet;
use std::path::Path;

use ignore::WalkBuilder;

use crate::error::{RepoMapError, Result};
use crate::index::models::rel_path;

/// Directories never descended into, on top of `.gitignore` rules.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "out",
    "target",
    "vendor",
    "coverage",
    "__pycache__",
    ".next",
    ".venv",
    "venv",
];

pub struct FileWalker {
    excluded: HashSet<String>,
}

impl FileWalker {
    pub fn new() -> Self {
        Self::with_excludes(std::iter::empty::<String>())
    }

    /// Default exclusions plus `extra` directory names.
    pub fn with_excludes<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let excluded = DEFAULT_EXCLUDED_DIRS
            .iter()
            .map(|d| d.to_string())
            .chain(extra.into_iter().map(Into::into))
            .collect();
        Self { excluded }
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    /// Relative paths of files under `root` belonging to `language`, in
    /// walk order (sorted by file name), stopping at `max_files`.
    ///
    /// An unknown language yields an empty list.
    pub fn find_files(&self, root: &Path, language: &str, max_files: usize) -> Result<Vec<String>> {
        if !root.is_dir() {
            return Err(RepoMapError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        let Some(language) = crate::REGISTRY.canonical_name(language) else {
            return Ok(Vec::new());
        };

        let mut files = Vec::new();
        if max_files == 0 {
            return Ok(files);
        }

        let excluded = self.excluded.clone();
        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                let name = entry.file_name().to_string_lossy();
                !(is_dir && entry.depth() > 0 && excluded.contains(name.as_ref()))
            })
            .build();

        for entry in walker.flatten() {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            if crate::REGISTRY.language_for_path(path) != Some(language) {
                continue;
            }
            if let Some(key) = rel_path(root, path) {
                files.push(key);
                if files.len() >= max_files {
                    tracing::debug!("{}: stopped at {} files", language, max_files);
                    break;
                }
            }
        }

        Ok(files)
    }
}

impl Default for FileWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Files under `root` for `language` with the default exclusions.
pub fn find_files_for_language(
    root: &Path,
    language: &str,
    max_files: usize,
) -> Result<Vec<String>> {
    FileWalker::new().find_files(root, language, max_files)
}
