//! File system walker for discovering source files to embed
//!
//! This module provides directory traversal with support for:
//! - .gitignore rules
//! - Excluded directory names from configuration
//! - Extension filtering
//! - Hidden file handling

use crate::config::IndexingConfig;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walks directories to find source files to embed
#[derive(Debug, Clone)]
pub struct FileWalker {
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
}

impl FileWalker {
    /// Create a new file walker from the indexing settings
    pub fn new(config: &IndexingConfig) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            exclude_dirs: config.exclude_dirs.clone(),
        }
    }

    /// Walk a directory and return an iterator of files to embed.
    ///
    /// Entries are visited in file-name order so repeated builds produce the
    /// same store order.
    pub fn walk(&self, root: &Path) -> impl Iterator<Item = PathBuf> + use<> {
        let mut builder = WalkBuilder::new(root);

        // Configure the walker
        builder
            .hidden(true) // Skip hidden files and directories
            .git_ignore(true) // Respect .gitignore files
            .git_global(true) // Respect global gitignore
            .git_exclude(true) // Respect .git/info/exclude
            .follow_links(false) // Don't follow symlinks
            .require_git(false) // Allow gitignore to work in non-git directories
            .sort_by_file_name(|a, b| a.cmp(b));

        builder.add_custom_ignore_filename(".redundexignore");

        let exclude_dirs = self.exclude_dirs.clone();
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| exclude_dirs.iter().any(|d| d == name)))
        });

        let extensions = self.extensions.clone();
        builder
            .build()
            .filter_map(Result::ok) // Skip files we can't access
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter_map(move |entry| {
                let ext = entry.path().extension()?.to_str()?;
                extensions
                    .iter()
                    .any(|enabled| enabled == ext)
                    .then(|| entry.into_path())
            })
    }

    /// Count files that would be embedded
    pub fn count_files(&self, root: &Path) -> usize {
        self.walk(root).count()
    }
}
