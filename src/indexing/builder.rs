//! Batch embedding of source files into an [`EmbeddingStore`].
//!
//! Files are read lazily, one chunk per file, and the read loop stops as soon
//! as the shared cancellation flag is raised. Whatever was embedded before
//! that point is returned so the caller can still persist it.

use crate::config::Settings;
use crate::indexing::FileWalker;
use crate::storage::{ArtifactRecord, EmbeddingStore, IndexPersistence, truncate_chars};
use crate::vector::TextEmbedder;
use crate::{IndexError, IndexResult};
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One file prepared for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceChunk {
    /// Path as discovered by the walker
    pub location: String,
    /// File stem
    pub name: String,
    /// File extension without the dot
    pub category: String,
    /// Leading `max_chars` characters of the file
    pub content: String,
}

impl SourceChunk {
    /// Read `path` lossily and keep its first `max_chars` characters.
    pub fn read(path: &Path, max_chars: usize) -> IndexResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| IndexError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let content = truncate_chars(&String::from_utf8_lossy(&bytes), max_chars);

        Ok(Self {
            location: path.display().to_string(),
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            category: path
                .extension()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            content,
        })
    }

    /// Text handed to the embedder: kind, name and path ahead of the source.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} file: {}\nPath: {}\n{}",
            self.category, self.name, self.location, self.content
        )
    }
}

/// Lazily reads chunks until the paths run out or the flag is raised.
pub struct SourceChunks {
    paths: std::vec::IntoIter<PathBuf>,
    max_chars: usize,
    cancel: Arc<AtomicBool>,
}

impl SourceChunks {
    pub fn new(paths: Vec<PathBuf>, max_chars: usize, cancel: Arc<AtomicBool>) -> Self {
        Self {
            paths: paths.into_iter(),
            max_chars,
            cancel,
        }
    }
}

impl Iterator for SourceChunks {
    type Item = IndexResult<SourceChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.load(Ordering::Relaxed) {
            return None;
        }
        let path = self.paths.next()?;
        Some(SourceChunk::read(&path, self.max_chars))
    }
}

/// Counters reported after a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildSummary {
    /// Files matched by the walker
    pub files_found: usize,
    /// Records added to the store
    pub embedded: usize,
    /// Files that could not be read or came back without a vector
    pub failed: usize,
    /// Whether the build stopped early
    pub cancelled: bool,
    /// Dimension of the stored vectors
    pub dimension: Option<usize>,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Where a finished build is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// Replace the configured index
    Index(PathBuf),
    /// Interrupted over an existing index; write beside it
    Partial(PathBuf),
    /// Nothing embedded; any existing index stays as it is
    Skip,
}

impl SaveTarget {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Index(path) | Self::Partial(path) => Some(path),
            Self::Skip => None,
        }
    }
}

impl BuildSummary {
    /// Decide where this build's store should be saved.
    pub fn save_target(&self, persistence: &IndexPersistence) -> SaveTarget {
        if self.embedded == 0 {
            SaveTarget::Skip
        } else if self.cancelled && persistence.exists() {
            SaveTarget::Partial(persistence.partial_path())
        } else {
            SaveTarget::Index(persistence.path().to_path_buf())
        }
    }
}

/// Walks a directory and embeds every matching file.
pub struct IndexBuilder<'e> {
    embedder: &'e dyn TextEmbedder,
    walker: FileWalker,
    max_chars: usize,
    preview_chars: usize,
    cancel: Arc<AtomicBool>,
}

impl<'e> IndexBuilder<'e> {
    pub fn new(embedder: &'e dyn TextEmbedder, settings: &Settings) -> Self {
        Self {
            embedder,
            walker: FileWalker::new(&settings.indexing),
            max_chars: settings.embedding.max_chars,
            preview_chars: settings.embedding.preview_chars,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an externally owned cancellation flag (e.g. set on Ctrl-C).
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Files the build would embed, in walk order.
    pub fn discover(&self, root: &Path) -> IndexResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(IndexError::FileRead {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "directory does not exist",
                ),
            });
        }
        Ok(self.walker.walk(root).collect())
    }

    /// Embed every file under `root`.
    ///
    /// Unreadable files and empty embeddings are counted as failures and
    /// skipped. The progress bar advances once per file; pass
    /// `ProgressBar::hidden()` for silent builds.
    pub fn build(
        &self,
        root: &Path,
        progress: &ProgressBar,
    ) -> IndexResult<(EmbeddingStore, BuildSummary)> {
        let start = Instant::now();
        let paths = self.discover(root)?;
        let files_found = paths.len();
        info!(root = %root.display(), files = files_found, "Embedding source files");

        progress.set_length(files_found as u64);
        let mut store = EmbeddingStore::with_model(self.embedder.model_name());
        let mut failed = 0usize;

        for chunk in SourceChunks::new(paths, self.max_chars, self.cancel_flag()) {
            progress.inc(1);
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("Skipping file: {e}");
                    failed += 1;
                    continue;
                }
            };

            let embedding = self.embedder.embed(&chunk.embedding_text());
            if embedding.is_empty() {
                debug!(file = %chunk.location, "No embedding returned");
                failed += 1;
                continue;
            }

            store.push(
                ArtifactRecord::new(chunk.location, chunk.name, chunk.category, embedding)
                    .with_preview(&chunk.content, self.preview_chars),
            );
        }

        let cancelled = self.cancel.load(Ordering::Relaxed);
        if cancelled {
            warn!(embedded = store.len(), "Build interrupted, keeping partial results");
        }

        let summary = BuildSummary {
            files_found,
            embedded: store.len(),
            failed,
            cancelled,
            dimension: store.dimension(),
            elapsed: start.elapsed(),
        };
        Ok((store, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::EmbeddingError;
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    /// Embeds text length; fails for texts mentioning "broken".
    struct LengthEmbedder;

    impl TextEmbedder for LengthEmbedder {
        fn try_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if text.contains("broken") {
                return Err(EmbeddingError::EmbeddingFailed("refused".to_string()));
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        fn model_name(&self) -> &str {
            "length"
        }
    }

    /// Raises the cancellation flag after `limit` calls.
    struct CancellingEmbedder {
        calls: AtomicUsize,
        limit: usize,
        cancel: Arc<AtomicBool>,
    }

    impl TextEmbedder for CancellingEmbedder {
        fn try_embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.limit {
                self.cancel.store(true, Ordering::SeqCst);
            }
            Ok(vec![1.0, 0.0])
        }

        fn model_name(&self) -> &str {
            "cancelling"
        }
    }

    #[test]
    fn test_chunk_text_and_truncation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("price.ts");
        fs::write(&path, "é".repeat(1500)).unwrap();

        let chunk = SourceChunk::read(&path, 1000).unwrap();
        assert_eq!(chunk.name, "price");
        assert_eq!(chunk.category, "ts");
        assert_eq!(chunk.content.chars().count(), 1000);

        let text = chunk.embedding_text();
        assert!(text.starts_with("ts file: price\nPath: "));
        assert!(text.contains("price.ts\n"));
    }

    #[test]
    fn test_build_skips_failed_embeddings() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.ts"), "export const a = 1;").unwrap();
        fs::write(root.join("b.ts"), "// broken").unwrap();
        fs::write(root.join("c.vue"), "<template/>").unwrap();
        fs::write(root.join("notes.md"), "ignored").unwrap();

        let settings = Settings::default();
        let builder = IndexBuilder::new(&LengthEmbedder, &settings);
        let (store, summary) = builder.build(root, &ProgressBar::hidden()).unwrap();

        assert_eq!(summary.files_found, 3);
        assert_eq!(summary.embedded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.cancelled);
        assert_eq!(summary.dimension, Some(2));
        assert_eq!(store.model(), Some("length"));

        let names: Vec<_> = store.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(store.all()[0].preview, "export const a = 1;");
        assert_eq!(store.all()[1].category, "vue");
    }

    #[test]
    fn test_cancel_keeps_partial_results() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for i in 0..6 {
            fs::write(root.join(format!("f{i}.ts")), "export {}").unwrap();
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let embedder = CancellingEmbedder {
            calls: AtomicUsize::new(0),
            limit: 2,
            cancel: Arc::clone(&cancel),
        };
        let settings = Settings::default();
        let builder = IndexBuilder::new(&embedder, &settings).with_cancel_flag(cancel);
        let (store, summary) = builder.build(root, &ProgressBar::hidden()).unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.files_found, 6);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_save_target_protects_existing_index() {
        let temp_dir = TempDir::new().unwrap();
        let index = temp_dir.path().join("index.json");
        let persistence = IndexPersistence::new(&index);
        let summary = |embedded, cancelled| BuildSummary {
            files_found: 4,
            embedded,
            failed: 0,
            cancelled,
            dimension: Some(2),
            elapsed: Duration::ZERO,
        };

        // No index on disk yet: partial results become the index
        assert_eq!(
            summary(2, true).save_target(&persistence),
            SaveTarget::Index(index.clone())
        );

        fs::write(&index, "[]").unwrap();
        assert_eq!(
            summary(4, false).save_target(&persistence),
            SaveTarget::Index(index.clone())
        );
        assert_eq!(
            summary(2, true).save_target(&persistence),
            SaveTarget::Partial(temp_dir.path().join("index.partial.json"))
        );
        assert_eq!(summary(0, false).save_target(&persistence), SaveTarget::Skip);
        assert_eq!(summary(0, true).save_target(&persistence), SaveTarget::Skip);
        assert_eq!(SaveTarget::Skip.path(), None);
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let builder = IndexBuilder::new(&LengthEmbedder, &settings);
        let result = builder.build(&temp_dir.path().join("nope"), &ProgressBar::hidden());
        assert!(matches!(result, Err(IndexError::FileRead { .. })));
    }
}
