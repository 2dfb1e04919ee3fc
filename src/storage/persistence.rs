//! JSON persistence for the embedding index
//!
//! Two on-disk shapes are understood:
//! - flat records: `{"embeddings": [{"file", "function", "embedding"}]}`
//!   (a bare top-level array of such records is accepted as well)
//! - nested chunks: `{"chunks": [{"chunk": {"file", "type", "name", "content"}, "embedding"}]}`
//!
//! Both normalize into [`ArtifactRecord`]. Saving always writes the flat shape.

use crate::storage::{ArtifactRecord, EmbeddingStore};
use crate::{IndexError, IndexResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Current on-disk format version
const FORMAT_VERSION: u32 = 1;

/// Default preview length taken from nested chunk content
pub const DEFAULT_PREVIEW_CHARS: usize = 200;

/// Flat record shape, used for both reading and writing.
#[derive(Debug, Serialize, Deserialize)]
struct FlatRecord {
    file: String,
    #[serde(alias = "name")]
    function: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preview: Option<String>,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct NestedRecord {
    chunk: ChunkFields,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ChunkFields {
    file: String,
    name: String,
    #[serde(rename = "type", default)]
    category: Option<String>,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct IndexDocument<'a> {
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension: Option<usize>,
    created_at: String,
    total: usize,
    embeddings: Vec<FlatRecord>,
}

/// Manages persistence of the embedding index
#[derive(Debug, Clone)]
pub struct IndexPersistence {
    path: PathBuf,
    preview_chars: usize,
}

impl IndexPersistence {
    /// Create a persistence manager for the index file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Preview length used when normalizing nested chunk content
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file that receives an interrupted build without touching
    /// the complete index.
    pub fn partial_path(&self) -> PathBuf {
        self.path.with_extension("partial.json")
    }

    /// Check if the index file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the index into an [`EmbeddingStore`], preserving record order
    pub fn load(&self) -> IndexResult<EmbeddingStore> {
        if !self.exists() {
            return Err(IndexError::IndexNotFound {
                path: self.path.clone(),
            });
        }

        let file = File::open(&self.path).map_err(|source| IndexError::FileRead {
            path: self.path.clone(),
            source,
        })?;
        let document: Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| self.corrupt(e))?;

        let (model, raw_records) = match document {
            Value::Array(records) => (None, records),
            Value::Object(mut map) => {
                let model = map
                    .get("model")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let mut records = Vec::new();
                let mut found = false;
                for key in ["embeddings", "chunks"] {
                    match map.remove(key) {
                        Some(Value::Array(items)) => {
                            found = true;
                            records.extend(items);
                        }
                        Some(_) => {
                            return Err(self.corrupt(format!("`{key}` must be an array")));
                        }
                        None => {}
                    }
                }
                if !found {
                    return Err(self.corrupt("missing `embeddings` or `chunks` array"));
                }
                (model, records)
            }
            _ => return Err(self.corrupt("expected an object or an array of records")),
        };

        let mut store = raw_records
            .into_iter()
            .enumerate()
            .map(|(i, raw)| self.normalize(i, raw))
            .collect::<IndexResult<EmbeddingStore>>()?;
        store.set_model(model);

        let mismatched = store.mismatched_dimensions();
        if mismatched > 0 {
            warn!(
                mismatched,
                dimension = ?store.dimension(),
                "Index contains embeddings of differing dimensions; they will compare as 0"
            );
        }
        debug!(
            records = store.len(),
            path = %self.path.display(),
            "Loaded embedding index"
        );

        Ok(store)
    }

    /// Write the store in the flat shape
    pub fn save(&self, store: &EmbeddingStore) -> IndexResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| IndexError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let document = IndexDocument {
            version: FORMAT_VERSION,
            model: store.model(),
            dimension: store.dimension(),
            created_at: chrono::Utc::now().to_rfc3339(),
            total: store.len(),
            embeddings: store
                .iter()
                .map(|record| FlatRecord {
                    file: record.location.clone(),
                    function: record.name.clone(),
                    category: Some(record.category.clone()),
                    preview: (!record.preview.is_empty()).then(|| record.preview.clone()),
                    embedding: record.embedding.clone(),
                })
                .collect(),
        };

        // Write next to the target and rename so readers never see a partial file
        let tmp_path = self.path.with_extension("json.tmp");
        let write_err = |source| IndexError::FileWrite {
            path: tmp_path.clone(),
            source,
        };
        let file = File::create(&tmp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &document).map_err(|source| {
            IndexError::Serialization {
                path: self.path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(write_err)?;
        drop(writer);

        std::fs::rename(&tmp_path, &self.path).map_err(|source| IndexError::FileWrite {
            path: self.path.clone(),
            source,
        })?;

        debug!(records = store.len(), path = %self.path.display(), "Saved embedding index");
        Ok(())
    }

    fn normalize(&self, index: usize, raw: Value) -> IndexResult<ArtifactRecord> {
        let is_nested = raw.get("chunk").is_some();
        let record = if is_nested {
            let nested: NestedRecord = serde_json::from_value(raw)
                .map_err(|e| self.corrupt(format!("record {index}: {e}")))?;
            let category = nested
                .chunk
                .category
                .unwrap_or_else(|| extension_of(&nested.chunk.file));
            ArtifactRecord::new(
                nested.chunk.file,
                nested.chunk.name,
                category,
                nested.embedding,
            )
            .with_preview(&nested.chunk.content, self.preview_chars)
        } else {
            let flat: FlatRecord = serde_json::from_value(raw)
                .map_err(|e| self.corrupt(format!("record {index}: {e}")))?;
            let category = flat.category.unwrap_or_else(|| extension_of(&flat.file));
            let preview = flat.preview.unwrap_or_default();
            ArtifactRecord::new(flat.file, flat.function, category, flat.embedding)
                .with_preview(&preview, self.preview_chars)
        };
        Ok(record)
    }

    fn corrupt(&self, reason: impl ToString) -> IndexError {
        IndexError::IndexCorrupt {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl EmbeddingStore {
    /// Load a persisted index from `path`
    pub fn load(path: impl AsRef<Path>) -> IndexResult<Self> {
        IndexPersistence::new(path.as_ref()).load()
    }

    /// Persist this store to `path` in the flat shape
    pub fn save(&self, path: impl AsRef<Path>) -> IndexResult<()> {
        IndexPersistence::new(path.as_ref()).save(self)
    }
}

fn extension_of(file: &str) -> String {
    Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_string()
}
