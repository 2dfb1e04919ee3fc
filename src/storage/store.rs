//! In-memory embedding store.

use crate::storage::ArtifactRecord;

/// Insertion-ordered collection of artifact records.
///
/// Iteration order equals load order. Grouping passes rely on it for
/// deterministic first-occurrence claims, so records are never reordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingStore {
    records: Vec<ArtifactRecord>,
    model: Option<String>,
}

impl EmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store tagged with the embedding model that produced it.
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            model: Some(model.into()),
        }
    }

    pub fn push(&mut self, record: ArtifactRecord) {
        self.records.push(record);
    }

    /// All records in load order.
    pub fn all(&self) -> &[ArtifactRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub(crate) fn set_model(&mut self, model: Option<String>) {
        self.model = model;
    }

    /// Dimension of the first non-empty embedding.
    pub fn dimension(&self) -> Option<usize> {
        self.records
            .iter()
            .find(|r| r.has_embedding())
            .map(|r| r.embedding.len())
    }

    /// Number of non-empty embeddings whose length differs from
    /// [`dimension`](Self::dimension). Such records compare as similarity 0.
    pub fn mismatched_dimensions(&self) -> usize {
        let Some(dimension) = self.dimension() else {
            return 0;
        };
        self.records
            .iter()
            .filter(|r| r.has_embedding() && r.embedding.len() != dimension)
            .count()
    }

    /// Number of records without an embedding.
    pub fn missing_embeddings(&self) -> usize {
        self.records.iter().filter(|r| !r.has_embedding()).count()
    }
}

impl FromIterator<ArtifactRecord> for EmbeddingStore {
    fn from_iter<I: IntoIterator<Item = ArtifactRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
            model: None,
        }
    }
}

impl<'a> IntoIterator for &'a EmbeddingStore {
    type Item = &'a ArtifactRecord;
    type IntoIter = std::slice::Iter<'a, ArtifactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
