//! Artifact records held by the embedding store.

use serde::{Deserialize, Serialize};

/// Separator between location and name in an artifact identifier, and
/// between the leading name segment and any variant suffix.
pub const IDENTIFIER_SEPARATOR: char = ':';

/// One embedded code artifact (a file or a function).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Source location, usually a file path
    pub location: String,

    /// Symbol name, or the file stem for file-level artifacts
    pub name: String,

    /// Artifact kind or file extension
    pub category: String,

    /// Bounded prefix of the source, for display only
    pub preview: String,

    /// Embedding vector; empty when the provider had no vector for it
    pub embedding: Vec<f32>,
}

impl ArtifactRecord {
    /// Create a record without a preview.
    pub fn new(
        location: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            location: location.into(),
            name: name.into(),
            category: category.into(),
            preview: String::new(),
            embedding,
        }
    }

    /// Attach a display preview, truncated to `max_chars` characters.
    #[must_use]
    pub fn with_preview(mut self, content: &str, max_chars: usize) -> Self {
        self.preview = truncate_chars(content, max_chars);
        self
    }

    /// Composite identifier `location:name`.
    ///
    /// Identifiers are not unique; two records with the same identifier are
    /// treated as the same artifact when claims are resolved.
    pub fn id(&self) -> String {
        format!("{}{IDENTIFIER_SEPARATOR}{}", self.location, self.name)
    }

    /// Name up to the first separator, e.g. `render` for `render:2`.
    pub fn leading_name(&self) -> &str {
        leading_segment(&self.name)
    }

    /// `location:leading_name`, the form fed to base-name grouping.
    pub fn qualified_symbol(&self) -> String {
        format!(
            "{}{IDENTIFIER_SEPARATOR}{}",
            self.location,
            self.leading_name()
        )
    }

    /// True when both records come from the same location and share a
    /// leading name segment: textual variants of one symbol.
    pub fn is_likely_overload_of(&self, other: &ArtifactRecord) -> bool {
        self.location == other.location && self.leading_name() == other.leading_name()
    }

    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }
}

/// Portion of `name` before the first separator.
pub fn leading_segment(name: &str) -> &str {
    name.split(IDENTIFIER_SEPARATOR).next().unwrap_or(name)
}

/// Split an identifier into `(location, name)` at the first separator.
///
/// Identifiers without a separator are returned as both parts.
pub fn split_identifier(id: &str) -> (&str, &str) {
    id.split_once(IDENTIFIER_SEPARATOR).unwrap_or((id, id))
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_and_leading_name() {
        let record = ArtifactRecord::new("ui/utils/price.ts", "formatPrice:2", "ts", vec![1.0]);
        assert_eq!(record.id(), "ui/utils/price.ts:formatPrice:2");
        assert_eq!(record.leading_name(), "formatPrice");
        assert_eq!(record.qualified_symbol(), "ui/utils/price.ts:formatPrice");
    }

    #[test]
    fn test_likely_overload() {
        let a = ArtifactRecord::new("a.ts", "render:1", "ts", vec![]);
        let b = ArtifactRecord::new("a.ts", "render:2", "ts", vec![]);
        let c = ArtifactRecord::new("b.ts", "render:1", "ts", vec![]);
        let d = ArtifactRecord::new("a.ts", "renderRow", "ts", vec![]);

        assert!(a.is_likely_overload_of(&b));
        assert!(!a.is_likely_overload_of(&c));
        assert!(!a.is_likely_overload_of(&d));
    }

    #[test]
    fn test_split_identifier() {
        assert_eq!(
            split_identifier("ui/a.vue:Wallet:compact"),
            ("ui/a.vue", "Wallet:compact")
        );
        assert_eq!(split_identifier("standalone"), ("standalone", "standalone"));
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("", 5), "");

        let record = ArtifactRecord::new("a.ts", "a", "ts", vec![]).with_preview("abcdef", 3);
        assert_eq!(record.preview, "abc");
    }
}
