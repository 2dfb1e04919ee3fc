//! Table formatting utilities for structured output.

use crate::analysis::{DuplicatePair, RankedArtifact};
use crate::display::report::preview_snippet;
use crate::indexing::BuildSummary;
use comfy_table::{
    Attribute, Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

/// Characters of preview shown per search result.
pub const SEARCH_PREVIEW_CHARS: usize = 100;

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    /// Create a new table builder.
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        // Apply rounded corners
        table.apply_modifier(UTF8_ROUND_CORNERS);
        Self { table }
    }

    /// Set the table headers.
    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    /// Add a row to the table.
    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    /// Add a row of pre-styled cells.
    pub fn add_cells(mut self, row: Vec<Cell>) -> Self {
        self.table.add_row(row);
        self
    }

    /// Build and return the formatted table.
    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// Ranked search results: rank, file, similarity, category, name, preview.
pub fn create_search_table(results: &[RankedArtifact<'_>]) -> String {
    let builder = TableBuilder::new().set_headers(vec![
        "#",
        "File",
        "Similarity",
        "Type",
        "Name",
        "Preview",
    ]);

    results
        .iter()
        .enumerate()
        .fold(builder, |builder, (i, result)| {
            builder.add_row(vec![
                (i + 1).to_string(),
                result.record.location.clone(),
                format!("{:.3}", result.score),
                result.record.category.clone(),
                result.record.name.clone(),
                preview_snippet(result.preview(), SEARCH_PREVIEW_CHARS),
            ])
        })
        .build()
}

/// All-pairs duplicates, best first.
pub fn create_duplicates_table(pairs: &[DuplicatePair]) -> String {
    let builder = TableBuilder::new().set_headers(vec!["First", "Second", "Similarity"]);

    pairs
        .iter()
        .fold(builder, |builder, pair| {
            builder.add_cells(vec![
                Cell::new(&pair.first),
                Cell::new(&pair.second),
                Cell::new(format!("{:.3}", pair.score)).fg(score_color(pair.score)),
            ])
        })
        .build()
}

/// Summary of an index build.
pub fn create_index_summary_table(summary: &BuildSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);

    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec!["Files found", &summary.files_found.to_string()]);
    table.add_row(vec!["Embedded", &summary.embedded.to_string()]);
    table.add_row(vec!["Failed", &summary.failed.to_string()]);
    table.add_row(vec![
        "Dimension",
        &summary
            .dimension
            .map_or_else(|| "-".to_string(), |d| d.to_string()),
    ]);
    table.add_row(vec!["Time", &format!("{:.2?}", summary.elapsed)]);

    let (status, color) = if summary.cancelled {
        ("⚠ Interrupted, partial index saved", Color::Yellow)
    } else {
        ("✓ Complete", Color::Green)
    };
    table.add_row(vec![
        Cell::new("Status"),
        Cell::new(status).fg(color).add_attribute(Attribute::Bold),
    ]);

    table.to_string()
}

fn score_color(score: f32) -> Color {
    if score >= 0.95 {
        Color::Red
    } else if score >= 0.90 {
        Color::Yellow
    } else {
        Color::Reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArtifactRecord;
    use std::time::Duration;

    #[test]
    fn test_table_builder() {
        let table = TableBuilder::new()
            .set_headers(vec!["Column 1", "Column 2"])
            .add_row(vec!["Value 1".to_string(), "Value 2".to_string()])
            .build();

        assert!(table.contains("Column 1"));
        assert!(table.contains("Value 1"));
    }

    #[test]
    fn test_search_table_rows() {
        let record = ArtifactRecord::new("ui/wallet.ts", "wallet", "ts", vec![1.0])
            .with_preview("export function connectWallet() {}", 200);
        let results = [RankedArtifact {
            record: &record,
            score: 0.87654,
        }];

        let table = create_search_table(&results);
        assert!(table.contains("ui/wallet.ts"));
        assert!(table.contains("0.877"));
        assert!(table.contains("connectWallet"));
    }

    #[test]
    fn test_duplicates_table_rows() {
        let pairs = [DuplicatePair {
            first: "a.ts:a".to_string(),
            second: "b.ts:b".to_string(),
            score: 0.9,
        }];
        let table = create_duplicates_table(&pairs);
        assert!(table.contains("a.ts:a"));
        assert!(table.contains("0.900"));
    }

    #[test]
    fn test_index_summary_marks_interruption() {
        let summary = BuildSummary {
            files_found: 10,
            embedded: 4,
            failed: 1,
            cancelled: true,
            dimension: Some(384),
            elapsed: Duration::from_millis(1500),
        };
        let table = create_index_summary_table(&summary);
        assert!(table.contains("384"));
        assert!(table.contains("partial index saved"));
    }
}
