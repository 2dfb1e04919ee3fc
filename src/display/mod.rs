//! Terminal display utilities: theme, tables, progress bars and the
//! analysis report.

pub mod progress;
pub mod report;
pub mod tables;
pub mod theme;

pub use progress::{create_progress_bar, create_spinner, with_spinner};
pub use report::{percent, preview_snippet, render_analysis, render_name_patterns};
pub use tables::{
    TableBuilder, create_duplicates_table, create_index_summary_table, create_search_table,
};
pub use theme::{THEME, Theme};
