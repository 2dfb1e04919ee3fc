//! Consistent color theme and styling for terminal output.

use console::Style;
use owo_colors::OwoColorize;
use std::sync::LazyLock;

/// Global theme instance for consistent styling across the application.
pub static THEME: LazyLock<Theme> = LazyLock::new(Theme::default);

/// Color theme for terminal output.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Whether styles are applied at all
    pub colors: bool,
    /// Success/positive indicators
    pub success: Style,
    /// Error/failure indicators
    pub error: Style,
    /// Critical redundancy headings
    pub critical: Style,
    /// Potential redundancy headings
    pub potential: Style,
    /// Headers and titles
    pub header: Style,
    /// Dimmed/secondary text
    pub dim: Style,
    /// File paths
    pub path: Style,
    /// Similarity scores
    pub score: Style,
    /// Symbol names
    pub code: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::with_colors(!Self::should_disable_colors())
    }
}

impl Theme {
    fn with_colors(colors: bool) -> Self {
        Self {
            colors,
            success: Style::new().green().bright(),
            error: Style::new().red().bright(),
            critical: Style::new().red().bold(),
            potential: Style::new().yellow().bold(),
            header: Style::new().cyan().bold(),
            dim: Style::new().dim(),
            path: Style::new().magenta(),
            score: Style::new().cyan(),
            code: Style::new().yellow(),
        }
    }

    /// Theme that never emits escape codes.
    pub fn plain() -> Self {
        Self::with_colors(false)
    }

    /// Format a success message with checkmark.
    pub fn success_with_icon(&self, text: &str) -> String {
        if self.colors {
            format!("{} {}", "✓".green(), self.success.apply_to(text))
        } else {
            format!("✓ {text}")
        }
    }

    /// Format an error message with X mark.
    pub fn error_with_icon(&self, text: &str) -> String {
        if self.colors {
            format!("{} {}", "✗".red(), self.error.apply_to(text))
        } else {
            format!("✗ {text}")
        }
    }

    /// Format a warning message with warning sign.
    pub fn warning_with_icon(&self, text: &str) -> String {
        if self.colors {
            format!("{} {}", "⚠".yellow(), self.potential.apply_to(text))
        } else {
            format!("⚠ {text}")
        }
    }

    /// Check if color output should be disabled.
    pub fn should_disable_colors() -> bool {
        use is_terminal::IsTerminal;
        std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal()
    }

    /// Apply theme styling conditionally based on terminal support.
    pub fn apply<T: std::fmt::Display>(&self, style: &Style, text: T) -> String {
        if self.colors {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}
