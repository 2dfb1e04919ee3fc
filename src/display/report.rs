//! Text rendering for the redundancy analysis.

use crate::analysis::{NameGroupReport, RedundancyGroup, RedundancyReport};
use crate::display::Theme;
use crate::storage::{split_identifier, truncate_chars};
use std::fmt::Write;

const RULE_WIDTH: usize = 70;

/// Render the full analysis: critical, potential, then name patterns.
pub fn render_analysis(
    report: &RedundancyReport,
    names: &NameGroupReport,
    theme: &Theme,
) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    let critical_pct = percent(report.thresholds.critical);
    let potential_pct = percent(report.thresholds.potential);

    let heading = format!(
        "CRITICAL REDUNDANCIES (>{critical_pct} similarity - likely duplicates):"
    );
    let _ = writeln!(out, "\n{}", theme.apply(&theme.critical, heading));
    let _ = writeln!(out, "{rule}");
    if report.critical.is_empty() {
        let _ = writeln!(out, "   No critical redundancies found");
    } else {
        for group in &report.critical {
            render_group(&mut out, group, theme);
        }
    }

    let heading = format!(
        "POTENTIAL REDUNDANCIES ({potential_pct}-{critical_pct} similarity - consider merging):"
    );
    let _ = writeln!(out, "\n{}", theme.apply(&theme.potential, heading));
    let _ = writeln!(out, "{rule}");
    if report.potential.is_empty() {
        let _ = writeln!(out, "   No additional potential redundancies found");
    } else {
        for group in &report.potential {
            render_group(&mut out, group, theme);
        }
    }

    out.push_str(&render_name_patterns(names, theme));
    out
}

/// Render base-name groups with the per-group display cap.
pub fn render_name_patterns(names: &NameGroupReport, theme: &Theme) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", theme.apply(&theme.header, "REDUNDANCY PATTERNS:"));
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "\nFunctions with similar base names (potential for consolidation):"
    );

    if names.is_empty() {
        let _ = writeln!(out, "   No shared base names found");
        return out;
    }

    for group in &names.groups {
        let _ = writeln!(
            out,
            "\n• '{}' pattern ({} functions):",
            theme.apply(&theme.code, &group.base),
            group.members.len()
        );
        for member in names.shown(group) {
            let (file, name) = split_identifier(member);
            let _ = writeln!(
                out,
                "  - {} in {}",
                theme.apply(&theme.code, name),
                theme.apply(&theme.path, file)
            );
        }
        let hidden = names.hidden(group);
        if hidden > 0 {
            let _ = writeln!(out, "  ... and {hidden} more");
        }
    }
    out
}

fn render_group(out: &mut String, group: &RedundancyGroup, theme: &Theme) {
    let (file, name) = split_identifier(&group.anchor);
    let _ = writeln!(out, "\n> {}", theme.apply(&theme.code, name));
    let _ = writeln!(out, "   File: {}", theme.apply(&theme.path, file));
    let _ = writeln!(out, "   Similar functions:");
    for member in &group.members {
        let (file, name) = split_identifier(&member.id);
        let _ = writeln!(
            out,
            "   • {name} ({}) - {} match",
            theme.apply(&theme.path, file),
            theme.apply(&theme.score, percent(member.score))
        );
    }
}

/// Similarity as a percentage with one decimal, e.g. `92.3%`.
pub fn percent(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Bounded single-line preview; `...` marks truncation.
pub fn preview_snippet(preview: &str, max_chars: usize) -> String {
    let flat = preview.split_whitespace().collect::<Vec<_>>().join(" ");
    let snippet = truncate_chars(&flat, max_chars);
    if snippet.len() < flat.len() {
        format!("{snippet}...")
    } else {
        snippet
    }
}
