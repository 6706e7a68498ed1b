//! Human-readable renderings of an [`AssignmentTable`].
//!
//! - [`format_results`]: structured, one block per team.
//! - [`format_results_natural`]: one sentence per team.
//!
//! Teams without matches are omitted. When no team has a match, each
//! renderer returns its fixed "no matches" message instead of an empty
//! string.

use crate::models::AssignmentTable;

pub const NO_MATCHES_STRUCTURED: &str = "No matches found.";
pub const NO_MATCHES_NATURAL: &str = "No task assignments could be determined.";

/// Format a score as a percentage with two decimals (`0.8512` → `85.12%`).
pub fn format_percent(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}

/// Structured report: team header, then each task with its confidence.
///
/// ```text
/// Team: Backend
/// Matched Tasks:
/// - Implement login
///   Confidence: 84.10%
/// ```
pub fn format_results(table: &AssignmentTable) -> String {
    if !table.has_matches() {
        return NO_MATCHES_STRUCTURED.to_string();
    }

    let mut blocks = Vec::new();
    for assignment in table.teams().iter().filter(|t| !t.is_empty()) {
        let mut lines = vec![
            format!("Team: {}", assignment.team()),
            "Matched Tasks:".to_string(),
        ];
        for m in assignment.matches() {
            lines.push(format!("- {}", m.task));
            lines.push(format!("  Confidence: {}", format_percent(m.score)));
        }
        blocks.push(lines.join("\n"));
    }
    blocks.join("\n\n")
}

/// Natural-language report, one sentence per team with matches.
pub fn format_results_natural(table: &AssignmentTable) -> String {
    if !table.has_matches() {
        return NO_MATCHES_NATURAL.to_string();
    }

    table
        .teams()
        .iter()
        .filter(|t| !t.is_empty())
        .map(|assignment| {
            let tasks: Vec<String> = assignment
                .matches()
                .iter()
                .map(|m| format!("'{}' (confidence: {})", m.task, format_percent(m.score)))
                .collect();
            format!(
                "The {} is best suited for the tasks: {}.",
                assignment.team(),
                tasks.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}
