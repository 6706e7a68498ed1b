//! Line-oriented task extraction.
//!
//! Turns a free-form project description into discrete task strings.
//!
//! # Algorithm
//!
//! For every non-empty trimmed line:
//!
//! 1. If it starts with a bullet (`- `, `• `, `* `, `→ `, `» `) or an
//!    enumeration (`1.`…`9.`, `1)`…`9)`), emit the remainder with the
//!    marker stripped.
//! 2. Otherwise, if the lowercased line contains one of the action
//!    keywords, emit the whole trimmed line.
//! 3. Otherwise drop it.
//!
//! Order is preserved and duplicates are kept.
//!
//! ```rust
//! use taskmatch_core::extract::extract_tasks;
//!
//! let tasks = extract_tasks("Intro\n- Implement login\n2) Build dashboard");
//! assert_eq!(tasks, vec!["Implement login", "Build dashboard"]);
//! ```

const BULLET_MARKERS: [&str; 5] = ["- ", "• ", "* ", "→ ", "» "];

const TASK_KEYWORDS: [&str; 11] = [
    "task:",
    "implement",
    "develop",
    "create",
    "build",
    "design",
    "configure",
    "setup",
    "integrate",
    "optimize",
    "test",
];

/// Extract task strings from arbitrary multi-line text.
pub fn extract_tasks(text: &str) -> Vec<String> {
    let mut tasks = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = strip_marker(line) {
            // A bare marker ("1.") carries no task text.
            let rest = rest.trim();
            if !rest.is_empty() {
                tasks.push(rest.to_string());
            }
            continue;
        }

        if has_task_keyword(line) {
            tasks.push(line.to_string());
        }
    }

    tasks
}

/// Strip a leading bullet or single-digit enumeration marker.
fn strip_marker(line: &str) -> Option<&str> {
    for marker in BULLET_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest);
        }
    }

    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some('1'..='9'), Some('.' | ')')) => Some(&line[2..]),
        _ => None,
    }
}

fn has_task_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    TASK_KEYWORDS.iter().any(|kw| lower.contains(kw))
}
