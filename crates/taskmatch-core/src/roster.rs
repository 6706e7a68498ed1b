//! Team roster parsing.
//!
//! Each non-empty line of the form `Name: skills` (or `Name - skills`)
//! becomes a [`Team`]. The separator is whichever of `:` or `-` occurs
//! first in the line; the remainder after it is kept verbatim (trimmed).
//! A repeated name overwrites the earlier skills but keeps its position.
//!
//! A line with no separator becomes `"General Team"`, but only when it is
//! the first roster entry; later unlabeled lines are ignored.

use crate::models::Team;

/// Name used for an unlabeled first line.
pub const GENERAL_TEAM: &str = "General Team";

/// Insertion-ordered team name → skills mapping with last-write-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRoster {
    teams: Vec<Team>,
}

impl TeamRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a team's skills.
    pub fn insert(&mut self, name: impl Into<String>, skills: impl Into<String>) {
        let name = name.into();
        let skills = skills.into();
        match self.teams.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.skills = skills,
            None => self.teams.push(Team { name, skills }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.skills.as_str())
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl FromIterator<(String, String)> for TeamRoster {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut roster = TeamRoster::new();
        for (name, skills) in iter {
            roster.insert(name, skills);
        }
        roster
    }
}

/// Parse team skills from arbitrary multi-line text.
///
/// ```rust
/// use taskmatch_core::roster::parse_team_skills;
///
/// let roster = parse_team_skills("Backend: Python, APIs\nFrontend - UI, React");
/// assert_eq!(roster.get("Backend"), Some("Python, APIs"));
/// assert_eq!(roster.get("Frontend"), Some("UI, React"));
/// ```
pub fn parse_team_skills(text: &str) -> TeamRoster {
    let mut roster = TeamRoster::new();
    let mut roster_started = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.find([':', '-']) {
            Some(idx) => {
                let name = line[..idx].trim();
                // Separator sits at a 1-byte ASCII char.
                let skills = line[idx + 1..].trim();
                if name.is_empty() {
                    continue;
                }
                roster.insert(name, skills);
                roster_started = true;
            }
            None if !roster_started => {
                roster.insert(GENERAL_TEAM, line);
                roster_started = true;
            }
            None => {}
        }
    }

    roster
}
