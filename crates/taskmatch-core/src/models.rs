//! Core data models shared by the matching pipeline.
//!
//! Tasks and teams are derived fresh from input text on every run. The
//! [`AssignmentTable`] is the terminal artifact of one run and exposes
//! read-only accessors only.

use serde::Serialize;

/// A dense embedding vector as returned by the provider.
pub type Embedding = Vec<f32>;

/// A team and the free-text description of its skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub name: String,
    pub skills: String,
}

/// A task that cleared the threshold for a team, with its cosine score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTask {
    pub task: String,
    pub score: f64,
}

/// A (task, team, score) triple borrowed from an [`AssignmentTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub task: &'a str,
    pub team: &'a str,
    pub score: f64,
}

/// One team's bucket: every qualifying task, best score first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAssignment {
    team: String,
    matches: Vec<ScoredTask>,
}

impl TeamAssignment {
    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn matches(&self) -> &[ScoredTask] {
        &self.matches
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Team → ordered matches, in roster order.
///
/// Invariants:
/// - each bucket is sorted by descending score; ties keep the order in
///   which tasks were pushed (original task order)
/// - a bucket may be empty
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssignmentTable {
    teams: Vec<TeamAssignment>,
}

impl AssignmentTable {
    /// Build a table from raw per-team buckets.
    ///
    /// Each bucket is stable-sorted by descending score, so equal scores
    /// keep their insertion order.
    pub fn from_buckets<I>(buckets: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<ScoredTask>)>,
    {
        let teams = buckets
            .into_iter()
            .map(|(team, mut matches)| {
                matches.sort_by(|a, b| b.score.total_cmp(&a.score));
                TeamAssignment { team, matches }
            })
            .collect();
        Self { teams }
    }

    /// All team buckets in roster order, including empty ones.
    pub fn teams(&self) -> &[TeamAssignment] {
        &self.teams
    }

    /// Look up a team's bucket by name.
    pub fn team(&self, name: &str) -> Option<&TeamAssignment> {
        self.teams.iter().find(|t| t.team == name)
    }

    /// Iterate every match across all teams.
    pub fn matches(&self) -> impl Iterator<Item = Match<'_>> {
        self.teams.iter().flat_map(|t| {
            t.matches.iter().map(move |m| Match {
                task: &m.task,
                team: &t.team,
                score: m.score,
            })
        })
    }

    pub fn match_count(&self) -> usize {
        self.teams.iter().map(|t| t.matches.len()).sum()
    }

    /// True when at least one team has at least one match.
    pub fn has_matches(&self) -> bool {
        self.matches().next().is_some()
    }

    /// Pretty-printed JSON of the whole table.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
