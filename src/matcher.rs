//! Task → team matching.
//!
//! # Pipeline
//!
//! ```text
//! project text ──extract_tasks──▶ tasks ─┐
//!                                        ├─▶ embed (once per unique string)
//! team text ──parse_team_skills──▶ roster┘          │
//!                                                   ▼
//!                       cosine(task, team) ≥ threshold ──▶ AssignmentTable
//! ```
//!
//! Embeddings are fetched sequentially: tasks first, then teams. No
//! embedding is cached across runs.

use std::collections::HashMap;

use taskmatch_core::extract::extract_tasks;
use taskmatch_core::models::{AssignmentTable, Embedding, ScoredTask};
use taskmatch_core::roster::{parse_team_skills, TeamRoster};
use taskmatch_core::similarity::cosine_similarity;

use crate::document::DocumentSource;
use crate::embedding::EmbeddingProvider;
use crate::error::MatchError;

pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Matches tasks to teams using an embedding provider and a threshold.
pub struct Matcher<'p> {
    provider: &'p dyn EmbeddingProvider,
    threshold: f64,
}

impl<'p> Matcher<'p> {
    pub fn new(provider: &'p dyn EmbeddingProvider) -> Self {
        Self {
            provider,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Match tasks to teams, surfacing any provider or data error.
    ///
    /// An empty task list or roster yields an empty table. Otherwise every
    /// roster team gets a bucket, possibly empty, in roster order.
    pub async fn try_match(
        &self,
        tasks: &[String],
        roster: &TeamRoster,
    ) -> Result<AssignmentTable, MatchError> {
        if tasks.is_empty() {
            tracing::warn!("no tasks found in the project description");
            return Ok(AssignmentTable::default());
        }
        if roster.is_empty() {
            tracing::warn!("no team information found");
            return Ok(AssignmentTable::default());
        }

        let mut cache = EmbeddingCache::default();

        let model = self.provider.model_name();
        tracing::info!(count = tasks.len(), model, "generating embeddings for tasks");
        let mut task_slots: Vec<(&str, usize)> = Vec::new();
        for task in tasks {
            // Tasks are keyed by text; a repeated task is scored once.
            if task_slots.iter().any(|(t, _)| *t == task.as_str()) {
                continue;
            }
            tracing::info!(task = %task, "getting embedding for task");
            let slot = cache.slot(self.provider, task).await?;
            task_slots.push((task.as_str(), slot));
        }

        tracing::info!(count = roster.len(), model, "generating embeddings for teams");
        let mut team_slots = Vec::with_capacity(roster.len());
        for team in roster.teams() {
            tracing::info!(team = %team.name, "getting embedding for team");
            team_slots.push((team, cache.slot(self.provider, &team.skills).await?));
        }

        tracing::info!(threshold = self.threshold, "calculating similarities");
        let mut buckets: Vec<(String, Vec<ScoredTask>)> = roster
            .teams()
            .iter()
            .map(|t| (t.name.clone(), Vec::new()))
            .collect();

        for &(task, task_slot) in &task_slots {
            for (bucket, &(team, team_slot)) in buckets.iter_mut().zip(&team_slots) {
                let score = cosine_similarity(cache.vector(task_slot), cache.vector(team_slot))?;
                tracing::debug!(task, team = %team.name, score, "similarity");
                if score >= self.threshold {
                    bucket.1.push(ScoredTask {
                        task: task.to_string(),
                        score,
                    });
                }
            }
        }

        Ok(AssignmentTable::from_buckets(buckets))
    }

    /// Like [`try_match`](Self::try_match), but a failure is logged and
    /// turned into an empty table.
    pub async fn match_tasks_to_teams(
        &self,
        tasks: &[String],
        roster: &TeamRoster,
    ) -> AssignmentTable {
        match self.try_match(tasks, roster).await {
            Ok(table) => table,
            Err(e) => {
                tracing::error!(error = %e, "error in task matching");
                AssignmentTable::default()
            }
        }
    }

    /// Load both documents, extract tasks and teams, and match them.
    pub async fn try_match_documents(
        &self,
        project: &DocumentSource,
        teams: &DocumentSource,
    ) -> Result<AssignmentTable, MatchError> {
        tracing::info!("processing inputs");
        let tasks = extract_tasks(&project.load_text()?);
        let roster = parse_team_skills(&teams.load_text()?);
        tracing::info!(tasks = tasks.len(), teams = roster.len(), "parsed inputs");
        self.try_match(&tasks, &roster).await
    }

    /// Like [`try_match_documents`](Self::try_match_documents), degrading
    /// any failure to an empty table.
    pub async fn match_documents(
        &self,
        project: &DocumentSource,
        teams: &DocumentSource,
    ) -> AssignmentTable {
        match self.try_match_documents(project, teams).await {
            Ok(table) => table,
            Err(e) => {
                tracing::error!(error = %e, "error in task matching");
                AssignmentTable::default()
            }
        }
    }
}

/// Per-run memo: each distinct string is embedded once.
#[derive(Default)]
struct EmbeddingCache<'t> {
    index: HashMap<&'t str, usize>,
    vectors: Vec<Embedding>,
}

impl<'t> EmbeddingCache<'t> {
    async fn slot(
        &mut self,
        provider: &dyn EmbeddingProvider,
        text: &'t str,
    ) -> Result<usize, MatchError> {
        if let Some(&slot) = self.index.get(text) {
            return Ok(slot);
        }
        let vector = provider.embed(text).await?;
        self.vectors.push(vector);
        let slot = self.vectors.len() - 1;
        self.index.insert(text, slot);
        Ok(slot)
    }

    fn vector(&self, slot: usize) -> &[f32] {
        &self.vectors[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use taskmatch_core::aggregate::{
        format_results, format_results_natural, NO_MATCHES_NATURAL, NO_MATCHES_STRUCTURED,
    };
    use taskmatch_core::similarity::SimilarityError;

    /// Looks texts up in a fixed table and records every call.
    struct StaticEmbedder {
        vectors: HashMap<String, Embedding>,
        calls: Mutex<Vec<String>>,
    }

    impl StaticEmbedder {
        fn new(pairs: &[(&str, Vec<f32>)]) -> Self {
            Self {
                vectors: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StaticEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding, MatchError> {
            self.calls.lock().unwrap().push(text.to_string());
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| MatchError::Config(format!("no vector for {text}")))
        }

        fn model_name(&self) -> &str {
            "static"
        }
    }

    fn login_dashboard_embedder() -> StaticEmbedder {
        StaticEmbedder::new(&[
            ("Implement login", vec![0.9, 0.1, 0.2]),
            ("Build dashboard", vec![0.2, 0.9, 0.1]),
            ("Python, APIs", vec![1.0, 0.0, 0.1]),
            ("UI, React", vec![0.1, 1.0, 0.0]),
        ])
    }

    fn task_names<'a>(table: &'a AssignmentTable, team: &str) -> Vec<&'a str> {
        table
            .team(team)
            .map(|t| t.matches().iter().map(|m| m.task.as_str()).collect())
            .unwrap_or_default()
    }

    const PROJECT: &str = "- Implement login\n- Build dashboard";
    const TEAMS: &str = "Backend: Python, APIs\nFrontend: UI, React";

    #[tokio::test]
    async fn zero_threshold_assigns_everything_in_score_order() {
        let embedder = login_dashboard_embedder();
        let matcher = Matcher::new(&embedder).with_threshold(0.0);
        let table = matcher
            .try_match_documents(&PROJECT.into(), &TEAMS.into())
            .await
            .unwrap();

        let backend = table.team("Backend").unwrap();
        let frontend = table.team("Frontend").unwrap();
        assert_eq!(backend.matches().len(), 2);
        assert_eq!(frontend.matches().len(), 2);
        assert_eq!(backend.matches()[0].task, "Implement login");
        assert_eq!(frontend.matches()[0].task, "Build dashboard");
        for bucket in table.teams() {
            let scores: Vec<f64> = bucket.matches().iter().map(|m| m.score).collect();
            assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
        }
    }

    #[tokio::test]
    async fn unreachable_threshold_leaves_every_bucket_empty() {
        let embedder = login_dashboard_embedder();
        let matcher = Matcher::new(&embedder).with_threshold(1.01);
        let table = matcher
            .try_match_documents(&PROJECT.into(), &TEAMS.into())
            .await
            .unwrap();

        assert_eq!(table.teams().len(), 2);
        assert!(table.teams().iter().all(|t| t.is_empty()));
        assert_eq!(format_results(&table), NO_MATCHES_STRUCTURED);
        assert_eq!(format_results_natural(&table), NO_MATCHES_NATURAL);
    }

    #[tokio::test]
    async fn default_threshold_filters_weak_pairs() {
        let embedder = login_dashboard_embedder();
        let matcher = Matcher::new(&embedder);
        assert_eq!(matcher.threshold(), DEFAULT_THRESHOLD);
        let table = matcher
            .try_match_documents(&PROJECT.into(), &TEAMS.into())
            .await
            .unwrap();

        assert_eq!(task_names(&table, "Backend"), vec!["Implement login"]);
        assert_eq!(task_names(&table, "Frontend"), vec!["Build dashboard"]);
    }

    #[tokio::test]
    async fn empty_tasks_or_roster_is_empty_table_without_embedding() {
        let embedder = login_dashboard_embedder();
        let matcher = Matcher::new(&embedder);

        let table = matcher
            .try_match(&[], &parse_team_skills(TEAMS))
            .await
            .unwrap();
        assert!(table.teams().is_empty());

        let table = matcher
            .try_match(&["Implement login".to_string()], &TeamRoster::new())
            .await
            .unwrap();
        assert!(table.teams().is_empty());
        assert!(embedder.calls().is_empty());
    }

    #[tokio::test]
    async fn each_unique_string_is_embedded_once() {
        let embedder = StaticEmbedder::new(&[
            ("Build API", vec![1.0, 0.0]),
            ("Build API, Rust", vec![0.9, 0.1]),
        ]);
        let tasks = vec!["Build API".to_string(), "Build API".to_string()];
        let roster =
            parse_team_skills("Core: Build API, Rust\nEdge: Build API, Rust\nInfra: Build API");
        let table = Matcher::new(&embedder)
            .with_threshold(0.0)
            .try_match(&tasks, &roster)
            .await
            .unwrap();

        assert_eq!(embedder.calls(), vec!["Build API", "Build API, Rust"]);
        // Duplicate task text collapses to one match per team.
        assert!(table.teams().iter().all(|t| t.matches().len() == 1));
    }

    #[tokio::test]
    async fn zero_vector_surfaces_degenerate_error() {
        let embedder = StaticEmbedder::new(&[
            ("Implement login", vec![0.0, 0.0, 0.0]),
            ("Build dashboard", vec![0.2, 0.9, 0.1]),
            ("Python, APIs", vec![1.0, 0.0, 0.1]),
            ("UI, React", vec![0.1, 1.0, 0.0]),
        ]);
        let matcher = Matcher::new(&embedder);
        let err = matcher
            .try_match_documents(&PROJECT.into(), &TEAMS.into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MatchError::Similarity(SimilarityError::DegenerateVector)
        ));

        let table = matcher.match_documents(&PROJECT.into(), &TEAMS.into()).await;
        assert!(table.teams().is_empty());
    }

    #[tokio::test]
    async fn nan_component_surfaces_degenerate_error() {
        let embedder = StaticEmbedder::new(&[
            ("Implement login", vec![0.9, f32::NAN, 0.2]),
            ("Build dashboard", vec![0.2, 0.9, 0.1]),
            ("Python, APIs", vec![1.0, 0.0, 0.1]),
            ("UI, React", vec![0.1, 1.0, 0.0]),
        ]);
        let err = Matcher::new(&embedder)
            .with_threshold(0.0)
            .try_match_documents(&PROJECT.into(), &TEAMS.into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MatchError::Similarity(SimilarityError::DegenerateVector)
        ));
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_empty_table() {
        let embedder = StaticEmbedder::new(&[]);
        let matcher = Matcher::new(&embedder);
        let tasks = vec!["Implement login".to_string()];
        let table = matcher
            .match_tasks_to_teams(&tasks, &parse_team_skills(TEAMS))
            .await;
        assert!(!table.has_matches());
        assert_eq!(embedder.calls().len(), 1);
    }

    #[tokio::test]
    async fn ties_keep_task_order() {
        let embedder = StaticEmbedder::new(&[
            ("b task", vec![1.0, 0.0]),
            ("a task", vec![2.0, 0.0]),
            ("skills", vec![1.0, 0.0]),
        ]);
        let tasks = vec!["b task".to_string(), "a task".to_string()];
        let roster = parse_team_skills("Team: skills");
        let table = Matcher::new(&embedder)
            .try_match(&tasks, &roster)
            .await
            .unwrap();
        assert_eq!(task_names(&table, "Team"), vec!["b task", "a task"]);
    }
}
