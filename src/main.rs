//! # taskmatch CLI
//!
//! Matches the tasks found in a project description against a roster of
//! teams and prints the resulting assignments.
//!
//! ## Usage
//!
//! ```bash
//! taskmatch --config ./config/taskmatch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `taskmatch tasks` | Print the tasks extracted from a project description |
//! | `taskmatch teams` | Print the parsed team roster |
//! | `taskmatch match` | Embed, match and report task assignments |
//! | `taskmatch check` | Validate configuration, credentials and the token exchange |
//!
//! ## Examples
//!
//! ```bash
//! # Preview what will be matched
//! taskmatch tasks --project-file ./project.pdf
//! taskmatch teams --teams-file ./teams.txt
//!
//! # Full run with every output section
//! taskmatch match --project-file ./project.pdf --teams-file ./teams.txt
//!
//! # Machine-readable output with a looser threshold
//! taskmatch match --project-file ./project.txt --teams-file ./teams.txt \
//!     --threshold 0.6 --format json
//! ```
//!
//! `IBM_API_KEY` and `IBM_PROJECT_ID` must be set (a `.env` file in the
//! working directory is read) for `match` and `check`.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskmatch::aggregate::{format_results, format_results_natural};
use taskmatch::config::{self, Config};
use taskmatch::extract::extract_tasks;
use taskmatch::roster::parse_team_skills;
use taskmatch::watsonx::WatsonxClients;
use taskmatch::{DocumentSource, Matcher, Summarizer};

const DEFAULT_CONFIG_PATH: &str = "./config/taskmatch.toml";

/// taskmatch: assign project tasks to the teams best suited for them.
#[derive(Parser)]
#[command(
    name = "taskmatch",
    about = "Assign project tasks to teams by semantic similarity",
    version,
    long_about = "taskmatch extracts tasks from a project description (text or PDF), parses a \
    roster of team skill descriptions, embeds both with watsonx.ai and assigns each task to \
    every team whose skills are similar enough. Results are printed as a structured table, \
    a natural-language rendering, JSON, or a narrative written by a chat model."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/taskmatch.toml`; when that file does not exist
    /// built-in defaults are used. An explicitly given path must exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tasks extracted from a project description.
    ///
    /// Does not contact any remote service.
    Tasks {
        #[command(flatten)]
        project: ProjectInput,
    },

    /// Print the parsed team roster as `name: skills`.
    ///
    /// Does not contact any remote service.
    Teams {
        #[command(flatten)]
        teams: TeamsInput,
    },

    /// Match project tasks to teams and print the assignments.
    Match {
        #[command(flatten)]
        project: ProjectInput,

        #[command(flatten)]
        teams: TeamsInput,

        /// Minimum cosine similarity for a task to be assigned to a team.
        ///
        /// Overrides `[matching].threshold` from the config file.
        #[arg(long)]
        threshold: Option<f64>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::All)]
        format: OutputFormat,
    },

    /// Validate configuration and credentials, then exchange a token.
    Check,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ProjectInput {
    /// Project description file (`.pdf` or plain text).
    #[arg(long, value_name = "PATH")]
    project_file: Option<PathBuf>,

    /// Project description given inline.
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    project_text: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TeamsInput {
    /// Team roster file (`.pdf` or plain text), one `Team: skills` per line.
    #[arg(long, value_name = "PATH")]
    teams_file: Option<PathBuf>,

    /// Team roster given inline.
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    teams_text: Option<String>,
}

fn source_of(file: Option<PathBuf>, text: Option<String>) -> DocumentSource {
    match (file, text) {
        (Some(path), _) => DocumentSource::FilePath(path),
        (None, text) => DocumentSource::RawText(text.unwrap_or_default()),
    }
}

impl ProjectInput {
    fn into_source(self) -> DocumentSource {
        source_of(self.project_file, self.project_text)
    }
}

impl TeamsInput {
    fn into_source(self) -> DocumentSource {
        source_of(self.teams_file, self.teams_text)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Per-team table with confidence percentages.
    Structured,
    /// One sentence per team, rendered locally.
    Natural,
    /// Prose written by the chat model (local fallback on failure).
    Narrative,
    /// The assignment table as JSON.
    Json,
    /// Structured, natural and (if enabled) narrative sections.
    All,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("taskmatch=debug,info")
        } else {
            EnvFilter::new("taskmatch=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(atty::is(atty::Stream::Stderr)),
        )
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => config::load_config(&path, true),
        None => config::load_config(Path::new(DEFAULT_CONFIG_PATH), false),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Tasks { project } => {
            let text = project.into_source().load_text()?;
            let tasks = extract_tasks(&text);
            if tasks.is_empty() {
                println!("No tasks found.");
            }
            for task in tasks {
                println!("{}", task);
            }
        }
        Commands::Teams { teams } => {
            let text = teams.into_source().load_text()?;
            let roster = parse_team_skills(&text);
            if roster.is_empty() {
                println!("No teams found.");
            }
            for team in roster.teams() {
                println!("{}: {}", team.name, team.skills);
            }
        }
        Commands::Match {
            project,
            teams,
            threshold,
            format,
        } => {
            let cfg = load_config(cli.config)?;
            run_match(&cfg, project, teams, threshold, format).await?;
        }
        Commands::Check => {
            let cfg = load_config(cli.config)?;
            let clients = WatsonxClients::from_env(&cfg)?;
            clients
                .tokens
                .refresh()
                .await
                .context("Token exchange failed")?;
            println!("ok");
        }
    }

    Ok(())
}

async fn run_match(
    cfg: &Config,
    project: ProjectInput,
    teams: TeamsInput,
    threshold: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let threshold = threshold.unwrap_or(cfg.matching.threshold);
    if !threshold.is_finite() {
        bail!("--threshold must be a finite number");
    }

    let clients = WatsonxClients::from_env(cfg)?;

    let project_text = project
        .into_source()
        .load_text()
        .context("Failed to load project description")?;
    let teams_text = teams
        .into_source()
        .load_text()
        .context("Failed to load team roster")?;

    let tasks = extract_tasks(&project_text);
    let roster = parse_team_skills(&teams_text);
    tracing::info!(tasks = tasks.len(), teams = roster.len(), "parsed inputs");

    let matcher = Matcher::new(&clients.embedder).with_threshold(threshold);
    let table = matcher.match_tasks_to_teams(&tasks, &roster).await;
    let summarizer = Summarizer::new(&clients.chat).with_max_attempts(cfg.summary.max_attempts);

    match format {
        OutputFormat::Structured => println!("{}", format_results(&table)),
        OutputFormat::Natural => println!("{}", format_results_natural(&table)),
        OutputFormat::Narrative => println!("{}", summarizer.summarize(&table).await),
        OutputFormat::Json => println!("{}", table.to_json_pretty()?),
        OutputFormat::All => {
            println!("Results (Structured):");
            println!("{}", format_results(&table));
            println!();
            println!("Results (Local Natural Language Summary):");
            println!("{}", format_results_natural(&table));
            if cfg.summary.enabled {
                println!();
                println!("Results (Refined via Chat API):");
                println!("{}", summarizer.summarize(&table).await);
            }
        }
    }

    Ok(())
}
