use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const IBM_VARS: [&str; 5] = [
    "IBM_API_KEY",
    "IBM_PROJECT_ID",
    "IBM_URL_TOKEN",
    "IBM_URL_EMBEDDINGS",
    "IBM_URL_CHAT",
];

/// Run the binary inside `dir` with a clean IBM environment plus `env`.
fn run_in(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> (String, String, bool) {
    let binary = env!("CARGO_BIN_EXE_taskmatch");
    let mut cmd = Command::new(binary);
    cmd.current_dir(dir).args(args).env("RUST_LOG", "taskmatch=info");
    for var in IBM_VARS {
        cmd.env_remove(var);
    }
    for (k, v) in env {
        cmd.env(k, v);
    }
    let output = cmd
        .output()
        .unwrap_or_else(|e| panic!("Failed to run taskmatch binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run(args: &[&str]) -> (TempDir, String, String, bool) {
    let tmp = TempDir::new().unwrap();
    let (stdout, stderr, ok) = run_in(tmp.path(), args, &[]);
    (tmp, stdout, stderr, ok)
}

/// Endpoints on the discard port: every request is refused immediately.
const UNREACHABLE: [(&str, &str); 5] = [
    ("IBM_API_KEY", "test-key"),
    ("IBM_PROJECT_ID", "test-project"),
    ("IBM_URL_TOKEN", "http://127.0.0.1:9/token"),
    ("IBM_URL_EMBEDDINGS", "http://127.0.0.1:9/embeddings"),
    ("IBM_URL_CHAT", "http://127.0.0.1:9/chat"),
];

#[test]
fn test_tasks_from_text() {
    let (_tmp, stdout, stderr, ok) = run(&[
        "tasks",
        "--project-text",
        "Project overview\n- Implement login\n3. Build dashboard\nWe will test the API\nBudget notes",
    ]);
    assert!(ok, "tasks failed: {}", stderr);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["Implement login", "Build dashboard", "We will test the API"]
    );
}

#[test]
fn test_tasks_from_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("plan.txt"),
        "• Design the schema\n* Configure CI\n",
    )
    .unwrap();

    let (stdout, stderr, ok) = run_in(tmp.path(), &["tasks", "--project-file", "plan.txt"], &[]);
    assert!(ok, "tasks failed: {}", stderr);
    assert_eq!(stdout, "Design the schema\nConfigure CI\n");
}

#[test]
fn test_tasks_none_found() {
    let (_tmp, stdout, _stderr, ok) = run(&["tasks", "--project-text", "Just an intro."]);
    assert!(ok);
    assert_eq!(stdout.trim(), "No tasks found.");
}

#[test]
fn test_tasks_requires_exactly_one_source() {
    let (_tmp, _stdout, _stderr, ok) = run(&["tasks"]);
    assert!(!ok, "tasks without a source should fail");

    let (_tmp, _stdout, stderr, ok) = run(&[
        "tasks",
        "--project-text",
        "- A",
        "--project-file",
        "plan.txt",
    ]);
    assert!(!ok, "two sources should be rejected");
    assert!(stderr.contains("cannot be used with"), "stderr: {}", stderr);
}

#[test]
fn test_missing_project_file_fails() {
    let (_tmp, _stdout, stderr, ok) = run(&["tasks", "--project-file", "missing.txt"]);
    assert!(!ok);
    assert!(stderr.contains("missing.txt"), "stderr: {}", stderr);
}

#[test]
fn test_teams_roster() {
    let (_tmp, stdout, stderr, ok) = run(&[
        "teams",
        "--teams-text",
        "Backend: Python, APIs\nFrontend - UI, React\nBackend: Rust, gRPC",
    ]);
    assert!(ok, "teams failed: {}", stderr);
    assert_eq!(stdout, "Backend: Rust, gRPC\nFrontend: UI, React\n");
}

#[test]
fn test_teams_general_team() {
    let (_tmp, stdout, _stderr, ok) = run(&["teams", "--teams-text", "Cloud, Kubernetes, Go"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "General Team: Cloud, Kubernetes, Go");
}

#[test]
fn test_match_without_credentials_fails() {
    let (_tmp, stdout, stderr, ok) = run(&[
        "match",
        "--project-text",
        "- Implement login",
        "--teams-text",
        "Backend: APIs",
    ]);
    assert!(!ok, "match should fail without credentials");
    assert!(stdout.is_empty());
    assert!(stderr.contains("IBM_API_KEY"), "stderr: {}", stderr);
    assert!(stderr.contains("IBM_PROJECT_ID"), "stderr: {}", stderr);
}

#[test]
fn test_explicit_missing_config_fails() {
    let (_tmp, _stdout, stderr, ok) = run(&[
        "--config",
        "nope.toml",
        "match",
        "--project-text",
        "- Implement login",
        "--teams-text",
        "Backend: APIs",
    ]);
    assert!(!ok);
    assert!(
        stderr.contains("Failed to read config file"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("bad.toml"),
        "[summary]\ntemperature = 5.0\n",
    )
    .unwrap();

    let (_stdout, stderr, ok) = run_in(tmp.path(), &["--config", "bad.toml", "check"], &[]);
    assert!(!ok);
    assert!(stderr.contains("temperature"), "stderr: {}", stderr);
}

#[test]
fn test_check_reports_token_failure() {
    let tmp = TempDir::new().unwrap();
    let (stdout, stderr, ok) = run_in(tmp.path(), &["check"], &UNREACHABLE);
    assert!(!ok);
    assert!(!stdout.contains("ok"));
    assert!(stderr.contains("Token exchange failed"), "stderr: {}", stderr);
}

#[test]
fn test_match_degrades_when_provider_unreachable() {
    let tmp = TempDir::new().unwrap();
    let (stdout, stderr, ok) = run_in(
        tmp.path(),
        &[
            "match",
            "--project-text",
            "- Implement login",
            "--teams-text",
            "Backend: APIs",
        ],
        &UNREACHABLE,
    );
    assert!(ok, "match should degrade, not fail: {}", stderr);
    assert!(stdout.contains("Results (Structured):\nNo matches found."));
    assert!(stdout.contains(
        "Results (Local Natural Language Summary):\nNo task assignments could be determined."
    ));
    assert!(stdout.contains(
        "Results (Refined via Chat API):\nNo task assignments available to summarize."
    ));
    assert!(stderr.contains("error in task matching"), "stderr: {}", stderr);
}

#[test]
fn test_match_json_format() {
    let tmp = TempDir::new().unwrap();
    let (stdout, stderr, ok) = run_in(
        tmp.path(),
        &[
            "match",
            "--project-text",
            "- Implement login",
            "--teams-text",
            "Backend: APIs",
            "--format",
            "json",
        ],
        &UNREACHABLE,
    );
    assert!(ok, "match failed: {}", stderr);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["teams"], serde_json::json!([]));
}

#[test]
fn test_summary_section_can_be_disabled() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/taskmatch.toml"),
        "[summary]\nenabled = false\n",
    )
    .unwrap();

    let (stdout, stderr, ok) = run_in(
        tmp.path(),
        &[
            "match",
            "--project-text",
            "- Implement login",
            "--teams-text",
            "Backend: APIs",
        ],
        &UNREACHABLE,
    );
    assert!(ok, "match failed: {}", stderr);
    assert!(stdout.contains("Results (Structured):"));
    assert!(!stdout.contains("Refined via Chat API"));
}
