//! CLI integration tests for pdfrag-server
//!
//! Only commands that never touch a model or the network are exercised here.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the built binary inside `dir`
fn run_pdfrag(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pdfrag-server"))
        .args(args)
        .arg("--no-color")
        .current_dir(dir)
        .env_remove("PDFRAG_PORT")
        .output()
        .expect("Failed to execute pdfrag-server")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

// =============================================================================
// Help and Version
// =============================================================================

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = run_pdfrag(&["--help"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Usage"));
    for command in ["serve", "config", "ingest", "ask"] {
        assert!(text.contains(command), "missing {} in help", command);
    }
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    let output = run_pdfrag(&["--version"], dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// Config Command
// =============================================================================

#[test]
fn test_config_without_file_shows_defaults() {
    let dir = TempDir::new().unwrap();
    let output = run_pdfrag(&["config"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("File not found, showing defaults"));
    assert!(text.contains("llama3"));
}

#[test]
fn test_config_full_prints_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("pdfrag.toml"),
        "[server]\nport = 9200\n\n[rag]\ncollection = \"manuals\"\n",
    )
    .unwrap();

    let output = run_pdfrag(&["config", "--full"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("[server]"));
    assert!(text.contains("port = 9200"));
    assert!(text.contains("collection = \"manuals\""));
}

#[test]
fn test_config_validate_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("custom.toml"), "[rag]\ntop_k = 5\n").unwrap();

    let output = run_pdfrag(&["config", "--validate", "--config", "custom.toml"], dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("custom.toml is valid"));
}

#[test]
fn test_config_validate_rejects_bad_values() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("pdfrag.toml"),
        "[rag]\nchunk_size = 50\nchunk_overlap = 80\n",
    )
    .unwrap();

    let output = run_pdfrag(&["config", "--validate"], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("chunk_overlap"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_pdfrag(&["config", "--config", "nowhere.toml"], dir.path());

    assert!(!output.status.success());
}
