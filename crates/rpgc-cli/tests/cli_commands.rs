//! Integration tests for the rpgc CLI commands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RESPONSE: &str = "The tavern falls quiet as you enter.

```
Alex's Stats
---
Health: 80%
Satiety: 60%
Energy: 45%
Hygiene: 70%
Arousal: 10%
😊: Curious, Alert
On Person: Sword, Lantern
Stored - Home: Spare Clothes
Assets: None
Main Quest: Find the relic
Optional Quests: Help the miller
```

```
Info Box
---
Date: Monday, March 3, 1421
Weather: 🌧️ Light rain
Temperature: 12°C
Time: 20:00 → 20:30
Location: Rusty Anchor Tavern
```

```
Present Characters
---
🧔: Bram, burly innkeeper | Wary | Stranger | 💭 Another soaked traveler.
```";

/// Write a model response into a temp directory.
fn response_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("response.txt");
    fs::write(&path, RESPONSE).unwrap();
    (dir, path)
}

fn rpgc() -> Command {
    Command::cargo_bin("rpgc").unwrap()
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_lists_all_sections() {
    let (_dir, path) = response_file();
    rpgc()
        .args(["parse", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Info Box")
                .and(predicate::str::contains("Tavern"))
                .and(predicate::str::contains("3 of 3 sections found")),
        );
}

#[test]
fn parse_json_output() {
    let (_dir, path) = response_file();
    rpgc()
        .args(["parse", path.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"userStats\"")
                .and(predicate::str::contains("\"characterThoughts\"")),
        );
}

#[test]
fn parse_reads_stdin() {
    rpgc()
        .args(["parse", "-"])
        .write_stdin("```\nInfo Box\n---\nDate: Friday\n```")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 3 sections found"));
}

#[test]
fn parse_without_trackers() {
    rpgc()
        .args(["parse", "-"])
        .write_stdin("Just a story, no trackers.")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tracker sections found"));
}

#[test]
fn parse_missing_file_fails() {
    rpgc()
        .args(["parse", "/nonexistent/response.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[test]
fn stats_shows_parsed_fields() {
    let (_dir, path) = response_file();
    rpgc()
        .args(["stats", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("80%")
                .and(predicate::str::contains("Lantern"))
                .and(predicate::str::contains("Find the relic"))
                .and(predicate::str::contains("Bram")),
        );
}

#[test]
fn stats_json_output() {
    let (_dir, path) = response_file();
    rpgc()
        .args(["stats", path.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"health\": 80")
                .and(predicate::str::contains("\"Home\": \"Spare Clothes\"")),
        );
}

#[test]
fn stats_requires_stats_section() {
    rpgc()
        .args(["stats", "-"])
        .write_stdin("```\nInfo Box\n---\nDate: Friday\n```")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Stats section"));
}

// ---------------------------------------------------------------------------
// clean
// ---------------------------------------------------------------------------

#[test]
fn clean_removes_tracker_blocks() {
    let (_dir, path) = response_file();
    rpgc()
        .args(["clean", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("The tavern falls quiet")
                .and(predicate::str::contains("Health:").not())
                .and(predicate::str::contains("Bram").not()),
        );
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_clean_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"level": 4, "generationMode": "separate"}"#).unwrap();
    rpgc()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings are valid"));
}

#[test]
fn validate_reports_legacy_inventory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"userStats": {"inventory": "Rope, Torch"}}"#).unwrap();
    rpgc()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs repair"));
}

#[test]
fn validate_fix_rewrites_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"userStats": {"inventory": "Rope, Torch"}}"#).unwrap();
    rpgc()
        .args(["validate", path.to_str().unwrap(), "--fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Repaired"));

    let fixed = fs::read_to_string(&path).unwrap();
    assert!(fixed.contains("\"version\": 2"));
    assert!(fixed.contains("\"onPerson\": \"Rope, Torch\""));

    rpgc()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn validate_rejects_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{broken").unwrap();
    rpgc()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn verbose_logs_repairs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"userStats": {"inventory": "Rope"}}"#).unwrap();
    rpgc()
        .args(["--verbose", "validate", path.to_str().unwrap(), "--fix"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("migrated legacy inventory"));
}

// ---------------------------------------------------------------------------
// prompt
// ---------------------------------------------------------------------------

#[test]
fn prompt_for_fresh_session() {
    let dir = TempDir::new().unwrap();
    rpgc()
        .args(["prompt", "-d", dir.path().to_str().unwrap(), "-u", "Alex"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[system]")
                .and(predicate::str::contains("Alex's Stats")),
        );
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_runs_commands_and_saves() {
    let dir = TempDir::new().unwrap();
    let script = "send We enter the inn.\n\
                  reply Warm light spills out.\\n```\\nStats\\n---\\nHealth: 70%\\n```\n\
                  fly away\n\
                  status\n\
                  quit\n";
    rpgc()
        .args(["play", "-d", dir.path().to_str().unwrap(), "-s", "7"])
        .write_stdin(script)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Message #0 sent.")
                .and(predicate::str::contains("Warm light spills out."))
                .and(predicate::str::contains("unknown command: fly"))
                .and(predicate::str::contains("Health 70%"))
                .and(predicate::str::contains("Goodbye!")),
        );

    assert!(dir.path().join("settings.json").exists());
    assert!(dir.path().join("chat.json").exists());

    rpgc()
        .args(["prompt", "-d", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Health: 70%"));
}

#[test]
fn play_reaches_end_of_input() {
    let dir = TempDir::new().unwrap();
    rpgc()
        .args(["play", "-d", dir.path().to_str().unwrap()])
        .write_stdin("help\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("commit-roll"));
}
