//! Black-box tests for the `tempos` binary.
//!
//! Commands that need a language model talk to a stub `/api/chat` server;
//! everything else runs against a temporary database only.

use predicates::prelude::*;

mod helpers;
use helpers::{CliTestHarness, StubModel};

#[test]
fn test_cli_help_and_version() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["--help"])
        .stdout(predicate::str::contains("schedule"));

    harness
        .run_success(&["--version"])
        .stdout(predicate::str::contains("tempos"));

    harness
        .run_failure(&["invalid-command"])
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_seed_then_list() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["seed"])
        .stdout(predicate::str::contains("Inserted sample IDs: 1, 2, 3"));
    assert!(harness.db_path().exists());

    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Team standup"))
        .stdout(predicate::str::contains("Project deadline"))
        .stdout(predicate::str::contains("Racine, Casablanca"));

    harness
        .run_success(&["list", "--limit", "1"])
        .stdout(predicate::str::contains("Team standup"))
        .stdout(predicate::str::contains("Coffee with Ali").not());
}

#[test]
fn test_list_empty_database() {
    let harness = CliTestHarness::new();
    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("No schedules found."));
}

#[test]
fn test_upcoming_window() {
    let harness = CliTestHarness::new();
    harness.run_success(&["seed"]);

    harness
        .run_success(&["upcoming", "--days", "2"])
        .stdout(predicate::str::contains("Team standup"))
        .stdout(predicate::str::contains("Project deadline").not())
        .stdout(predicate::str::contains("1 row(s)"));

    harness
        .run_failure(&["upcoming", "--days", "0"])
        .stderr(predicate::str::contains("Invalid input"));
}

#[test]
fn test_sql_console_is_read_only() {
    let harness = CliTestHarness::new();
    harness.run_success(&["seed"]);

    harness
        .run_success(&["sql", "SELECT title FROM schedules WHERE tags LIKE '%coffee%'"])
        .stdout(predicate::str::contains("Coffee with Ali"));

    harness
        .run_failure(&["sql", "DROP TABLE schedules"])
        .stderr(predicate::str::contains("Statement rejected"));

    harness
        .run_failure(&["sql", "SELECT missing FROM nowhere"])
        .stderr(predicate::str::contains("Query failed"));

    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Team standup"));
}

#[test]
fn test_purge_with_force() {
    let harness = CliTestHarness::new();
    harness.run_success(&["seed"]);

    harness
        .run_success(&["purge", "--force"])
        .stdout(predicate::str::contains("Deleted 3 schedule(s)."));
    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("No schedules found."));
}

#[test]
fn test_config_file_flag() {
    let harness = CliTestHarness::new();
    let config_path = harness.db_path().with_file_name("custom.toml");
    std::fs::write(&config_path, "fallback_days = 0\n").unwrap();

    harness
        .command()
        .args(["--config", config_path.to_str().unwrap(), "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fallback_days"));
}

#[test]
fn test_add_without_model_fails_cleanly() {
    let harness = CliTestHarness::new();
    harness
        .run_failure(&["add", "Lunch with Sara tomorrow"])
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_add_with_model() {
    let model = StubModel::start(&[
        "```json\n{\"title\": \"Lunch with Sara\", \"details\": \"\", \"start\": \"2025-09-02 12:30\", \"end\": null, \"location\": \"Cafe Zaha\", \"tags\": [\"lunch\"]}\n```",
    ]);
    let harness = CliTestHarness::with_model_url(model.base_url());

    harness
        .run_success(&["add", "Lunch with Sara on Sept 2 at 12:30 at Cafe Zaha", "--show-json"])
        .stdout(predicate::str::contains("Saved schedule #1"))
        .stdout(predicate::str::contains("\"start\": \"2025-09-02T12:30:00Z\""))
        .stdout(predicate::str::contains("\"lunch\""));
}

#[test]
fn test_add_with_unrepairable_output() {
    let model = StubModel::start(&["no json here", "still nothing"]);
    let harness = CliTestHarness::with_model_url(model.base_url());

    harness
        .run_failure(&["add", "something"])
        .stderr(predicate::str::contains("Could not read a schedule"))
        .stderr(predicate::str::contains("still nothing"));
}

#[test]
fn test_ask_falls_back_on_unsafe_sql() {
    let model = StubModel::start(&["DELETE FROM schedules;"]);
    let harness = CliTestHarness::with_model_url(model.base_url());
    harness.run_success(&["seed"]);

    harness
        .run_success(&["ask", "delete everything please"])
        .stdout(predicate::str::contains("showing upcoming schedules instead"))
        .stdout(predicate::str::contains("3 row(s)"));

    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Coffee with Ali"));
}

#[test]
fn test_ask_with_summary() {
    let model = StubModel::start(&[
        "SELECT title, start_ts FROM schedules WHERE tags LIKE '%deadline%'",
        "- Project deadline in a few days",
    ]);
    let harness = CliTestHarness::with_model_url(model.base_url());
    harness.run_success(&["seed"]);

    harness
        .run_success(&["ask", "any deadlines?", "--summarize"])
        .stdout(predicate::str::contains("ORDER BY start_ts IS NULL, start_ts, id;"))
        .stdout(predicate::str::contains("Project deadline"))
        .stdout(predicate::str::contains("Summary"))
        .stdout(predicate::str::contains("- Project deadline in a few days"));
}

#[test]
fn test_verbose_flag_logs_to_stderr() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["-vv", "list"])
        .stdout(predicate::str::contains("No schedules found."))
        .stderr(predicate::str::contains("dispatching"));

    harness
        .run_success(&["list"])
        .stderr(predicate::str::contains("dispatching").not());
}
