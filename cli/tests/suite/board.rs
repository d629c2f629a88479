use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;

use super::Sandbox;
use super::sample_records;

#[test]
fn board_lists_every_column_with_counts() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    sandbox
        .command()
        .arg("board")
        .assert()
        .success()
        .stdout(predicate::str::contains("Inbox (1)"))
        .stdout(predicate::str::contains("In Review (1)"))
        .stdout(predicate::str::contains("Cobol Works"))
        .stdout(predicate::str::contains("Accepted (0)"))
        .stdout(predicate::str::contains("No Items"));
}

#[test]
fn board_filter_narrows_the_columns() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    let output = sandbox
        .command()
        .args(["board", "--filter", "cobol", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(value["filter"], "cobol");
    let counts: Vec<usize> = value["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|column| column["records"].as_array().unwrap().len())
        .collect();
    assert_eq!(counts, vec![0, 1, 0, 0, 0]);
    assert_eq!(value["columns"][1]["label"], "In Review");
}

#[test]
fn empty_store_shows_empty_board() {
    Sandbox::new()
        .command()
        .arg("board")
        .assert()
        .success()
        .stdout(predicate::str::contains("Inbox (0)"));
}

#[test]
fn stats_json_matches_the_collection() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    let output = sandbox.command().args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());
    let stats: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(stats["total"], 2);
    assert_eq!(stats["pending_count"], 1);
    assert_eq!(stats["accepted_count"], 0);
    assert_eq!(stats["acceptance_rate_percent"], 0);
    assert_eq!(stats["pipeline_value_estimate"], 150_000);
}

#[test]
fn stats_text_uses_display_units() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    sandbox
        .command()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("0%"))
        .stdout(predicate::str::contains("$150k"));
}

#[test]
fn corrupt_store_reads_as_empty() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.data_dir().join("engineRoomApps.json"), "{not json").unwrap();

    sandbox
        .command()
        .args(["stats", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 0"));
}

#[test]
fn export_writes_a_csv_file() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());
    let out = sandbox.dir.path().join("exports");

    sandbox
        .command()
        .arg("export")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 applications"));

    let files: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert_eq!(files.len(), 1);
    let path = files.into_iter().next().unwrap().unwrap().path();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("engine_room_export_") && name.ends_with(".csv"), "{name}");
    let csv = std::fs::read_to_string(path).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("\"Cobol Works\""), "{csv}");
}

#[test]
fn export_of_empty_collection_fails() {
    Sandbox::new()
        .command()
        .arg("export")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No data to export."));
}
