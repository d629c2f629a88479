use predicates::prelude::*;
use pretty_assertions::assert_eq;

use super::Sandbox;
use super::sample_records;

#[test]
fn show_prints_answers_with_fallbacks() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    sandbox
        .command()
        .args(["show", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cobol Works"))
        .stdout(predicate::str::contains("REVENUE"))
        .stdout(predicate::str::contains("In Review"))
        .stdout(predicate::str::contains("N/A"));
}

#[test]
fn show_unknown_id_fails() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    sandbox
        .command()
        .args(["show", "404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no application with id 404"));
}

#[test]
fn move_persists_the_new_status() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    sandbox
        .command()
        .args(["move", "7", "Accepted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved application to Accepted"));

    let records = sandbox.records();
    assert_eq!(records[0]["status"], "Accepted");
    assert_eq!(records[1]["status"], "New");
}

#[test]
fn repeated_move_changes_nothing() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());
    sandbox.command().args(["move", "7", "Interview"]).assert().success();
    let stored = sandbox.data_dir().join("engineRoomApps.json");
    let after_first = std::fs::read_to_string(&stored).unwrap();

    sandbox
        .command()
        .args(["move", "7", "Interview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in Interview"));

    let after_second = std::fs::read_to_string(&stored).unwrap();
    assert_eq!(after_first, after_second);
}

#[test]
fn move_of_unknown_id_is_a_no_op() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    sandbox
        .command()
        .args(["move", "404", "Accepted"])
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing moved"));
    assert_eq!(sandbox.records()[0]["status"], "Review");
}

#[test]
fn update_sets_notes_and_status() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    sandbox
        .command()
        .args(["update", "1", "--notes", "call back in May", "--status", "interview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Application updated successfully"));

    let records = sandbox.records();
    assert_eq!(records[1]["notes"], "call back in May");
    assert_eq!(records[1]["status"], "Interview");
}

#[test]
fn update_unknown_id_fails() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    sandbox
        .command()
        .args(["update", "404", "--notes", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no application with id 404"));
}

#[test]
fn submit_appends_a_new_record() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    sandbox
        .command()
        .args([
            "submit",
            "--name",
            "Linus",
            "--email",
            "linus@example.com",
            "--stage",
            "mvp",
            "--description",
            "A kernel",
            "--business-name",
            "Freax",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Application received: Freax"));

    let records = sandbox.records();
    assert_eq!(records.len(), 3);
    let new = &records[2];
    assert_eq!(new["status"], "New");
    assert_eq!(new["notes"], "");
    assert_eq!(new["business-name"], "Freax");
    assert!(new["id"].as_i64().unwrap() > 7);
}

#[test]
fn blank_required_answer_is_rejected() {
    let sandbox = Sandbox::new();

    sandbox
        .command()
        .args([
            "submit",
            "--name",
            "  ",
            "--email",
            "a@example.com",
            "--stage",
            "draft",
            "--description",
            "idea",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required field: name"));
    assert!(!sandbox.data_dir().join("engineRoomApps.json").exists());
}
