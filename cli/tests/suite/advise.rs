use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;

use super::Sandbox;
use super::sample_records;

#[test]
fn simulation_report_as_json() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());

    let output = sandbox
        .command()
        .args(["advise", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(report["id"], 1);
    assert_eq!(report["score"], 55);
    assert_eq!(report["verdict"], "WATCHLIST");
    assert_eq!(report["source"], "simulation");
    assert!(!report["summary"].as_str().unwrap().is_empty());
}

#[test]
fn report_is_not_persisted() {
    let sandbox = Sandbox::new();
    sandbox.seed(sample_records());
    let before = sandbox.records();

    sandbox
        .command()
        .args(["advise", "1", "--no-animate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score  55/100"))
        .stdout(predicate::str::contains("WATCHLIST"))
        .stdout(predicate::str::contains("source: simulation"));

    assert_eq!(sandbox.records(), before);
}

#[test]
fn unreachable_backend_falls_back_to_simulation() {
    let sandbox =
        Sandbox::with_config("api_base_url = \"http://127.0.0.1:9\"\nrequest_timeout_secs = 5");
    sandbox.seed(sample_records());
    sandbox
        .command()
        .args(["settings", "set", "--key", "test-key"])
        .assert()
        .success();

    let output = sandbox
        .command()
        .args(["advise", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["score"], 55);
    assert_eq!(report["source"], "simulation (fallback)");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Switching to Simulation."), "{stderr}");
}

#[test]
fn advise_unknown_id_fails() {
    Sandbox::new()
        .command()
        .args(["advise", "404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no application with id 404"));
}
