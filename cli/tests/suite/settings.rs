use predicates::prelude::*;

use super::Sandbox;

#[test]
fn fresh_install_runs_in_simulation() {
    Sandbox::new()
        .command()
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"))
        .stdout(predicate::str::contains("gemini-1.5-flash"))
        .stdout(predicate::str::contains("Simulation"));
}

#[test]
fn set_then_show_masks_the_key() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["settings", "set", "--key", "AIzaSyExampleKey1234", "--model", "gemini-pro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings Saved. Model: gemini-pro"));

    sandbox
        .command()
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AIza…1234"))
        .stdout(predicate::str::contains("AIzaSyExampleKey1234").not())
        .stdout(predicate::str::contains("Gemini"));
}

#[test]
fn clear_reverts_to_simulation() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["settings", "set", "--key", "secret-key-value"])
        .assert()
        .success();

    sandbox
        .command()
        .args(["settings", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reverting to Simulation Mode."));
    assert!(!sandbox.data_dir().join("geminiApiKey.json").exists());
}

#[test]
fn env_key_takes_precedence() {
    Sandbox::new()
        .command()
        .env("ENGINE_ROOM_GEMINI_API_KEY", "from-env")
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode:    Gemini"))
        .stdout(predicate::str::contains("takes precedence"));
}

#[test]
fn test_without_a_key_fails() {
    Sandbox::new()
        .command()
        .args(["settings", "test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter an API Key first."));
}
