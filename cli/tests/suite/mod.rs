mod advise;
mod board;
mod records;
mod settings;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

/// Isolated data dir plus a config with every delay zeroed.
pub(crate) struct Sandbox {
    pub(crate) dir: TempDir,
}

impl Sandbox {
    pub(crate) fn new() -> Self {
        Self::with_config("")
    }

    /// `extra_advisory` is appended to the `[advisory]` table.
    pub(crate) fn with_config(extra_advisory: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let config = format!(
            "[advisory]\n\
             fallback_delay_ms = 0\n\
             simulation_delay_ms = 0\n\
             {extra_advisory}\n\
             [presentation]\n\
             score_animation_ms = 0\n\
             typing_interval_ms = 0\n"
        );
        fs::write(dir.path().join("config.toml"), config).unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        Self { dir }
    }

    pub(crate) fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub(crate) fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("engine-room").unwrap();
        cmd.arg("--config")
            .arg(self.dir.path().join("config.toml"))
            .arg("--data-dir")
            .arg(self.data_dir())
            .current_dir(self.dir.path())
            .env_remove("ENGINE_ROOM_GEMINI_API_KEY")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    pub(crate) fn seed(&self, records: Value) {
        fs::write(
            self.data_dir().join("engineRoomApps.json"),
            serde_json::to_string(&records).unwrap(),
        )
        .unwrap();
    }

    pub(crate) fn records(&self) -> Vec<Value> {
        records_in(&self.data_dir())
    }
}

pub(crate) fn records_in(data_dir: &Path) -> Vec<Value> {
    let raw = fs::read_to_string(data_dir.join("engineRoomApps.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

/// Two applications: one in Review, one scaling startup in New.
pub(crate) fn sample_records() -> Value {
    json!([
        {
            "id": 7,
            "name": "Grace",
            "business-name": "Cobol Works",
            "stage": "revenue",
            "description": "Compilers for everyone",
            "status": "Review",
            "date": "3/14/2024",
            "notes": ""
        },
        {
            "id": 1,
            "name": "Ada",
            "stage": "scaling",
            "description": "a".repeat(60),
            "revenue_model": "ai subscription",
            "status": "New",
            "date": "1/2/2024",
            "notes": ""
        }
    ])
}
