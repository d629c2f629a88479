use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use clap::Subcommand;
use engine_room_core::settings::API_KEY_ENV;
use engine_room_core::settings::test_connection;
use tokio_util::sync::CancellationToken;

use crate::Workspace;
use crate::output::Palette;
use crate::output::print_notice;

#[derive(Debug, Parser)]
pub struct SettingsCli {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the stored model and whether a key is set.
    Show,
    /// Store an API key (and optionally a model). An empty key clears both.
    Set {
        #[arg(long)]
        key: String,

        #[arg(long)]
        model: Option<String>,
    },
    /// Forget the stored key and model; advisory reports fall back to simulation.
    Clear,
    /// Send a one-word request with the active key.
    Test,
}

/// `abcd…wxyz`, or all bullets for short keys.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "•".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

impl SettingsCli {
    pub(crate) async fn run(self, workspace: &Workspace) -> Result<()> {
        let settings = workspace.settings();
        match self.command {
            SettingsCommand::Show => {
                let palette = Palette::stdout();
                let key = settings
                    .stored_api_key()
                    .map_or_else(|| "(none)".to_string(), |key| mask(&key));
                let mode = if settings.resolve_credentials().is_some() {
                    "Gemini"
                } else {
                    "Simulation"
                };
                println!("{} {key}", palette.dim("API key:"));
                println!("{} {}", palette.dim("Model:  "), settings.model());
                println!("{} {mode}", palette.dim("Mode:   "));
                if std::env::var_os(API_KEY_ENV).is_some() {
                    println!(
                        "{}",
                        palette.info(&format!("{API_KEY_ENV} is set and takes precedence."))
                    );
                }
            }
            SettingsCommand::Set { key, model } => {
                print_notice(&settings.save(&key, model.as_deref())?);
            }
            SettingsCommand::Clear => {
                print_notice(&settings.clear()?);
            }
            SettingsCommand::Test => {
                let (key, model) = settings
                    .resolve_credentials()
                    .map(|credentials| (credentials.api_key, Some(credentials.model)))
                    .unwrap_or_default();
                let notice = test_connection(
                    &workspace.config.advisory,
                    &key,
                    model.as_deref(),
                    &CancellationToken::new(),
                )
                .await;
                if notice.is_error() {
                    bail!("{}", notice.message);
                }
                print_notice(&notice);
            }
        }
        Ok(())
    }
}
