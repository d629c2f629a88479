//! `engine-room` command line.
//!
//! With no subcommand the interactive board starts. Every other subcommand
//! runs one core operation against the same data directory and exits.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use engine_room_core::EngineRoomConfig;
use engine_room_core::FileKvStore;
use engine_room_core::RecordStore;
use engine_room_core::settings::Settings;
use tracing_subscriber::EnvFilter;

mod advise_cmd;
mod board_cmd;
mod output;
mod settings_cmd;
mod submit_cmd;

pub use advise_cmd::AdviseArgs;
pub use board_cmd::BoardArgs;
pub use board_cmd::ExportArgs;
pub use board_cmd::MoveArgs;
pub use board_cmd::ShowArgs;
pub use board_cmd::StatsArgs;
pub use board_cmd::UpdateArgs;
pub use settings_cmd::SettingsCli;
pub use submit_cmd::SubmitArgs;

/// Review startup applications on a kanban board.
#[derive(Debug, Parser)]
#[command(name = "engine-room", version)]
pub struct Cli {
    /// Config file (defaults to $ENGINE_ROOM_CONFIG, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Storage root; overrides `data_dir` from the config file.
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive board (default).
    Tui,
    /// Print the board columns.
    Board(BoardArgs),
    /// Print pipeline statistics.
    Stats(StatsArgs),
    /// Print one application in full.
    Show(ShowArgs),
    /// Move an application to another column.
    Move(MoveArgs),
    /// Edit the reviewer notes or status of an application.
    Update(UpdateArgs),
    /// Generate an AI advisory report for an application.
    Advise(AdviseArgs),
    /// Submit a new application.
    Submit(SubmitArgs),
    /// Write the whole collection to a CSV file.
    Export(ExportArgs),
    /// Show or change the scoring credentials.
    Settings(SettingsCli),
}

/// Resolved configuration and the stores opened from it.
pub(crate) struct Workspace {
    pub(crate) config: EngineRoomConfig,
    pub(crate) data_dir: PathBuf,
    pub(crate) store: RecordStore,
}

impl Workspace {
    fn open(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = EngineRoomConfig::load(config_path.as_deref())?;
        if let Some(dir) = data_dir {
            config.data_dir = Some(dir);
        }
        let data_dir = config.resolve_data_dir()?;
        let kv = FileKvStore::open(&data_dir)
            .with_context(|| format!("failed to open data dir {}", data_dir.display()))?;
        tracing::debug!("using data dir {}", data_dir.display());
        Ok(Self {
            config,
            data_dir,
            store: RecordStore::new(Arc::new(kv)),
        })
    }

    pub(crate) fn settings(&self) -> Settings {
        Settings::new(self.store.kv(), self.config.advisory.default_model.clone())
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let command = self.command.unwrap_or(Command::Tui);
        if !matches!(command, Command::Tui) {
            init_stderr_logging();
        }
        let workspace = Workspace::open(self.config, self.data_dir)?;

        match command {
            Command::Tui => run_tui(workspace).await,
            Command::Board(args) => board_cmd::run_board(&workspace, args),
            Command::Stats(args) => board_cmd::run_stats(&workspace, args),
            Command::Show(args) => board_cmd::run_show(&workspace, args),
            Command::Move(args) => board_cmd::run_move(&workspace, args),
            Command::Update(args) => board_cmd::run_update(&workspace, args),
            Command::Advise(args) => args.run(&workspace).await,
            Command::Submit(args) => args.run(&workspace),
            Command::Export(args) => board_cmd::run_export(&workspace, args),
            Command::Settings(cli) => cli.run(&workspace).await,
        }
    }
}

fn init_stderr_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_tui(workspace: Workspace) -> Result<()> {
    let _log_guard = engine_room_tui::init_file_logging(&workspace.data_dir.join("logs"))
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let export_dir = std::env::current_dir()?;
    let args = engine_room_tui::AppArgs {
        config: workspace.config,
        store: workspace.store,
        export_dir,
    };
    let runtime = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || engine_room_tui::run_app(args, runtime))
        .await?
        .map_err(|e| anyhow::anyhow!("{e:?}"))
}
