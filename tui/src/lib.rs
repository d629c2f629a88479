//! Interactive kanban board for The Engine Room.
//!
//! The UI runs on the calling thread. Background work (advisory runs,
//! connection tests) runs on the tokio runtime passed to [`run_app`] and
//! reports back through an [`app_event::AppEvent`] channel drained between
//! frames.

use std::path::Path;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::channel;
use std::time::Duration;
use std::time::Instant;

use crossterm::event;
use engine_room_core::EngineRoomConfig;
use engine_room_core::RecordStore;
use tokio::runtime::Handle;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod app;
mod app_event;
mod app_event_sender;
mod board_view;
mod detail_modal;
mod line_input;
mod render;
mod settings_modal;
#[cfg(test)]
mod test_support;
mod toast;
mod tui;

use crate::app::App;
use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const IDLE_INTERVAL: Duration = Duration::from_millis(250);

pub const LOG_FILE_NAME: &str = "engine-room.log";

/// Everything the board needs from the host.
pub struct AppArgs {
    pub config: EngineRoomConfig,
    pub store: RecordStore,
    /// Where `e` writes CSV exports.
    pub export_dir: PathBuf,
}

/// Run the board until the user quits. Blocks the calling thread.
pub fn run_app(args: AppArgs, runtime: Handle) -> color_eyre::Result<()> {
    color_eyre::install()?;
    let (app_event_tx, app_event_rx) = channel();
    let mut app = App::new(args, runtime, AppEventSender::new(app_event_tx));

    let mut terminal = tui::init()?;
    let result = run_loop(&mut terminal, &mut app, &app_event_rx);
    tui::restore()?;
    terminal.show_cursor()?;
    result
}

fn run_loop(
    terminal: &mut tui::Tui,
    app: &mut App,
    app_event_rx: &Receiver<AppEvent>,
) -> color_eyre::Result<()> {
    let mut last_tick = Instant::now();
    while !app.should_quit() {
        terminal.draw(|frame| app.render(frame))?;

        let timeout = if app.is_animating() {
            FRAME_INTERVAL
        } else {
            IDLE_INTERVAL
        };
        if event::poll(timeout)? {
            app.handle_event(event::read()?);
        }
        while let Ok(app_event) = app_event_rx.try_recv() {
            app.handle_app_event(app_event);
        }

        let now = Instant::now();
        app.tick(now.duration_since(last_tick), now);
        last_tick = now;
    }
    Ok(())
}

/// Send tracing output to `<log_dir>/engine-room.log`; the terminal is busy
/// drawing the board. Keep the guard alive for the whole session.
pub fn init_file_logging(log_dir: &Path) -> color_eyre::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let default_level = "info";
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!("failed to install file logger: {e}"))?;
    Ok(guard)
}
