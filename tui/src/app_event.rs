use engine_room_core::Notice;
use engine_room_core::advisory::AdvisoryOutcome;
use engine_room_core::board::ViewGeneration;

/// Results delivered to the UI thread by background tasks.
#[derive(Debug)]
pub(crate) enum AppEvent {
    /// Show a toast.
    Notice(Notice),

    /// An advisory run for the detail view opened as `generation` resolved.
    AdvisoryFinished {
        generation: ViewGeneration,
        outcome: AdvisoryOutcome,
    },

    /// The settings "test connection" request finished.
    ConnectionTested(Notice),
}
