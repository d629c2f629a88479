//! Terminal styling for command output.

use engine_room_core::Notice;
use engine_room_core::NoticeLevel;
use engine_room_core::presentation::VerdictTone;
use owo_colors::OwoColorize;
use supports_color::Stream;

/// Applies colors only when the stream supports them (and `NO_COLOR` is unset).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    enabled: bool,
}

impl Palette {
    pub(crate) fn stdout() -> Self {
        Self::for_stream(Stream::Stdout)
    }

    pub(crate) fn stderr() -> Self {
        Self::for_stream(Stream::Stderr)
    }

    fn for_stream(stream: Stream) -> Self {
        Self {
            enabled: supports_color::on_cached(stream).is_some(),
        }
    }

    pub(crate) fn heading(self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn dim(self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn success(self, text: &str) -> String {
        if self.enabled {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn error(self, text: &str) -> String {
        if self.enabled {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn info(self, text: &str) -> String {
        if self.enabled {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn verdict(self, text: &str, tone: VerdictTone) -> String {
        match tone {
            VerdictTone::Positive => self.success(text),
            VerdictTone::Negative => self.error(text),
        }
    }
}

/// Errors go to stderr, everything else to stdout.
pub(crate) fn print_notice(notice: &Notice) {
    let line = |palette: Palette| {
        let title = match notice.level {
            NoticeLevel::Error => palette.error(notice.title()),
            NoticeLevel::Success => palette.success(notice.title()),
            NoticeLevel::Info => palette.info(notice.title()),
        };
        format!("{title}: {}", notice.message)
    };
    if notice.is_error() {
        eprintln!("{}", line(Palette::stderr()));
    } else {
        println!("{}", line(Palette::stdout()));
    }
}
