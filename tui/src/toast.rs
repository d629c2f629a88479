//! Stacked, self-expiring notifications in the lower-right corner.

use std::collections::VecDeque;
use std::time::Duration;
use std::time::Instant;

use engine_room_core::Notice;
use engine_room_core::NoticeLevel;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use unicode_width::UnicodeWidthStr;

const MAX_WIDTH: u16 = 44;
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone)]
struct Toast {
    notice: Notice,
    expires_at: Instant,
}

#[derive(Debug)]
pub(crate) struct Toasts {
    items: VecDeque<Toast>,
    ttl: Duration,
}

impl Toasts {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub(crate) fn push(&mut self, notice: Notice, now: Instant) {
        tracing::debug!("toast: {notice}");
        self.items.push_back(Toast {
            notice,
            expires_at: now + self.ttl,
        });
        while self.items.len() > MAX_VISIBLE {
            self.items.pop_front();
        }
    }

    /// Drop expired toasts. Returns whether any were removed.
    pub(crate) fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|toast| toast.expires_at > now);
        self.items.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn messages(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|toast| toast.notice.message.as_str())
            .collect()
    }

    /// Newest toast at the bottom.
    pub(crate) fn render(&self, area: Rect, buf: &mut Buffer) {
        let width = MAX_WIDTH.min(area.width);
        if width < 6 {
            return;
        }
        let text_width = usize::from(width - 2);
        let mut bottom = area.bottom();
        for toast in self.items.iter().rev() {
            let lines = toast.notice.message.width().div_ceil(text_width).max(1);
            let height = u16::try_from(lines).unwrap_or(u16::MAX).saturating_add(2);
            if bottom < area.y + height {
                break;
            }
            let rect = Rect::new(area.right() - width, bottom - height, width, height);
            render_toast(&toast.notice, rect, buf);
            bottom -= height;
        }
    }
}

fn level_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Error => Color::Red,
    }
}

fn render_toast(notice: &Notice, area: Rect, buf: &mut Buffer) {
    Clear.render(area, buf);
    let color = level_color(notice.level);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", notice.title()),
            Style::default().fg(color).bold(),
        ));
    Paragraph::new(notice.message.as_str())
        .wrap(Wrap { trim: true })
        .block(block)
        .render(area, buf);
}
