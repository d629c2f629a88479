use ratatui::layout::Rect;
use ratatui::prelude::*;

/// Rectangle of at most `width` x `height` centred in `area`.
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// `key` highlighted, followed by its dimmed action text.
fn key_hint(key: &'static str, action: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Cyan)),
        Span::styled(action, Style::default().dim()),
    ]
}

pub(crate) fn hint_line(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    Line::from(
        hints
            .iter()
            .flat_map(|&(key, action)| key_hint(key, action))
            .collect::<Vec<_>>(),
    )
}
