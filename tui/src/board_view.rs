//! Board rendering.
//!
//! Every frame rebuilds the [`HitTree`] from the rectangles it draws, so mouse
//! hits and drops always resolve against what is currently on screen.

use engine_room_core::RecordId;
use engine_room_core::board::Area;
use engine_room_core::board::BoardProjection;
use engine_room_core::board::BoardStats;
use engine_room_core::board::ColumnView;
use engine_room_core::board::DragPayload;
use engine_room_core::board::HitTree;
use engine_room_core::board::NodeId;
use engine_room_core::board::NodeKind;
use engine_room_core::record::ApplicationRecord;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::line_input::LineInput;
use crate::render::hint_line;

pub(crate) const CARD_HEIGHT: u16 = 5;

const SEARCH_LABEL: &str = "  Search: ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CardFocus {
    pub(crate) column: usize,
    pub(crate) row: usize,
}

/// A card being dragged with the mouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Drag {
    pub(crate) id: RecordId,
    /// Encoded [`DragPayload`]; the only thing the drop reads.
    pub(crate) payload: String,
    origin: (u16, u16),
    pub(crate) pointer: (u16, u16),
}

impl Drag {
    pub(crate) fn start(id: RecordId, column: u16, row: u16) -> Self {
        Self {
            id,
            payload: DragPayload(id).encode(),
            origin: (column, row),
            pointer: (column, row),
        }
    }

    pub(crate) fn move_to(&mut self, column: u16, row: u16) {
        self.pointer = (column, row);
    }

    /// A press and release on the same cell is a click, not a drag.
    pub(crate) fn has_moved(&self) -> bool {
        self.origin != self.pointer
    }
}

/// View-only board state: keyboard focus, an in-flight drag and the search
/// field. None of it is persisted.
#[derive(Debug, Default)]
pub(crate) struct BoardUi {
    pub(crate) focus: CardFocus,
    pub(crate) drag: Option<Drag>,
    pub(crate) search: LineInput,
    pub(crate) searching: bool,
}

impl BoardUi {
    /// Keep the focus inside the projection after it changed shape.
    pub(crate) fn clamp_focus(&mut self, projection: &BoardProjection<'_>) {
        let Some(last_column) = projection.columns.len().checked_sub(1) else {
            self.focus = CardFocus::default();
            return;
        };
        self.focus.column = self.focus.column.min(last_column);
        let len = projection.columns[self.focus.column].len();
        self.focus.row = self.focus.row.min(len.saturating_sub(1));
    }

    pub(crate) fn focused_record(&self, projection: &BoardProjection<'_>) -> Option<RecordId> {
        projection
            .columns
            .get(self.focus.column)?
            .records
            .get(self.focus.row)
            .map(|record| record.id)
    }

    /// Move the focus onto `id`. Returns `false` when it is not visible.
    pub(crate) fn focus_record(&mut self, projection: &BoardProjection<'_>, id: RecordId) -> bool {
        for (column, view) in projection.columns.iter().enumerate() {
            if let Some(row) = view.records.iter().position(|record| record.id == id) {
                self.focus = CardFocus { column, row };
                return true;
            }
        }
        false
    }
}

pub(crate) struct BoardFrame<'a> {
    pub(crate) projection: &'a BoardProjection<'a>,
    pub(crate) stats: BoardStats,
    pub(crate) ui: &'a BoardUi,
    /// Draw the focus highlight (off while a modal is open).
    pub(crate) show_focus: bool,
}

fn to_area(rect: Rect) -> Area {
    Area::new(rect.x, rect.y, rect.width, rect.height)
}

/// Draw the whole board and register its regions in `tree`.
///
/// Returns the cursor position while the search field has focus.
pub(crate) fn render_board(
    area: Rect,
    buf: &mut Buffer,
    frame: &BoardFrame<'_>,
    tree: &mut HitTree,
) -> Option<Position> {
    tree.clear();
    let [header, stats, columns, hints] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let cursor = render_header(header, buf, frame.ui);
    render_stats(stats, buf, frame.stats);
    render_columns(columns, buf, frame, tree);

    hint_line(&[
        ("←↑↓→", " select  "),
        ("⇧←/⇧→", " move  "),
        ("Enter", " open  "),
        ("/", " search  "),
        ("e", " export  "),
        ("s", " settings  "),
        ("q", " quit"),
    ])
    .render(hints, buf);

    if let Some(drag) = frame.ui.drag.as_ref().filter(|drag| drag.has_moved()) {
        render_drag_ghost(area, buf, frame.projection, drag);
    }
    cursor
}

fn render_header(area: Rect, buf: &mut Buffer, ui: &BoardUi) -> Option<Position> {
    const TITLE: &str = " THE ENGINE ROOM ";
    let mut spans = vec![Span::styled(
        TITLE,
        Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
    )];
    if ui.searching || !ui.search.text().is_empty() {
        spans.push(Span::styled(SEARCH_LABEL, Style::default().dim()));
        spans.push(Span::raw(ui.search.text()));
    }
    Line::from(spans).render(area, buf);

    ui.searching.then(|| {
        let offset = u16::try_from(TITLE.width() + SEARCH_LABEL.width()).unwrap_or(u16::MAX);
        let x = area
            .x
            .saturating_add(offset)
            .saturating_add(ui.search.cursor_offset())
            .min(area.right().saturating_sub(1));
        Position::new(x, area.y)
    })
}

fn render_stats(area: Rect, buf: &mut Buffer, stats: BoardStats) {
    let sep = || Span::styled("  │  ", Style::default().fg(Color::DarkGray));
    let value = |text: String| Span::styled(text, Style::default().bold());
    Line::from(vec![
        Span::raw(" Total "),
        value(stats.total.to_string()),
        sep(),
        Span::raw("Pending "),
        value(stats.pending_count.to_string()),
        sep(),
        Span::raw("Acceptance "),
        value(stats.rate_display()),
        sep(),
        Span::raw("Pipeline "),
        Span::styled(stats.pipeline_display(), Style::default().fg(Color::Green).bold()),
    ])
    .render(area, buf);
}

fn render_columns(area: Rect, buf: &mut Buffer, frame: &BoardFrame<'_>, tree: &mut HitTree) {
    let count = frame.projection.columns.len();
    if count == 0 {
        return;
    }
    let board = tree.push(NodeKind::Board, to_area(area), None);
    let ratio = u32::try_from(count).unwrap_or(1);
    let rects = Layout::horizontal(vec![Constraint::Ratio(1, ratio); count]).split(area);
    for (index, (column, rect)) in frame.projection.columns.iter().zip(rects.iter()).enumerate() {
        let focused_column = frame.show_focus && frame.ui.focus.column == index;
        render_column(*rect, buf, frame, column, focused_column, board, tree);
    }
}

fn render_column(
    area: Rect,
    buf: &mut Buffer,
    frame: &BoardFrame<'_>,
    column: &ColumnView<'_>,
    focused_column: bool,
    board: NodeId,
    tree: &mut HitTree,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ({}) ", column.label, column.len()));
    let body = block.inner(area);

    let hovered = frame.ui.drag.as_ref().is_some_and(|drag| {
        drag.has_moved() && body.contains(Position::new(drag.pointer.0, drag.pointer.1))
    });
    let border_style = if hovered {
        Style::default().fg(Color::Cyan).bold()
    } else if focused_column {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let capacity = usize::from(body.height / CARD_HEIGHT);
    let offset = if focused_column {
        frame.ui.focus.row.saturating_sub(capacity.saturating_sub(1))
    } else {
        0
    };
    let shown = capacity.min(column.len().saturating_sub(offset));
    let hidden = column.len() - shown;

    let mut block = block.border_style(border_style);
    if hidden > 0 {
        block = block.title_bottom(Line::from(format!(" +{hidden} more ")).right_aligned());
    }
    block.render(area, buf);

    let column_id = tree.push(NodeKind::Column(column.status.clone()), to_area(area), Some(board));
    tree.push(
        NodeKind::ColumnHeader(column.status.clone()),
        to_area(Rect { height: 1, ..area }),
        Some(column_id),
    );
    let body_id = tree.push(
        NodeKind::ColumnBody(column.status.clone()),
        to_area(body),
        Some(column_id),
    );

    if column.is_empty() {
        let empty = Rect {
            y: body.y.saturating_add(1),
            height: body.height.saturating_sub(1),
            ..body
        };
        Paragraph::new(Span::styled("No Items", Style::default().dim().italic()))
            .centered()
            .render(empty, buf);
        return;
    }

    for (slot, (row, record)) in column
        .records
        .iter()
        .enumerate()
        .skip(offset)
        .take(shown)
        .enumerate()
    {
        let y = body.y + CARD_HEIGHT * u16::try_from(slot).unwrap_or(u16::MAX);
        let rect = Rect::new(body.x, y, body.width, CARD_HEIGHT);
        let focused = focused_column && frame.ui.focus.row == row;
        let dragged = frame
            .ui
            .drag
            .as_ref()
            .is_some_and(|drag| drag.id == record.id && drag.has_moved());
        render_card(rect, buf, record, focused, dragged, body_id, tree);
    }
}

fn render_card(
    area: Rect,
    buf: &mut Buffer,
    record: &ApplicationRecord,
    focused: bool,
    dragged: bool,
    body: NodeId,
    tree: &mut HitTree,
) {
    let border_style = if dragged {
        Style::default().fg(Color::DarkGray).dim()
    } else if focused {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    block.render(area, buf);
    let card = tree.push(NodeKind::Card(record.id), to_area(area), Some(body));

    let date = if record.date.is_empty() {
        String::new()
    } else {
        format!(" · {}", record.date)
    };
    let lines = [
        Line::from(Span::styled(record.display_title(), Style::default().bold())),
        Line::from(Span::styled(record.name.as_str(), Style::default().fg(Color::Gray))),
        Line::from(vec![
            Span::styled(record.stage.as_str().to_uppercase(), Style::default().fg(Color::Magenta)),
            Span::styled(date, Style::default().dim()),
        ]),
    ];
    for (offset, line) in (0u16..).zip(lines) {
        if offset >= inner.height {
            break;
        }
        let rect = Rect {
            y: inner.y + offset,
            height: 1,
            ..inner
        };
        line.render(rect, buf);
        tree.push(NodeKind::CardPart, to_area(rect), Some(card));
    }
}

/// Title of the dragged card drawn at the pointer.
fn render_drag_ghost(area: Rect, buf: &mut Buffer, projection: &BoardProjection<'_>, drag: &Drag) {
    let Some(record) = projection.visible().find(|record| record.id == drag.id) else {
        return;
    };
    let (x, y) = drag.pointer;
    if !area.contains(Position::new(x, y)) {
        return;
    }
    let label = format!(" ⇢ {} ", record.display_title());
    let max_width = usize::from(area.right() - x);
    buf.set_stringn(
        x,
        y,
        label,
        max_width,
        Style::default().fg(Color::Black).bg(Color::Cyan),
    );
}
