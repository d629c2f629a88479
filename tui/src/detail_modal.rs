//! Detail view for one application: every answer, the reviewer's notes and
//! status, and the AI advisory panel.

use std::time::Duration;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use engine_room_core::Status;
use engine_room_core::advisory::AdvisoryOutcome;
use engine_room_core::board::RecordPatch;
use engine_room_core::board::ViewGeneration;
use engine_room_core::config::PresentationConfig;
use engine_room_core::presentation::ReportPresentation;
use engine_room_core::presentation::VerdictTone;
use engine_room_core::record::ApplicationRecord;
use engine_room_core::record::answer_or_na;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;

use crate::line_input::LineInput;
use crate::render::centered_rect;
use crate::render::hint_line;

#[derive(Debug)]
pub(crate) enum ReportState {
    Idle,
    /// A run is in flight; generating again is disabled.
    Pending,
    Ready {
        presentation: ReportPresentation,
        source: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailField {
    Status,
    Notes,
}

/// What the app should do after a key press in the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DetailAction {
    None,
    Close,
    Save(RecordPatch),
    Generate,
}

#[derive(Debug)]
pub(crate) struct DetailModal {
    record: ApplicationRecord,
    generation: ViewGeneration,
    /// Index into [`Status::COLUMNS`]; `None` keeps a status outside the board.
    status: Option<usize>,
    notes: LineInput,
    field: DetailField,
    report: ReportState,
    scroll: u16,
}

impl DetailModal {
    pub(crate) fn new(record: ApplicationRecord, generation: ViewGeneration) -> Self {
        let status = record.status.column_index();
        let notes = LineInput::new(record.notes.clone());
        Self {
            record,
            generation,
            status,
            notes,
            field: DetailField::Status,
            report: ReportState::Idle,
            scroll: 0,
        }
    }

    pub(crate) fn generation(&self) -> ViewGeneration {
        self.generation
    }

    pub(crate) fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self.report, ReportState::Pending)
    }

    /// Whether the modal needs frequent redraws.
    pub(crate) fn is_animating(&self) -> bool {
        match &self.report {
            ReportState::Idle => false,
            ReportState::Pending => true,
            ReportState::Ready { presentation, .. } => !presentation.is_done(),
        }
    }

    pub(crate) fn finish_report(&mut self, outcome: AdvisoryOutcome, config: &PresentationConfig) {
        let source = outcome.source();
        self.report = ReportState::Ready {
            presentation: ReportPresentation::new(outcome.into_report(), config),
            source,
        };
    }

    pub(crate) fn tick(&mut self, delta: Duration) {
        if let ReportState::Ready { presentation, .. } = &mut self.report {
            presentation.tick(delta);
        }
    }

    fn skip_animation(&mut self) -> bool {
        match &mut self.report {
            ReportState::Ready { presentation, .. } if !presentation.is_done() => {
                presentation.skip();
                true
            }
            _ => false,
        }
    }

    fn generate(&mut self) -> DetailAction {
        if self.is_pending() {
            return DetailAction::None;
        }
        self.report = ReportState::Pending;
        DetailAction::Generate
    }

    fn patch(&self) -> RecordPatch {
        RecordPatch {
            notes: Some(self.notes.text().to_string()),
            status: self.status.map(|index| Status::COLUMNS[index].clone()),
        }
    }

    fn cycle_status(&mut self, forward: bool) {
        let count = Status::COLUMNS.len();
        self.status = Some(match (self.status, forward) {
            (None, _) => 0,
            (Some(index), true) => (index + 1) % count,
            (Some(index), false) => (index + count - 1) % count,
        });
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> DetailAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return DetailAction::Close,
            KeyCode::Char('s') if ctrl => return DetailAction::Save(self.patch()),
            KeyCode::Char('g') if ctrl => return self.generate(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.field = match self.field {
                    DetailField::Status => DetailField::Notes,
                    DetailField::Notes => DetailField::Status,
                };
                return DetailAction::None;
            }
            _ => {}
        }

        match self.field {
            DetailField::Notes => {
                self.notes.handle_key(key);
                DetailAction::None
            }
            DetailField::Status => match key.code {
                KeyCode::Char('g') => self.generate(),
                KeyCode::Left => {
                    self.cycle_status(false);
                    DetailAction::None
                }
                KeyCode::Right => {
                    self.cycle_status(true);
                    DetailAction::None
                }
                KeyCode::Up => {
                    self.scroll = self.scroll.saturating_sub(1);
                    DetailAction::None
                }
                KeyCode::Down => {
                    self.scroll = self.scroll.saturating_add(1);
                    DetailAction::None
                }
                KeyCode::Enter if self.skip_animation() => DetailAction::None,
                KeyCode::Enter => DetailAction::Save(self.patch()),
                _ => DetailAction::None,
            },
        }
    }

    /// Returns the cursor position while notes are being edited.
    pub(crate) fn render(&self, area: Rect, buf: &mut Buffer) -> Option<Position> {
        let popup = centered_rect(
            area,
            area.width.saturating_sub(8).max(40),
            area.height.saturating_sub(2).max(18),
        );
        Clear.render(popup, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} ", self.record.display_title()));
        let inner = block.inner(popup);
        block.render(popup, buf);

        let [info, report, notes, hints] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(inner);

        Paragraph::new(self.info_lines())
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(info, buf);
        self.render_report(report, buf);
        let cursor = self.render_notes(notes, buf);

        let generate_hint = if self.is_pending() {
            ("g", " (running)  ")
        } else {
            ("g", " report  ")
        };
        hint_line(&[
            ("Tab", " field  "),
            ("←/→", " status  "),
            generate_hint,
            ("Ctrl+S", " save  "),
            ("Esc", " close"),
        ])
        .render(hints, buf);
        cursor
    }

    fn info_lines(&self) -> Vec<Line<'_>> {
        let record = &self.record;
        let label = |text: &'static str| Span::styled(text, Style::default().dim());
        let heading = |text: &'static str| {
            Line::from(Span::styled(text, Style::default().fg(Color::Cyan).bold()))
        };

        let status_label = match self.status {
            Some(index) => Status::COLUMNS[index].label().unwrap_or_default(),
            None => record.status.as_str(),
        };
        let status_style = if self.field == DetailField::Status {
            Style::default().fg(Color::Black).bg(Color::Yellow).bold()
        } else {
            Style::default().bold()
        };
        let date = if record.date.is_empty() {
            "N/A"
        } else {
            record.date.as_str()
        };

        let mut lines = vec![
            Line::from(vec![label("Founder:   "), Span::raw(record.name.as_str())]),
            Line::from(vec![
                label("Email:     "),
                Span::raw(answer_or_na(record.email.as_deref())),
            ]),
            Line::from(vec![
                label("Phone:     "),
                Span::raw(answer_or_na(record.phone.as_deref())),
            ]),
            Line::from(vec![label("Stage:     "), Span::raw(record.stage.as_str())]),
            Line::from(vec![label("Submitted: "), Span::raw(date)]),
            Line::from(vec![
                label("Status:    "),
                Span::styled(format!(" ◀ {status_label} ▶ "), status_style),
            ]),
        ];
        let answers = [
            ("Pitch", Some(record.description.as_str())),
            ("Customers", record.customers.as_deref()),
            ("Revenue Model", record.revenue_model.as_deref()),
            ("Competitors", record.competitors.as_deref()),
            ("Funding", record.funding.as_deref()),
        ];
        for (title, answer) in answers {
            lines.push(Line::default());
            lines.push(heading(title));
            lines.push(Line::from(answer_or_na(answer)));
        }
        lines
    }

    fn render_report(&self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" AI Advisory ");
        if let ReportState::Ready { source, .. } = &self.report {
            block = block.title_bottom(Line::from(format!(" {source} ")).right_aligned().dim());
        }

        let lines = match &self.report {
            ReportState::Idle => vec![Line::from(Span::styled(
                "Press g to generate an advisory report.",
                Style::default().dim(),
            ))],
            ReportState::Pending => vec![Line::from(Span::styled(
                "Analyzing application...",
                Style::default().fg(Color::Yellow).italic(),
            ))],
            ReportState::Ready { presentation, .. } => {
                let color = match presentation.tone() {
                    VerdictTone::Positive => Color::Green,
                    VerdictTone::Negative => Color::Red,
                };
                vec![
                    Line::from(vec![
                        Span::raw("Score "),
                        Span::styled(
                            format!("{}/100", presentation.score()),
                            Style::default().fg(color).bold(),
                        ),
                        Span::raw("  "),
                        Span::styled(
                            presentation.verdict(),
                            Style::default().fg(color).bold(),
                        ),
                    ]),
                    Line::from(presentation.summary()),
                ]
            }
        };
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }

    fn render_notes(&self, area: Rect, buf: &mut Buffer) -> Option<Position> {
        let focused = self.field == DetailField::Notes;
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(" Notes ");
        let inner = block.inner(area);
        block.render(area, buf);

        // Keep the cursor in view for notes wider than the box.
        let offset = self.notes.cursor_offset();
        let scroll = offset.saturating_sub(inner.width.saturating_sub(1));
        Paragraph::new(self.notes.text())
            .scroll((0, scroll))
            .render(inner, buf);

        (focused && inner.width > 0 && inner.height > 0)
            .then(|| Position::new(inner.x + offset - scroll, inner.y))
    }
}
