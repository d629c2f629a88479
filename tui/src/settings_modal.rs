//! API credential and model entry.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use engine_room_core::settings::API_KEY_ENV;
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;

use crate::line_input::LineInput;
use crate::render::centered_rect;
use crate::render::hint_line;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsField {
    ApiKey,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingsAction {
    None,
    Close,
    /// Persist; an empty key clears the stored credential.
    Save { api_key: String, model: String },
    /// Check the entered (unsaved) credential.
    Test { api_key: String, model: String },
}

#[derive(Debug)]
pub(crate) struct SettingsModal {
    api_key: LineInput,
    model: LineInput,
    default_model: String,
    field: SettingsField,
    testing: bool,
    env_override: bool,
}

impl SettingsModal {
    pub(crate) fn new(
        stored_api_key: Option<String>,
        model: String,
        default_model: String,
        env_override: bool,
    ) -> Self {
        Self {
            api_key: LineInput::new(stored_api_key.unwrap_or_default()),
            model: LineInput::new(model),
            default_model,
            field: SettingsField::ApiKey,
            testing: false,
            env_override,
        }
    }

    pub(crate) fn is_testing(&self) -> bool {
        self.testing
    }

    pub(crate) fn finish_test(&mut self) {
        self.testing = false;
    }

    fn field_mut(&mut self) -> &mut LineInput {
        match self.field {
            SettingsField::ApiKey => &mut self.api_key,
            SettingsField::Model => &mut self.model,
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> SettingsAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => SettingsAction::Close,
            KeyCode::Enter => SettingsAction::Save {
                api_key: self.api_key.text().to_string(),
                model: self.model.text().to_string(),
            },
            KeyCode::Char('t') if ctrl => {
                if self.testing {
                    return SettingsAction::None;
                }
                self.testing = true;
                SettingsAction::Test {
                    api_key: self.api_key.text().to_string(),
                    model: self.model.text().to_string(),
                }
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.field = match self.field {
                    SettingsField::ApiKey => SettingsField::Model,
                    SettingsField::Model => SettingsField::ApiKey,
                };
                SettingsAction::None
            }
            _ => {
                self.field_mut().handle_key(key);
                SettingsAction::None
            }
        }
    }

    fn field_line<'a>(&self, field: SettingsField, value: Span<'a>) -> Line<'a> {
        let focused = self.field == field;
        let marker = if focused { "› " } else { "  " };
        let marker_style = if focused {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().dim()
        };
        Line::from(vec![Span::styled(marker, marker_style), value])
    }

    /// Returns the cursor position in the focused field.
    pub(crate) fn render(&self, area: Rect, buf: &mut Buffer) -> Option<Position> {
        let popup = centered_rect(area, 64, 13);
        Clear.render(popup, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Settings ");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let key_value = if self.api_key.text().is_empty() {
            Span::styled("(none)", Style::default().dim())
        } else {
            Span::raw(self.api_key.masked())
        };
        let model_value = if self.model.text().is_empty() {
            Span::styled(self.default_model.as_str(), Style::default().dim())
        } else {
            Span::raw(self.model.text())
        };
        let mode = if self.testing {
            Span::styled("Testing connection...", Style::default().fg(Color::Yellow).italic())
        } else if self.api_key.text().trim().is_empty() {
            Span::styled("Mode: Simulation", Style::default().fg(Color::Magenta))
        } else {
            Span::styled("Mode: Gemini", Style::default().fg(Color::Green))
        };

        let mut lines = vec![
            Line::from(Span::styled("Gemini API Key", Style::default().dim())),
            self.field_line(SettingsField::ApiKey, key_value),
            Line::default(),
            Line::from(Span::styled("Model", Style::default().dim())),
            self.field_line(SettingsField::Model, model_value),
            Line::default(),
            Line::from(mode),
            Line::from(Span::styled(
                "Save an empty key to return to simulation.",
                Style::default().dim(),
            )),
        ];
        if self.env_override {
            lines.push(Line::from(Span::styled(
                format!("{API_KEY_ENV} is set and takes precedence."),
                Style::default().fg(Color::Yellow),
            )));
        }
        Paragraph::new(lines).render(inner, buf);

        if let Some(hints) = inner.rows().last() {
            hint_line(&[
                ("Enter", " save  "),
                ("Ctrl+T", " test  "),
                ("Tab", " field  "),
                ("Esc", " close"),
            ])
            .render(hints, buf);
        }

        let (row, offset) = match self.field {
            SettingsField::ApiKey => (1, self.api_key.cursor()),
            SettingsField::Model => (4, usize::from(self.model.cursor_offset())),
        };
        let x = inner
            .x
            .saturating_add(2)
            .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
        (inner.height > row && x < inner.right()).then(|| Position::new(x, inner.y + row))
    }
}
