use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;

use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use engine_room_core::Board;
use engine_room_core::EngineRoomConfig;
use engine_room_core::Notice;
use engine_room_core::RecordId;
use engine_room_core::Status;
use engine_room_core::advisory::AdvisoryEngine;
use engine_room_core::advisory::Cancelled;
use engine_room_core::board::HitTree;
use engine_room_core::export::ExportError;
use engine_room_core::export::write_export;
use engine_room_core::settings::API_KEY_ENV;
use engine_room_core::settings::Settings;
use engine_room_core::settings::test_connection;
use ratatui::Frame;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::AppArgs;
use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::board_view::BoardFrame;
use crate::board_view::BoardUi;
use crate::board_view::Drag;
use crate::board_view::render_board;
use crate::detail_modal::DetailAction;
use crate::detail_modal::DetailModal;
use crate::settings_modal::SettingsAction;
use crate::settings_modal::SettingsModal;
use crate::toast::Toasts;

enum Modal {
    Detail(DetailModal),
    Settings(SettingsModal),
}

pub(crate) struct App {
    board: Board,
    settings: Settings,
    config: EngineRoomConfig,
    export_dir: PathBuf,
    runtime: Handle,
    app_event_tx: AppEventSender,

    /// Regions of the last drawn frame, for mouse hits and drops.
    hit_tree: HitTree,
    ui: BoardUi,
    modal: Option<Modal>,
    toasts: Toasts,

    /// Cancels the advisory run of the open detail view.
    advisory_cancel: Option<CancellationToken>,
    connection_cancel: Option<CancellationToken>,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(args: AppArgs, runtime: Handle, app_event_tx: AppEventSender) -> Self {
        let AppArgs {
            config,
            store,
            export_dir,
        } = args;
        let settings = Settings::new(store.kv(), config.advisory.default_model.clone());
        let toasts = Toasts::new(config.presentation.toast());
        Self {
            board: Board::new(store),
            settings,
            config,
            export_dir,
            runtime,
            app_event_tx,
            hit_tree: HitTree::new(),
            ui: BoardUi::default(),
            modal: None,
            toasts,
            advisory_cancel: None,
            connection_cancel: None,
            should_quit: false,
        }
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Whether the next frame should come soon (animations, toasts, drags).
    pub(crate) fn is_animating(&self) -> bool {
        let modal_busy = match &self.modal {
            Some(Modal::Detail(detail)) => detail.is_animating(),
            Some(Modal::Settings(settings)) => settings.is_testing(),
            None => false,
        };
        modal_busy || !self.toasts.is_empty() || self.ui.drag.is_some()
    }

    fn toast(&mut self, notice: Notice) {
        self.toasts.push(notice, Instant::now());
    }

    pub(crate) fn tick(&mut self, delta: Duration, now: Instant) {
        self.toasts.expire(now);
        if let Some(Modal::Detail(detail)) = &mut self.modal {
            detail.tick(delta);
        }
    }

    pub(crate) fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.handle_key(key);
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    pub(crate) fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Notice(notice) => self.toast(notice),
            AppEvent::AdvisoryFinished {
                generation,
                outcome,
            } => match &mut self.modal {
                Some(Modal::Detail(detail))
                    if detail.generation() == generation && self.board.is_current(generation) =>
                {
                    tracing::info!(
                        "advisory report for {} ready ({})",
                        detail.record().id,
                        outcome.source()
                    );
                    detail.finish_report(outcome, &self.config.presentation);
                    self.advisory_cancel = None;
                }
                _ => tracing::debug!("dropping advisory result for a closed view"),
            },
            AppEvent::ConnectionTested(notice) => {
                if let Some(Modal::Settings(settings)) = &mut self.modal {
                    settings.finish_test();
                }
                self.connection_cancel = None;
                self.toast(notice);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match &mut self.modal {
            Some(Modal::Detail(detail)) => {
                let action = detail.handle_key(key);
                self.on_detail_action(action);
            }
            Some(Modal::Settings(settings)) => {
                let action = settings.handle_key(key);
                self.on_settings_action(action);
            }
            None if self.ui.searching => self.handle_search_key(key),
            None => self.handle_board_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.ui.searching = false;
                self.set_filter(String::new());
            }
            KeyCode::Enter => self.ui.searching = false,
            _ => {
                if self.ui.search.handle_key(key) {
                    let text = self.ui.search.text().to_string();
                    self.set_filter(text);
                }
            }
        }
    }

    fn set_filter(&mut self, text: String) {
        if text.is_empty() {
            self.ui.search.clear();
        }
        self.board.set_filter(text);
        self.ui.clamp_focus(&self.board.projection());
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.ui.searching = true,
            KeyCode::Char('s') => self.open_settings(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Esc if !self.board.filter().is_empty() => self.set_filter(String::new()),
            KeyCode::Enter => {
                let focused = self.ui.focused_record(&self.board.projection());
                if let Some(id) = focused {
                    self.open_detail(id);
                }
            }
            KeyCode::Left if shift => self.move_focused(-1),
            KeyCode::Right if shift => self.move_focused(1),
            KeyCode::Left => self.move_focus(-1, 0),
            KeyCode::Right => self.move_focus(1, 0),
            KeyCode::Up => self.move_focus(0, -1),
            KeyCode::Down => self.move_focus(0, 1),
            _ => {}
        }
    }

    fn move_focus(&mut self, columns: isize, rows: isize) {
        let focus = &mut self.ui.focus;
        focus.column = focus.column.saturating_add_signed(columns);
        focus.row = focus.row.saturating_add_signed(rows);
        self.ui.clamp_focus(&self.board.projection());
    }

    /// Keyboard equivalent of dragging the focused card one column over.
    fn move_focused(&mut self, columns: isize) {
        let (id, target) = {
            let projection = self.board.projection();
            let Some(id) = self.ui.focused_record(&projection) else {
                return;
            };
            let target = self
                .ui
                .focus
                .column
                .checked_add_signed(columns)
                .and_then(|index| Status::COLUMNS.get(index))
                .cloned();
            (id, target)
        };
        let Some(status) = target else {
            return;
        };
        if let Some(notice) = self.board.move_card(id, &status) {
            self.toast(notice);
        }
        self.follow(id);
    }

    /// Keep the focus on `id` after the board changed.
    fn follow(&mut self, id: RecordId) {
        let projection = self.board.projection();
        if !self.ui.focus_record(&projection, id) {
            self.ui.clamp_focus(&projection);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.modal.is_some() {
            return;
        }
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.ui.drag = self
                    .hit_tree
                    .card_at(column, row)
                    .map(|id| Drag::start(id, column, row));
                if let Some(id) = self.ui.drag.as_ref().map(|drag| drag.id) {
                    self.follow(id);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(drag) = &mut self.ui.drag {
                    drag.move_to(column, row);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(mut drag) = self.ui.drag.take() else {
                    return;
                };
                drag.move_to(column, row);
                if !drag.has_moved() {
                    self.open_detail(drag.id);
                    return;
                }
                if let Some(notice) =
                    self.board
                        .drop_card(&drag.payload, &self.hit_tree, column, row)
                {
                    self.toast(notice);
                }
                self.follow(drag.id);
            }
            _ => {}
        }
    }

    fn open_detail(&mut self, id: RecordId) {
        self.cancel_advisory();
        if self.board.select(id).is_none() {
            tracing::warn!("application {id} is gone, not opening it");
            self.ui.clamp_focus(&self.board.projection());
            return;
        }
        let (Some(selection), Some(record)) =
            (self.board.selection(), self.board.selected_record().cloned())
        else {
            return;
        };
        tracing::debug!("opened detail view for {id}");
        self.modal = Some(Modal::Detail(DetailModal::new(record, selection.generation)));
    }

    fn close_detail(&mut self) {
        self.cancel_advisory();
        self.board.close();
        self.modal = None;
        self.ui.clamp_focus(&self.board.projection());
    }

    fn cancel_advisory(&mut self) {
        if let Some(cancel) = self.advisory_cancel.take() {
            cancel.cancel();
        }
    }

    fn on_detail_action(&mut self, action: DetailAction) {
        match action {
            DetailAction::None => {}
            DetailAction::Close => self.close_detail(),
            DetailAction::Save(patch) => {
                if let Some(notice) = self.board.save_selection(patch) {
                    self.toast(notice);
                }
                // The board clears its selection once the edit is persisted.
                if self.board.selection().is_none() {
                    self.close_detail();
                }
            }
            DetailAction::Generate => self.start_advisory(),
        }
    }

    fn start_advisory(&mut self) {
        let Some(Modal::Detail(detail)) = &self.modal else {
            return;
        };
        let record = detail.record().clone();
        let generation = detail.generation();
        let engine =
            AdvisoryEngine::from_config(&self.config.advisory, self.settings.resolve_credentials());
        tracing::info!(
            "generating advisory report for {} ({})",
            record.id,
            if engine.is_remote() { "remote" } else { "simulation" }
        );

        let cancel = CancellationToken::new();
        if let Some(previous) = self.advisory_cancel.replace(cancel.clone()) {
            previous.cancel();
        }
        let tx = self.app_event_tx.clone();
        self.runtime.spawn(async move {
            let notices = tx.clone();
            let notify = move |notice| notices.send_notice(notice);
            match engine.run(&record, notify, &cancel).await {
                Ok(outcome) => tx.send(AppEvent::AdvisoryFinished {
                    generation,
                    outcome,
                }),
                Err(Cancelled) => tracing::debug!("advisory run for {} cancelled", record.id),
            }
        });
    }

    fn open_settings(&mut self) {
        let env_override = std::env::var(API_KEY_ENV).is_ok_and(|value| !value.trim().is_empty());
        self.modal = Some(Modal::Settings(SettingsModal::new(
            self.settings.stored_api_key(),
            self.settings.model(),
            self.settings.default_model().to_string(),
            env_override,
        )));
    }

    fn close_settings(&mut self) {
        if let Some(cancel) = self.connection_cancel.take() {
            cancel.cancel();
        }
        self.modal = None;
    }

    fn on_settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::None => {}
            SettingsAction::Close => self.close_settings(),
            SettingsAction::Save { api_key, model } => {
                match self.settings.save(&api_key, Some(model.as_str())) {
                    Ok(notice) => {
                        self.toast(notice);
                        self.close_settings();
                    }
                    Err(e) => {
                        tracing::error!("failed to save settings: {e}");
                        self.toast(Notice::error(format!("Could not save settings: {e}")));
                    }
                }
            }
            SettingsAction::Test { api_key, model } => {
                let cancel = CancellationToken::new();
                self.connection_cancel = Some(cancel.clone());
                let config = self.config.advisory.clone();
                let tx = self.app_event_tx.clone();
                self.runtime.spawn(async move {
                    let notice =
                        test_connection(&config, &api_key, Some(model.as_str()), &cancel).await;
                    tx.send(AppEvent::ConnectionTested(notice));
                });
            }
        }
    }

    fn export(&mut self) {
        self.board.refresh();
        let records = self.board.records();
        let now_ms = chrono::Utc::now().timestamp_millis();
        let notice = match write_export(&self.export_dir, records, now_ms) {
            Ok(path) => Notice::success(format!(
                "Exported {} applications to {}",
                records.len(),
                path.display()
            )),
            Err(e @ ExportError::Empty) => Notice::error(e.to_string()),
            Err(e) => {
                tracing::error!("export failed: {e}");
                Notice::error(format!("Export failed: {e}"))
            }
        };
        self.toast(notice);
        self.ui.clamp_focus(&self.board.projection());
    }

    pub(crate) fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let buf = frame.buffer_mut();

        let projection = self.board.projection();
        self.ui.clamp_focus(&projection);
        let board_frame = BoardFrame {
            projection: &projection,
            stats: self.board.stats(),
            ui: &self.ui,
            show_focus: self.modal.is_none(),
        };
        let board_cursor = render_board(area, buf, &board_frame, &mut self.hit_tree);
        let cursor = match &self.modal {
            Some(Modal::Detail(detail)) => detail.render(area, buf),
            Some(Modal::Settings(settings)) => settings.render(area, buf),
            None => board_cursor,
        };
        self.toasts.render(area, buf);

        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }
}
