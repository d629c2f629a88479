//! Board view-controller.
//!
//! [`Board`] is the single owner of the working copy of the collection, the
//! transient search text and the one optional selection used by the detail
//! view. Every user action follows the same path: reload from the store,
//! mutate, persist if something changed, then re-project.

pub mod dnd;
pub mod mutate;
pub mod projection;

pub use dnd::Area;
pub use dnd::DragPayload;
pub use dnd::HitTree;
pub use dnd::NodeId;
pub use dnd::NodeKind;
pub use mutate::MutationError;
pub use mutate::RecordPatch;
pub use mutate::move_record;
pub use mutate::update_fields;
pub use projection::BoardProjection;
pub use projection::BoardStats;
pub use projection::ColumnView;
pub use projection::compute_stats;
pub use projection::matches_filter;
pub use projection::project;

use crate::notice::Notice;
use crate::record::ApplicationRecord;
use crate::record::RecordId;
use crate::record::Status;
use crate::storage::RecordStore;

/// Identifies one opening of the detail view.
///
/// Deferred work started for a view (advisory runs, animations) carries the
/// generation it was started under and is dropped if the board has moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewGeneration(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub id: RecordId,
    pub generation: ViewGeneration,
}

pub struct Board {
    store: RecordStore,
    records: Vec<ApplicationRecord>,
    filter: String,
    selection: Option<Selection>,
    generation: u64,
}

impl Board {
    /// Load the collection from `store`.
    pub fn new(store: RecordStore) -> Self {
        let records = store.load();
        tracing::debug!("board opened with {} records", records.len());
        Self {
            store,
            records,
            filter: String::new(),
            selection: None,
            generation: 0,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&ApplicationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Re-read the collection from storage.
    pub fn refresh(&mut self) {
        self.records = self.store.load();
    }

    pub fn projection(&self) -> BoardProjection<'_> {
        project(&self.records, &self.filter)
    }

    pub fn stats(&self) -> BoardStats {
        compute_stats(&self.records)
    }

    /// Move a card to `status`. Returns a notice only when something changed
    /// (or persisting failed).
    pub fn move_card(&mut self, id: RecordId, status: &Status) -> Option<Notice> {
        let mut records = self.store.load();
        if !move_record(&mut records, id, status) {
            self.records = records;
            return None;
        }
        let notice = match self.store.save(&records) {
            Ok(()) => Notice::success(format!(
                "Moved application to {}",
                status.label().unwrap_or(status.as_str())
            )),
            Err(e) => {
                tracing::error!("failed to persist move of {id}: {e}");
                Notice::error(format!("Could not save change: {e}"))
            }
        };
        self.records = records;
        Some(notice)
    }

    /// Complete a drag: decode the payload, resolve the column under the
    /// pointer and move the card there. Anything unresolvable is ignored.
    pub fn drop_card(
        &mut self,
        payload: &str,
        tree: &HitTree,
        column: u16,
        row: u16,
    ) -> Option<Notice> {
        let Some(DragPayload(id)) = DragPayload::decode(payload) else {
            tracing::debug!("ignoring drop with payload {payload:?}");
            return None;
        };
        let Some(status) = tree.resolve_drop(column, row) else {
            tracing::debug!("ignoring drop of {id} outside any column body");
            return None;
        };
        self.move_card(id, &status)
    }

    /// Open the detail view on `id`. Returns `None` if the record is gone.
    pub fn select(&mut self, id: RecordId) -> Option<Selection> {
        self.refresh();
        self.record(id)?;
        self.generation += 1;
        let selection = Selection {
            id,
            generation: ViewGeneration(self.generation),
        };
        self.selection = Some(selection);
        Some(selection)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn selected_record(&self) -> Option<&ApplicationRecord> {
        self.selection.and_then(|selection| self.record(selection.id))
    }

    /// Close the detail view. Work started for it becomes stale.
    pub fn close(&mut self) {
        self.selection = None;
        self.generation += 1;
    }

    /// Whether `generation` still names the open detail view.
    pub fn is_current(&self, generation: ViewGeneration) -> bool {
        self.selection
            .is_some_and(|selection| selection.generation == generation)
    }

    /// Save the detail view's edits and close it.
    ///
    /// Without a selection this does nothing. A selection whose record has
    /// disappeared from storage is logged and left open.
    pub fn save_selection(&mut self, patch: RecordPatch) -> Option<Notice> {
        let selection = self.selection?;
        let mut records = self.store.load();
        match update_fields(&mut records, selection.id, patch) {
            Ok(()) => {}
            Err(MutationError::RecordNotFound { id }) => {
                tracing::warn!("selected record {id} no longer exists");
                self.records = records;
                return None;
            }
            Err(e @ MutationError::UnknownStatus { .. }) => {
                return Some(Notice::error(e.to_string()));
            }
        }
        if let Err(e) = self.store.save(&records) {
            tracing::error!("failed to persist edit of {}: {e}", selection.id);
            return Some(Notice::error(format!("Could not save change: {e}")));
        }
        self.records = records;
        self.close();
        Some(Notice::success("Application updated successfully"))
    }
}
