//! In-place edits to a single record, addressed by id.
//!
//! These functions only touch the slice they are given. Persisting and
//! re-projecting is the caller's job (see [`super::Board`]).

use crate::record::ApplicationRecord;
use crate::record::RecordId;
use crate::record::Status;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("record not found: {id}")]
    RecordNotFound { id: RecordId },

    #[error("status {status:?} is not a board column")]
    UnknownStatus { status: String },
}

/// Fields a reviewer may change after submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub notes: Option<String>,
    pub status: Option<Status>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.status.is_none()
    }
}

/// Move record `id` to `status`.
///
/// Returns `true` only when the record exists and its status actually
/// changed. Unknown ids, non-column targets and same-column drops are no-ops,
/// which makes repeated calls idempotent.
pub fn move_record(records: &mut [ApplicationRecord], id: RecordId, status: &Status) -> bool {
    if !status.is_column() {
        tracing::warn!("ignoring move of {id} to non-column status {status:?}");
        return false;
    }
    let Some(record) = records.iter_mut().find(|r| r.id == id) else {
        tracing::debug!("ignoring move of unknown record {id}");
        return false;
    };
    if &record.status == status {
        return false;
    }
    tracing::info!("moving record {id}: {} -> {status}", record.status);
    record.status = status.clone();
    true
}

/// Apply `patch` to record `id`.
pub fn update_fields(
    records: &mut [ApplicationRecord],
    id: RecordId,
    patch: RecordPatch,
) -> Result<(), MutationError> {
    if let Some(status) = &patch.status
        && !status.is_column()
    {
        return Err(MutationError::UnknownStatus {
            status: status.as_str().to_string(),
        });
    }
    let record = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or(MutationError::RecordNotFound { id })?;

    if let Some(notes) = patch.notes {
        record.notes = notes;
    }
    if let Some(status) = patch.status {
        record.status = status;
    }
    tracing::info!("updated record {id}");
    Ok(())
}
