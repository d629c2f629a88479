//! Intake of new applications.
//!
//! A submission arrives already collected (terminal form or CLI flags) and
//! becomes a record in the `New` column with empty notes, a fresh id and
//! today's date.

use chrono::DateTime;
use chrono::Local;

use crate::record::ApplicationRecord;
use crate::record::RecordId;
use crate::record::Stage;
use crate::record::Status;
use crate::storage::RecordStore;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Form input for one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewApplication {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub stage: String,
    pub description: String,
    pub customers: Option<String>,
    pub revenue_model: Option<String>,
    pub competitors: Option<String>,
    pub funding: Option<String>,
}

fn required(field: &'static str, value: &str) -> Result<String, SubmissionError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SubmissionError::MissingField { field });
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl NewApplication {
    /// Check required fields without consuming the input.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        required("name", &self.name)?;
        required("email", &self.email)?;
        required("stage", &self.stage)?;
        required("description", &self.description)?;
        Ok(())
    }

    /// Build the stored record.
    pub fn into_record(
        self,
        id: RecordId,
        date: String,
    ) -> Result<ApplicationRecord, SubmissionError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        let stage = Stage::from(required("stage", &self.stage)?);
        let description = required("description", &self.description)?;

        let mut record = ApplicationRecord::new(id, name, stage, Status::New);
        record.email = Some(email);
        record.description = description;
        record.date = date;
        record.phone = optional(self.phone);
        record.business_name = optional(self.business_name);
        record.customers = optional(self.customers);
        record.revenue_model = optional(self.revenue_model);
        record.competitors = optional(self.competitors);
        record.funding = optional(self.funding);
        Ok(record)
    }
}

/// Epoch-millis id, bumped past every existing id so ids stay unique and
/// increasing even when two submissions land in the same millisecond.
pub fn next_id(existing: &[ApplicationRecord], now_ms: i64) -> RecordId {
    let max = existing.iter().map(|r| r.id.get()).max();
    match max {
        Some(max) if now_ms <= max => RecordId(max.saturating_add(1)),
        _ => RecordId(now_ms),
    }
}

/// Display date in the `M/D/YYYY` form.
pub fn display_date(now: &DateTime<Local>) -> String {
    now.format("%-m/%-d/%Y").to_string()
}

/// Validate, stamp and append a submission.
pub fn submit(
    store: &RecordStore,
    application: NewApplication,
) -> Result<ApplicationRecord, SubmissionError> {
    submit_at(store, application, Local::now())
}

pub fn submit_at(
    store: &RecordStore,
    application: NewApplication,
    now: DateTime<Local>,
) -> Result<ApplicationRecord, SubmissionError> {
    application.validate()?;
    let mut records = store.load();
    let id = next_id(&records, now.timestamp_millis());
    let record = application.into_record(id, display_date(&now))?;
    records.push(record.clone());
    store.save(&records)?;
    tracing::info!("received application {id} from {}", record.name);
    Ok(record)
}
