//! Key-value persistence and the whole-collection record store.
//!
//! Storage is a flat string key-value namespace, one value per key, written
//! whole. [`FileKvStore`] keeps each key in its own JSON file under the data
//! directory:
//!
//! ```text
//! ~/.local/share/engine-room/
//!   engineRoomApps.json   serialized Vec<ApplicationRecord>
//!   geminiApiKey.json     scoring credential (optional)
//!   geminiModel.json      scoring model (optional)
//! ```
//!
//! [`RecordStore`] never writes deltas: every mutation is load, modify, save
//! of the full collection.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde_json::Value;

use crate::record::ApplicationRecord;

/// Well-known key holding the serialized record collection.
pub const RECORDS_KEY: &str = "engineRoomApps";

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid storage key {key:?}")]
    InvalidKey { key: String },
}

/// Whole-value string storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-per-key store rooted at a directory.
#[derive(Debug)]
pub struct FileKvStore {
    base_dir: PathBuf,
}

impl FileKvStore {
    /// Open (and create if needed) a store at `base_dir`.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.base_dir.join(format!("{key}.json")))
    }

    /// Atomically write `data` to `path` via a `.tmp` sibling.
    fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        Self::atomic_write(&path, value.as_bytes())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Load/save of the full record collection.
#[derive(Clone)]
pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Store backed by a fresh [`MemoryKvStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    /// The underlying key-value store (shared with settings).
    pub fn kv(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.kv)
    }

    /// Read the persisted collection.
    ///
    /// Absent, unreadable or unparseable data is "no data": the result is an
    /// empty list and nothing is surfaced to the user.
    pub fn load(&self) -> Vec<ApplicationRecord> {
        match self.kv.get(RECORDS_KEY) {
            Ok(Some(raw)) => decode_records(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("record store unreadable, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted collection with `records`.
    ///
    /// Stored entries that never decoded are not part of `records`; they are
    /// written back unchanged at their original positions.
    pub fn save(&self, records: &[ApplicationRecord]) -> Result<(), StorageError> {
        let kept = match self.kv.get(RECORDS_KEY)? {
            Some(raw) => split_document(&raw).map_or_else(Vec::new, |doc| doc.undecodable),
            None => Vec::new(),
        };

        let mut entries = Vec::with_capacity(records.len() + kept.len());
        let mut kept = kept.into_iter().peekable();
        for record in records {
            while let Some(entry) = kept.next_if(|entry| entry.index <= entries.len()) {
                entries.push(entry.value);
            }
            entries.push(serde_json::to_value(record)?);
        }
        entries.extend(kept.map(|entry| entry.value));

        let json = serde_json::to_string(&entries)?;
        self.kv.set(RECORDS_KEY, &json)?;
        tracing::debug!(
            "saved {} records ({} undecodable kept)",
            records.len(),
            entries.len() - records.len()
        );
        Ok(())
    }

    /// Append one record (read-modify-write of the whole collection).
    pub fn append(&self, record: ApplicationRecord) -> Result<(), StorageError> {
        let mut records = self.load();
        records.push(record);
        self.save(&records)
    }
}

/// A stored entry that does not decode as a record.
struct Undecodable {
    index: usize,
    value: Value,
    error: serde_json::Error,
}

struct StoredDocument {
    records: Vec<ApplicationRecord>,
    undecodable: Vec<Undecodable>,
}

/// `None` when the document is not a JSON array.
fn split_document(raw: &str) -> Option<StoredDocument> {
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
        return None;
    };
    let mut document = StoredDocument {
        records: Vec::with_capacity(entries.len()),
        undecodable: Vec::new(),
    };
    for (index, value) in entries.into_iter().enumerate() {
        match serde_json::from_value::<ApplicationRecord>(value.clone()) {
            Ok(record) => document.records.push(record),
            Err(error) => document.undecodable.push(Undecodable {
                index,
                value,
                error,
            }),
        }
    }
    Some(document)
}

/// Decode a persisted collection, validating each entry on its own.
///
/// A document that is not a JSON array decodes to nothing. Entries that are
/// not objects, lack a usable integer `id` or have mistyped fields are left
/// out with a warning; [`RecordStore::save`] keeps them in storage.
pub fn decode_records(raw: &str) -> Vec<ApplicationRecord> {
    let Some(document) = split_document(raw) else {
        tracing::warn!("record store is not a JSON array, treating as empty");
        return Vec::new();
    };
    for entry in &document.undecodable {
        tracing::warn!("skipping stored record #{}: {}", entry.index, entry.error);
    }
    let records = document.records;
    let unplaced = records.iter().filter(|r| !r.status.is_column()).count();
    if unplaced > 0 {
        tracing::warn!("{unplaced} record(s) have a status outside the board and are not shown");
    }
    records
}
