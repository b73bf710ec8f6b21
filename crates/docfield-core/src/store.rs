//! Persistence seam for processed document records.

use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use crate::error::StoreError;
use crate::models::record::DocumentRecord;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage of document records.
pub trait RecordStore: Send + Sync {
    /// Persist a record and return it with its assigned id.
    ///
    /// File names are unique; saving a second record with the same name fails.
    fn save(&self, record: DocumentRecord) -> Result<DocumentRecord>;

    /// All records, newest upload first.
    fn find_all(&self) -> Result<Vec<DocumentRecord>>;

    fn find_by_id(&self, id: u64) -> Result<Option<DocumentRecord>>;

    /// Records whose person name contains `query`, ignoring case.
    fn search_by_person_name(&self, query: &str) -> Result<Vec<DocumentRecord>>;
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<DocumentRecord>,
    next_id: u64,
}

/// In-process record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.read().map_err(poisoned)?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

fn newest_first(records: &mut [DocumentRecord]) {
    records.sort_by(|a, b| b.upload_date.cmp(&a.upload_date).then(b.id.cmp(&a.id)));
}

impl RecordStore for MemoryStore {
    fn save(&self, mut record: DocumentRecord) -> Result<DocumentRecord> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        if inner.records.iter().any(|r| r.file_name == record.file_name) {
            return Err(StoreError::DuplicateFileName(record.file_name));
        }

        inner.next_id += 1;
        record.id = inner.next_id;
        record.updated_date = Some(Utc::now());
        inner.records.push(record.clone());

        debug!("Saved record {} for '{}'", record.id, record.file_name);
        Ok(record)
    }

    fn find_all(&self) -> Result<Vec<DocumentRecord>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut records = inner.records.clone();
        newest_first(&mut records);
        Ok(records)
    }

    fn find_by_id(&self, id: u64) -> Result<Option<DocumentRecord>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.records.iter().find(|r| r.id == id).cloned())
    }

    fn search_by_person_name(&self, query: &str) -> Result<Vec<DocumentRecord>> {
        let query = query.to_lowercase();
        let inner = self.inner.read().map_err(poisoned)?;

        let mut records: Vec<DocumentRecord> = inner
            .records
            .iter()
            .filter(|r| {
                r.person_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&query))
            })
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }
}
