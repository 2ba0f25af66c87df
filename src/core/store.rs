/// Reading persistence: the write interface for privileged readings and an
/// in-memory reading history.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::schema::reading::{CallerId, Reading, ReadingId};

/// Days a persisted reading stays retrievable.
pub const RETENTION_DAYS: i64 = 30;

pub fn retention_window() -> Duration {
    Duration::days(RETENTION_DAYS)
}

/// Expiration timestamp for a reading created at `created_at`.
pub fn expiration_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + retention_window()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reading has no expiration timestamp")]
    MissingExpiration,
    #[error("reading not found")]
    NotFound,
    #[error("store lock poisoned")]
    Poisoned,
}

/// What the store hands back after accepting a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreReceipt {
    pub id: ReadingId,
    pub expires_at: DateTime<Utc>,
}

/// Write interface used by the pipeline for privileged readings.
///
/// The expiration timestamp is computed by the caller and arrives on the
/// reading; stores pass it through unchanged.
pub trait ReadingStore: Send + Sync {
    fn save(&self, caller: &CallerId, reading: &Reading) -> Result<StoreReceipt, StoreError>;
}

impl<T: ReadingStore + ?Sized> ReadingStore for std::sync::Arc<T> {
    fn save(&self, caller: &CallerId, reading: &Reading) -> Result<StoreReceipt, StoreError> {
        (**self).save(caller, reading)
    }
}

/// A persisted reading with its owner and soft-delete flag.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReading {
    pub id: ReadingId,
    pub owner: CallerId,
    pub reading: Reading,
    pub deleted: bool,
}

impl StoredReading {
    fn is_visible(&self, now: DateTime<Utc>) -> bool {
        !self.deleted && !self.reading.is_expired(now)
    }
}

/// Reading history held in memory.
#[derive(Debug, Default)]
pub struct MemoryReadingStore {
    readings: RwLock<HashMap<ReadingId, StoredReading>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A visible (not deleted, not expired) reading by id.
    pub fn get(&self, id: ReadingId, now: DateTime<Utc>) -> Result<Option<StoredReading>, StoreError> {
        let readings = self.readings.read().map_err(|_| StoreError::Poisoned)?;
        Ok(readings
            .get(&id)
            .filter(|stored| stored.is_visible(now))
            .cloned())
    }

    /// Visible readings of one caller, newest first.
    pub fn history(&self, caller: &CallerId, now: DateTime<Utc>) -> Result<Vec<StoredReading>, StoreError> {
        let readings = self.readings.read().map_err(|_| StoreError::Poisoned)?;
        let mut owned: Vec<StoredReading> = readings
            .values()
            .filter(|stored| &stored.owner == caller && stored.is_visible(now))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.reading.created_at.cmp(&a.reading.created_at));
        Ok(owned)
    }

    /// Soft-delete a reading. Only its owner may delete it.
    pub fn delete(&self, caller: &CallerId, id: ReadingId) -> Result<(), StoreError> {
        let mut readings = self.readings.write().map_err(|_| StoreError::Poisoned)?;
        match readings.get_mut(&id) {
            Some(stored) if &stored.owner == caller && !stored.deleted => {
                stored.deleted = true;
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    /// Drop expired and soft-deleted readings. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut readings = self.readings.write().map_err(|_| StoreError::Poisoned)?;
        let before = readings.len();
        readings.retain(|_, stored| stored.is_visible(now));
        let removed = before - readings.len();
        debug!(removed, remaining = readings.len(), "purged readings");
        Ok(removed)
    }

    /// Number of stored readings, including deleted and expired ones.
    pub fn len(&self) -> usize {
        self.readings.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadingStore for MemoryReadingStore {
    fn save(&self, caller: &CallerId, reading: &Reading) -> Result<StoreReceipt, StoreError> {
        let expires_at = reading.expires_at.ok_or(StoreError::MissingExpiration)?;
        let id = ReadingId::new_v4();

        let mut stored = reading.clone();
        stored.storage_id = Some(id);

        let mut readings = self.readings.write().map_err(|_| StoreError::Poisoned)?;
        readings.insert(
            id,
            StoredReading {
                id,
                owner: caller.clone(),
                reading: stored,
                deleted: false,
            },
        );
        Ok(StoreReceipt { id, expires_at })
    }
}
