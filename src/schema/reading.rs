use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::{ContentItem, Orientation, Tier};
use super::layout::{LayoutId, Slot};

/// Opaque identifier of the caller a reading belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Storage identifier assigned when a reading is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingId(pub Uuid);

impl ReadingId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ReadingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An item bound to one layout slot with a resolved orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnItem {
    pub item: ContentItem,
    pub slot: Slot,
    pub orientation: Orientation,
}

impl DrawnItem {
    pub fn meaning(&self) -> &str {
        self.item.meaning(self.orientation)
    }
}

/// Lifecycle of a reading. Only privileged readings become `Persisted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingState {
    Computed,
    Persisted,
}

/// The complete output of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub content_set: String,
    pub layout: LayoutId,
    pub tier: Tier,
    pub drawn: Vec<DrawnItem>,
    pub narrative: String,
    pub created_at: DateTime<Utc>,
    /// Present only for privileged readings.
    pub expires_at: Option<DateTime<Utc>>,
    /// Set once the storage collaborator accepted the reading.
    pub storage_id: Option<ReadingId>,
}

impl Reading {
    pub fn state(&self) -> ReadingState {
        if self.storage_id.is_some() {
            ReadingState::Persisted
        } else {
            ReadingState::Computed
        }
    }

    /// True once `now` has reached the expiration timestamp.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }
}
