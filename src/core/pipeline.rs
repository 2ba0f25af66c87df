/// The reading pipeline: Catalog → Entitlement → Draw → Narrative → Store.
///
/// Every invocation is request-scoped. The generator holds only read-only
/// collaborators, so one instance can serve concurrent requests.

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::catalog::{Catalog, CatalogError};
use crate::core::draw::{self, DrawError};
use crate::core::entitlement::{self, EntitlementError};
use crate::core::narrative;
use crate::core::store::{self, ReadingStore, StoreError};
use crate::schema::content::{ContentSet, Tier};
use crate::schema::layout::LayoutId;
use crate::schema::reading::{CallerId, Reading};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("entitlement error: {0}")]
    Entitlement(#[from] EntitlementError),
    #[error("draw error: {0}")]
    Draw(#[from] DrawError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification for mapping failures to distinct responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoAvailableContent,
    LayoutNotFound,
    InsufficientContent,
    /// A catalog defect other than insufficient content, or an unreachable catalog.
    Configuration,
    Storage,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Entitlement(EntitlementError::NoAvailableContent) => ErrorKind::NoAvailableContent,
            Self::Entitlement(EntitlementError::LayoutNotFound) => ErrorKind::LayoutNotFound,
            Self::Draw(DrawError::InsufficientContent { .. }) => ErrorKind::InsufficientContent,
            Self::Draw(DrawError::SlotMismatch { .. }) | Self::Catalog(_) => {
                ErrorKind::Configuration
            }
            Self::Store(_) => ErrorKind::Storage,
        }
    }
}

/// One request for a reading.
#[derive(Debug, Clone)]
pub struct ReadingRequest {
    pub content_set: String,
    pub layout: LayoutId,
    pub tier: Tier,
    pub caller: CallerId,
}

impl ReadingRequest {
    pub fn new(
        content_set: impl Into<String>,
        layout: impl Into<String>,
        tier: Tier,
        caller: impl Into<String>,
    ) -> Self {
        Self {
            content_set: content_set.into(),
            layout: LayoutId::new(layout),
            tier,
            caller: CallerId::new(caller),
        }
    }
}

/// Produces readings from a catalog, persisting privileged ones.
pub struct ReadingGenerator<C, S> {
    catalog: C,
    store: S,
}

impl<C: Catalog, S: ReadingStore> ReadingGenerator<C, S> {
    pub fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generate a reading timestamped with the current time.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        request: &ReadingRequest,
        rng: &mut R,
    ) -> Result<Reading, PipelineError> {
        self.generate_at(request, Utc::now(), rng)
    }

    /// Generate a reading as if created at `now`.
    ///
    /// Nothing is written unless the whole reading was computed; only
    /// privileged requests reach the store.
    pub fn generate_at<R: Rng + ?Sized>(
        &self,
        request: &ReadingRequest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Reading, PipelineError> {
        // A missing set is indistinguishable from an empty one.
        let set = self
            .catalog
            .fetch(&request.content_set)?
            .unwrap_or_else(|| ContentSet {
                id: request.content_set.clone(),
                ..ContentSet::default()
            });

        let entitled = entitlement::filter(&set, request.tier)?;
        let layout = entitled.layout(&request.layout)?;
        let drawn = draw::draw(&entitled.items, layout, rng)?;
        let narrative = narrative::compose(&drawn, layout, request.tier);

        let mut reading = Reading {
            content_set: set.id.clone(),
            layout: layout.id.clone(),
            tier: request.tier,
            drawn,
            narrative,
            created_at: now,
            expires_at: None,
            storage_id: None,
        };

        if !request.tier.is_privileged() {
            debug!(
                set = %reading.content_set,
                layout = %reading.layout.as_str(),
                "computed ephemeral reading"
            );
            return Ok(reading);
        }

        reading.expires_at = Some(store::expiration_for(now));
        let receipt = self.store.save(&request.caller, &reading)?;
        reading.storage_id = Some(receipt.id);
        reading.expires_at = Some(receipt.expires_at);

        info!(
            set = %reading.content_set,
            layout = %reading.layout.as_str(),
            reading_id = %receipt.id,
            expires_at = %receipt.expires_at,
            "persisted reading"
        );
        Ok(reading)
    }
}
