//! Repository contracts the engine is constructed over.
//!
//! The engine never touches a global store handle; it reads and writes only
//! through these traits, injected at construction. The crate ships one
//! sled-backed implementation of all of them (`sled_store::SledStore`), but
//! tests or hosts can substitute their own.

use crate::catalog::CatalogEntry;
use crate::error::StoreError;
use crate::exchange::Exchange;
use crate::instance::OwnedInstance;
use crate::notification::Notification;
use crate::types::{CatalogId, ExchangeId, InstanceId, UserId};

/// Read-only view of the user directory: existence checks only.
pub trait UserDirectory: Send + Sync {
    fn exists(&self, id: &UserId) -> Result<bool, StoreError>;
}

/// Read ownership/availability of owned instances; the single write this
/// engine performs on them is the one-way availability freeze.
pub trait InstanceStore: Send + Sync {
    fn get_instance(&self, id: &InstanceId) -> Result<Option<OwnedInstance>, StoreError>;

    /// Clears all three availability flags. Idempotent.
    fn freeze(&self, id: &InstanceId) -> Result<(), StoreError>;
}

/// Outcome of claiming a catalog fingerprint key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FingerprintClaim {
    /// The key was free and now belongs to the given entry.
    Claimed,
    /// A concurrent writer got there first; adopt its entry.
    Held(CatalogId),
}

pub trait CatalogStore: Send + Sync {
    fn get_entry(&self, id: &CatalogId) -> Result<Option<CatalogEntry>, StoreError>;

    /// All entries sharing a piece count, the selective index for matching.
    fn with_piece_count(&self, piece_count: u32) -> Result<Vec<CatalogEntry>, StoreError>;

    /// Atomically claim the normalized-triple fingerprint for a new entry.
    /// Losing the race returns the holder instead of writing.
    fn claim_fingerprint(
        &self,
        fingerprint: &str,
        id: &CatalogId,
    ) -> Result<FingerprintClaim, StoreError>;

    fn insert_entry(&self, entry: &CatalogEntry) -> Result<(), StoreError>;
}

/// Outcome of inserting a new proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalSlot {
    Created,
    /// Another proposal by the same initiator for the same instance is still
    /// open; nothing was written.
    AlreadyOpen,
}

pub trait ExchangeStore: Send + Sync {
    fn get_exchange(&self, id: &ExchangeId) -> Result<Option<Exchange>, StoreError>;

    /// Persist a new exchange in `Proposed` status, atomically claiming the
    /// `(initiator, requested instance)` open-proposal key.
    fn insert_proposed(&self, exchange: &Exchange) -> Result<ProposalSlot, StoreError>;

    /// Persist an updated exchange; releases the open-proposal key once the
    /// status has left `Proposed`.
    fn update(&self, exchange: &Exchange) -> Result<(), StoreError>;

    fn find_open_proposal(
        &self,
        initiator: &UserId,
        requested_instance: &InstanceId,
    ) -> Result<Option<ExchangeId>, StoreError>;
}

/// Append-only notification sink.
pub trait NotificationSink: Send + Sync {
    fn append(&self, notification: &Notification) -> Result<(), StoreError>;
}
