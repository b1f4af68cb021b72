//! Catalog deduplication: find-or-create the canonical entry for a draft so
//! many owned copies of the same product share one record.

use crate::catalog::CatalogDraft;
use crate::error::CatalogError;
use crate::store::{CatalogStore, FingerprintClaim};
use crate::types::CatalogId;
use std::sync::Arc;

pub struct CatalogDeduplicator {
    catalog: Arc<dyn CatalogStore>,
}

impl CatalogDeduplicator {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// Returns the id of an existing entry matching the draft's normalized
    /// (title, brand, piece count) triple, or inserts the draft as a new
    /// entry. Matching existing entries are returned unchanged; none of their
    /// fields are updated from the draft.
    pub fn resolve_or_create(&self, draft: CatalogDraft) -> Result<CatalogId, CatalogError> {
        draft.validate()?;

        // piece count is the selective index; a linear scan of that subset is
        // fine at marketplace catalog sizes
        for entry in self.catalog.with_piece_count(draft.piece_count())? {
            if draft.matches(&entry) {
                return Ok(entry.id);
            }
        }

        let fingerprint = draft.fingerprint();
        let entry = draft.into_entry();

        // the fingerprint claim is the uniqueness guard: two concurrent
        // callers describing the same new puzzle race here, and the loser
        // adopts the winner's entry instead of inserting a duplicate
        match self.catalog.claim_fingerprint(&fingerprint, &entry.id)? {
            FingerprintClaim::Held(existing) => Ok(existing),
            FingerprintClaim::Claimed => {
                self.catalog.insert_entry(&entry)?;
                Ok(entry.id)
            }
        }
    }
}
