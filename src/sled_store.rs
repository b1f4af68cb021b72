//! Sled-backed implementation of the repository contracts.
//!
//! Everything lives in the default tree under prefixed key spaces, one prefix
//! per record family, with records encoded as CBOR:
//!
//! - `user/<id>`, `inst/<id>`, `cat/<id>`, `exch/<id>`, `ntf/<id>` — records
//! - `catpc/<piece count BE><id>` — piece-count index over catalog entries
//! - `catfp/<fingerprint>` — normalized-triple uniqueness key, claimed with
//!   compare-and-swap so concurrent identical drafts collapse to one entry
//! - `open/<initiator>\0<instance>` — open-proposal key, claimed with
//!   compare-and-swap so concurrent duplicate proposals cannot both land

use crate::catalog::CatalogEntry;
use crate::error::StoreError;
use crate::exchange::{Exchange, ExchangeStatus};
use crate::instance::{Availability, OwnedInstance};
use crate::notification::Notification;
use crate::store::{
    CatalogStore, ExchangeStore, FingerprintClaim, InstanceStore, NotificationSink, ProposalSlot,
    UserDirectory,
};
use crate::types::{CatalogId, ExchangeId, InstanceId, UserId};
use crate::user::User;
use sled::Batch;
use std::sync::Arc;

const USER_PREFIX: &str = "user/";
const INSTANCE_PREFIX: &str = "inst/";
const CATALOG_PREFIX: &str = "cat/";
const CATALOG_PC_PREFIX: &str = "catpc/";
const CATALOG_FP_PREFIX: &str = "catfp/";
const EXCHANGE_PREFIX: &str = "exch/";
const OPEN_PREFIX: &str = "open/";
const NOTIFICATION_PREFIX: &str = "ntf/";

pub struct SledStore {
    db: Arc<sled::Db>,
}

fn record_key(prefix: &str, id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + id.len());
    key.extend_from_slice(prefix.as_bytes());
    key.extend_from_slice(id.as_bytes());
    key
}

fn piece_count_prefix(piece_count: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(CATALOG_PC_PREFIX.len() + 4);
    key.extend_from_slice(CATALOG_PC_PREFIX.as_bytes());
    key.extend_from_slice(&piece_count.to_be_bytes());
    key
}

fn piece_count_key(piece_count: u32, id: &CatalogId) -> Vec<u8> {
    let mut key = piece_count_prefix(piece_count);
    key.extend_from_slice(id.as_str().as_bytes());
    key
}

// ids are bech32 text, so a NUL byte cannot collide with either half
fn open_key(initiator: &UserId, instance: &InstanceId) -> Vec<u8> {
    let mut key = record_key(OPEN_PREFIX, initiator.as_str());
    key.push(0);
    key.extend_from_slice(instance.as_str().as_bytes());
    key
}

fn encode<T: minicbor::Encode<()>>(value: &T) -> Result<Vec<u8>, StoreError> {
    Ok(minicbor::to_vec(value)?)
}

fn decode<T: for<'b> minicbor::Decode<'b, ()>>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(minicbor::decode(bytes)?)
}

fn id_from_bytes(bytes: &[u8]) -> Result<String, StoreError> {
    String::from_utf8(bytes.to_vec()).map_err(|err| StoreError::Decode(err.to_string()))
}

impl SledStore {
    pub fn new(db: Arc<sled::Db>) -> Self {
        Self { db }
    }

    fn fetch<T: for<'b> minicbor::Decode<'b, ()>>(
        &self,
        prefix: &str,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.db.get(record_key(prefix, id))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // Collaborator-side writes. User and instance management is outside the
    // engine's scope, but the shared store still has to hold the records the
    // engine reads, so hosts and tests seed them through here.

    pub fn put_user(&self, user: &User) -> Result<(), StoreError> {
        self.db
            .insert(record_key(USER_PREFIX, user.id.as_str()), encode(user)?)?;
        Ok(())
    }

    pub fn put_instance(&self, instance: &OwnedInstance) -> Result<(), StoreError> {
        self.db.insert(
            record_key(INSTANCE_PREFIX, instance.id.as_str()),
            encode(instance)?,
        )?;
        Ok(())
    }

    /// Notification rows addressed to one user, in key order.
    pub fn notifications_for(&self, user: &UserId) -> Result<Vec<Notification>, StoreError> {
        let mut rows = Vec::new();
        for item in self.db.scan_prefix(NOTIFICATION_PREFIX.as_bytes()) {
            let (_, bytes) = item?;
            let notification: Notification = decode(&bytes)?;
            if notification.user == *user {
                rows.push(notification);
            }
        }
        Ok(rows)
    }
}

impl UserDirectory for SledStore {
    fn exists(&self, id: &UserId) -> Result<bool, StoreError> {
        Ok(self.db.contains_key(record_key(USER_PREFIX, id.as_str()))?)
    }
}

impl InstanceStore for SledStore {
    fn get_instance(&self, id: &InstanceId) -> Result<Option<OwnedInstance>, StoreError> {
        self.fetch(INSTANCE_PREFIX, id.as_str())
    }

    fn freeze(&self, id: &InstanceId) -> Result<(), StoreError> {
        let mut instance = self
            .get_instance(id)?
            .ok_or_else(|| StoreError::Missing(id.as_str().to_owned()))?;

        instance.availability = Availability::frozen();
        self.db.insert(
            record_key(INSTANCE_PREFIX, id.as_str()),
            encode(&instance)?,
        )?;
        Ok(())
    }
}

impl CatalogStore for SledStore {
    fn get_entry(&self, id: &CatalogId) -> Result<Option<CatalogEntry>, StoreError> {
        self.fetch(CATALOG_PREFIX, id.as_str())
    }

    fn with_piece_count(&self, piece_count: u32) -> Result<Vec<CatalogEntry>, StoreError> {
        let mut entries = Vec::new();
        for item in self.db.scan_prefix(piece_count_prefix(piece_count)) {
            let (_, bytes) = item?;
            let id = CatalogId::from(id_from_bytes(&bytes)?);
            if let Some(entry) = self.get_entry(&id)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn claim_fingerprint(
        &self,
        fingerprint: &str,
        id: &CatalogId,
    ) -> Result<FingerprintClaim, StoreError> {
        let outcome = self.db.compare_and_swap(
            record_key(CATALOG_FP_PREFIX, fingerprint),
            None as Option<&[u8]>,
            Some(id.as_str().as_bytes()),
        )?;

        match outcome {
            Ok(()) => Ok(FingerprintClaim::Claimed),
            Err(swap) => {
                let holder = swap
                    .current
                    .ok_or_else(|| StoreError::Missing(fingerprint.to_owned()))?;
                Ok(FingerprintClaim::Held(CatalogId::from(id_from_bytes(
                    &holder,
                )?)))
            }
        }
    }

    fn insert_entry(&self, entry: &CatalogEntry) -> Result<(), StoreError> {
        let mut batch = Batch::default();
        batch.insert(record_key(CATALOG_PREFIX, entry.id.as_str()), encode(entry)?);
        batch.insert(
            piece_count_key(entry.piece_count, &entry.id),
            entry.id.as_str().as_bytes(),
        );
        self.db.apply_batch(batch)?;
        Ok(())
    }
}

impl ExchangeStore for SledStore {
    fn get_exchange(&self, id: &ExchangeId) -> Result<Option<Exchange>, StoreError> {
        self.fetch(EXCHANGE_PREFIX, id.as_str())
    }

    fn insert_proposed(&self, exchange: &Exchange) -> Result<ProposalSlot, StoreError> {
        let open = open_key(&exchange.initiator, &exchange.requested_instance);
        let outcome = self.db.compare_and_swap(
            open.as_slice(),
            None as Option<&[u8]>,
            Some(exchange.id.as_str().as_bytes()),
        )?;

        if outcome.is_err() {
            return Ok(ProposalSlot::AlreadyOpen);
        }

        let record = encode(exchange)?;
        if let Err(err) = self
            .db
            .insert(record_key(EXCHANGE_PREFIX, exchange.id.as_str()), record)
        {
            // release the claim so the caller can retry
            let _ = self.db.remove(open);
            return Err(err.into());
        }
        Ok(ProposalSlot::Created)
    }

    fn update(&self, exchange: &Exchange) -> Result<(), StoreError> {
        let mut batch = Batch::default();
        batch.insert(
            record_key(EXCHANGE_PREFIX, exchange.id.as_str()),
            encode(exchange)?,
        );
        if exchange.status != ExchangeStatus::Proposed {
            batch.remove(open_key(&exchange.initiator, &exchange.requested_instance));
        }
        self.db.apply_batch(batch)?;
        Ok(())
    }

    fn find_open_proposal(
        &self,
        initiator: &UserId,
        requested_instance: &InstanceId,
    ) -> Result<Option<ExchangeId>, StoreError> {
        match self.db.get(open_key(initiator, requested_instance))? {
            Some(bytes) => Ok(Some(ExchangeId::from(id_from_bytes(&bytes)?))),
            None => Ok(None),
        }
    }
}

impl NotificationSink for SledStore {
    fn append(&self, notification: &Notification) -> Result<(), StoreError> {
        self.db.insert(
            record_key(NOTIFICATION_PREFIX, notification.id.as_str()),
            encode(notification)?,
        )?;
        Ok(())
    }
}
