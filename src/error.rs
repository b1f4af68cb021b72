//! Error taxonomy for the exchange engine and catalog deduplication.

use crate::exchange::{ExchangeKind, ExchangeStatus};
use crate::types::{ExchangeId, InstanceId, UserId};

/// Rejections produced by proposal validation and exchange transitions.
///
/// Every variant is returned before any write happens, except `Store`, which
/// surfaces a backing-store failure.
#[derive(thiserror::Error, Debug)]
pub enum ExchangeError {
    #[error("initiator and recipient must be different users")]
    SelfExchange,
    #[error("unknown user: {0}")]
    UnknownUser(UserId),
    #[error("instance not found: {0}")]
    InstanceNotFound(InstanceId),
    #[error("exchange not found: {0}")]
    ExchangeNotFound(ExchangeId),
    #[error("instance {instance} is not owned by {expected_owner}")]
    Ownership {
        instance: InstanceId,
        expected_owner: UserId,
    },
    #[error("instance {instance} is not available for {kind}")]
    Availability {
        instance: InstanceId,
        kind: ExchangeKind,
    },
    #[error("offered instance does not fit a {kind} exchange")]
    TypeMismatch { kind: ExchangeKind },
    #[error("an open proposal for this instance by this user already exists")]
    DuplicateProposal,
    #[error("cannot {action} an exchange in state {from}")]
    InvalidStateTransition {
        from: ExchangeStatus,
        action: &'static str,
    },
    #[error("user {actor} may not perform this transition")]
    NotAuthorized { actor: UserId },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rejections produced while resolving a catalog draft.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("catalog draft title is empty")]
    EmptyTitle,
    #[error("catalog draft piece count is zero")]
    ZeroPieceCount,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the backing store or its record codec.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),
    #[error("record not found: {0}")]
    Missing(String),
    #[error("failed to encode record: {0}")]
    Encode(String),
    #[error("failed to decode record: {0}")]
    Decode(String),
}

impl<E: std::fmt::Display> From<minicbor::encode::Error<E>> for StoreError {
    fn from(err: minicbor::encode::Error<E>) -> Self {
        StoreError::Encode(err.to_string())
    }
}

impl From<minicbor::decode::Error> for StoreError {
    fn from(err: minicbor::decode::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}
