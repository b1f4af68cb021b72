//! Owned puzzle instances: one user's physical copy of a catalog entry.

use crate::exchange::ExchangeKind;
use crate::types::{CatalogId, InstanceId, TimeStamp, UserId};
use chrono::Utc;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    #[n(0)]
    New,
    #[n(1)]
    LikeNew,
    #[n(2)]
    Good,
    #[n(3)]
    Worn,
    #[n(4)]
    Damaged,
}

/// Per-instance eligibility flags. Cleared all at once when an exchange over
/// the instance completes; this engine never sets a flag back to true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Availability {
    #[n(0)]
    pub for_trade: bool,
    #[n(1)]
    pub for_sale: bool,
    #[n(2)]
    pub for_lend: bool,
}

impl Availability {
    pub fn new(for_trade: bool, for_sale: bool, for_lend: bool) -> Self {
        Self {
            for_trade,
            for_sale,
            for_lend,
        }
    }

    /// The post-freeze state: not eligible for anything.
    pub fn frozen() -> Self {
        Self::new(false, false, false)
    }

    pub fn permits(&self, kind: ExchangeKind) -> bool {
        match kind {
            ExchangeKind::Trade => self.for_trade,
            ExchangeKind::Sale => self.for_sale,
            ExchangeKind::Loan => self.for_lend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct OwnedInstance {
    #[n(0)]
    pub id: InstanceId,
    #[n(1)]
    pub owner: UserId,
    #[n(2)]
    pub catalog: CatalogId,
    #[n(3)]
    pub condition: Condition,
    #[n(4)]
    pub availability: Availability,
    #[n(5)]
    pub added_at: TimeStamp<Utc>,
}

impl OwnedInstance {
    pub fn new(
        owner: UserId,
        catalog: CatalogId,
        condition: Condition,
        availability: Availability,
    ) -> Self {
        Self {
            id: InstanceId::generate(),
            owner,
            catalog,
            condition,
            availability,
            added_at: TimeStamp::new(),
        }
    }
}
