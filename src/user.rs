//! Marketplace users. Referenced by the engine for existence and ownership
//! checks, never mutated here; profile management lives outside this crate.

use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct User {
    #[n(0)]
    pub id: UserId,
    #[n(1)]
    pub display_name: String,
}

impl User {
    pub fn new(display_name: &str) -> Self {
        Self {
            id: UserId::generate(),
            display_name: display_name.to_owned(),
        }
    }
}
