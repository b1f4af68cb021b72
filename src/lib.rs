//! Exchange coordination engine for a peer-to-peer jigsaw puzzle marketplace.
//!
//! Users list puzzles they own and negotiate trades, sales, and loans over
//! them. This crate holds the two pieces with real coordination logic: the
//! exchange state machine (`service`, `exchange`, `validate`) that drives a
//! negotiation from proposal to a terminal state while guarding ownership,
//! availability, and authorization rules, and the catalog deduplicator
//! (`dedup`, `catalog`) that collapses many owned copies of one product onto
//! a single canonical record. Identity management, uploads, search, and all
//! rendering live outside; the engine reaches them only through the
//! repository traits in `store`.

pub mod catalog;
pub mod dedup;
pub mod error;
pub mod exchange;
pub mod instance;
pub mod notification;
pub mod service;
pub mod sled_store;
pub mod store;
pub mod types;
pub mod user;
pub mod utils;
pub mod validate;
