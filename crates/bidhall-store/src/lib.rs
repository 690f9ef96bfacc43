//! # bidhall-store
//!
//! The book of record for permits: catalog, append-only bid history,
//! and the typed leader pointer per permit.
//!
//! The leader pointer is the single source of truth for "who gets the
//! refund when this permit is outbid." History is written for audit and
//! display, never scanned to re-derive the leader.
//!
//! Every leader transition re-checks the strictly-greater rule at
//! commit time and bumps the permit version, so a caller that validated
//! against a stale snapshot loses with `StaleBid` instead of silently
//! overwriting a newer leader.

pub mod catalog;
pub mod store;

pub use store::{BidStore, LeaderSnapshot};
