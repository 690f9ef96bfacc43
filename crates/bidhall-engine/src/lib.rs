//! # bidhall-engine
//!
//! The settlement engine: the one place where a prospective bid turns
//! into committed state.
//!
//! ## Architecture
//!
//! The engine owns the ledger, the bid store, and the team-formation
//! books, and orchestrates them per settlement:
//! 1. **Validate** — permit exists, amount is positive, funds cover it,
//!    amount strictly clears the current highest
//! 2. **Stage** — outbid refunds and the new debit go into one ledger
//!    transaction; outcome events go into the outbox
//! 3. **Commit** — the leader pointer moves (with a commit-time stale
//!    check), then the ledger transaction applies
//! 4. **Publish** — the outbox drains to the injected publisher; a
//!    publish failure is logged and never unwinds the commit
//!
//! ## Settlement Flow
//!
//! ```text
//! caller → SettlementEngine.place_bid() / respond_to_invite()
//!        → Ledger (txn: refunds + debit)
//!        → BidStore (leader transition, stale guard)
//!        → Outbox → EventPublisher
//! ```
//!
//! An error anywhere before commit leaves every store untouched.

pub mod engine;
pub mod outbox;
pub mod publisher;

pub use engine::{BidReceipt, GroupStatus, InviteBatch, SettlementEngine};
pub use outbox::Outbox;
pub use publisher::{BroadcastPublisher, EventPublisher, NullPublisher, RecordingPublisher};
