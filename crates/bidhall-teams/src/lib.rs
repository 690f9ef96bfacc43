//! # bidhall-teams
//!
//! Team formation for the BidHall auction.
//!
//! A team comes into being as a batch of invites sharing one
//! [`bidhall_types::TeamId`]. The [`InviteBook`] owns the invite
//! lifecycle and recomputes the group's resolution on every response:
//! one rejection fails the whole group; only a full set of acceptances
//! lets a [`bidhall_types::TeamBid`] materialize in the [`TeamBidBook`].
//!
//! No coins move in this crate. The settlement engine reads the group
//! outcome, runs the whole-team debit in one ledger transaction, and
//! only then asks the book to mark the bid complete.

pub mod invites;
pub mod team_bids;

pub use invites::{GroupOutcome, InviteBook};
pub use team_bids::TeamBidBook;
