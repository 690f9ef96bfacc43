//! # bidhall-types
//!
//! Shared types, errors, and configuration for the **BidHall** permit
//! auction core.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`PermitId`], [`UserId`], [`BidId`], [`InviteId`], [`TeamId`], [`TeamBidId`]
//! - **User model**: [`User`], [`Coins`]
//! - **Permit model**: [`Permit`], [`Leader`]
//! - **Bid model**: [`Bid`]
//! - **Invite model**: [`Invite`], [`InviteStatus`]
//! - **TeamBid model**: [`TeamBid`], [`TeamMember`], [`MemberStatus`], [`TeamBidStatus`]
//! - **Events**: [`AuctionEvent`], [`Topic`]
//! - **Configuration**: [`AuctionConfig`], [`PermitSeed`]
//! - **Errors**: [`BidhallError`] with `BH_ERR_` prefix codes

pub mod bid;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod invite;
pub mod permit;
pub mod team_bid;
pub mod user;

// Re-export all primary types at crate root for ergonomic imports:
//   use bidhall_types::{Permit, Leader, Bid, Invite, TeamBid, ...};

pub use bid::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use invite::*;
pub use permit::*;
pub use team_bid::*;
pub use user::*;

// Constants are accessed via `bidhall_types::constants::FOO`
// (not re-exported to avoid name collisions).
