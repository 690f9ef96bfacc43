//! Error types for the BidHall auction core.
//!
//! All errors use the `BH_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Bid validation errors
//! - 2xx: Ledger / balance errors
//! - 3xx: Lookup errors
//! - 4xx: Team formation errors
//! - 8xx: Safety / invariant errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Coins, InviteId, PermitId, TeamBidId, TeamId};

/// Central error enum for all BidHall operations.
#[derive(Debug, Error)]
pub enum BidhallError {
    // =================================================================
    // Bid Validation Errors (1xx)
    // =================================================================
    /// The bid amount is zero. Amounts are unsigned integers, so negative
    /// and fractional values are unrepresentable and rejected at the edge;
    /// zero is the one non-positive value this check guards.
    #[error("BH_ERR_100: Invalid bid amount: must be a positive number of coins")]
    InvalidAmount,

    /// The bid does not strictly exceed the permit's current highest bid.
    /// Equality loses: ties are never accepted.
    #[error("BH_ERR_101: Bid too low: offered {offered}, current highest {highest}")]
    BidTooLow { offered: Coins, highest: Coins },

    /// The caller's view of the permit was stale — another bid committed
    /// in between. Re-fetch the permit state and resubmit.
    #[error("BH_ERR_102: Stale bid on {permit}: leader changed since state was read")]
    StaleBid { permit: PermitId },

    // =================================================================
    // Ledger / Balance Errors (2xx)
    // =================================================================
    /// Not enough coins to cover the debit.
    #[error("BH_ERR_200: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Coins, available: Coins },

    /// A credit would overflow the balance counter.
    #[error("BH_ERR_201: Balance overflow crediting {amount} coins")]
    BalanceOverflow { amount: Coins },

    // =================================================================
    // Lookup Errors (3xx)
    // =================================================================
    /// The requested permit does not exist in the catalog.
    #[error("BH_ERR_300: Permit not found: {0}")]
    PermitNotFound(PermitId),

    /// A referenced user does not resolve (by id or by username).
    #[error("BH_ERR_301: User not found: {0}")]
    UserNotFound(String),

    /// The requested invite does not exist.
    #[error("BH_ERR_302: Invite not found: {0}")]
    InviteNotFound(InviteId),

    /// The requested team bid does not exist.
    #[error("BH_ERR_303: Team bid not found: {0}")]
    TeamBidNotFound(TeamBidId),

    // =================================================================
    // Team Formation Errors (4xx)
    // =================================================================
    /// The caller is not the invitee of the invite they responded to.
    #[error("BH_ERR_400: Not authorized to respond to invite {invite}")]
    Unauthorized { invite: InviteId },

    /// The invite was already accepted or rejected; resolution is final.
    #[error("BH_ERR_401: Invite already resolved: {0}")]
    AlreadyResolved(InviteId),

    /// At least one member rejected, so the team cannot form a bid.
    #[error("BH_ERR_402: Team formation failed for {team}: a member rejected")]
    TeamFormationFailed { team: TeamId },

    /// Structurally invalid team-formation input (empty invite list,
    /// zero contribution, oversized batch, self-invite).
    #[error("BH_ERR_403: Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// An invalid status transition was attempted on an invite or team bid.
    #[error("BH_ERR_404: Invalid status transition: {reason}")]
    InvalidTransition { reason: String },

    // =================================================================
    // Safety / Invariant Errors (8xx)
    // =================================================================
    /// Coin conservation invariant violated — critical safety alert.
    #[error("BH_ERR_800: Coin conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("BH_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("BH_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

impl BidhallError {
    /// Whether the caller may retry the same operation after re-fetching
    /// state. Only a lost commit race qualifies; every other error needs
    /// different input.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StaleBid { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BidhallError>;
