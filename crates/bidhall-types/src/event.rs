//! Settlement outcome events.
//!
//! The engine stages events inside the settlement transaction and hands
//! them to the publisher only after commit (outbox pattern). Every
//! balance carried in an event is the **post-commit** balance, so
//! subscribers never observe a state the store didn't reach.

use serde::{Deserialize, Serialize};

use crate::{Coins, InviteId, PermitId, TeamBidId, TeamId, UserId};

/// Where an event is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Broadcast to every connected subscriber.
    Global,
    /// Addressed to one user's private channel.
    User(UserId),
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::User(user) => write!(f, "user:{user}"),
        }
    }
}

/// A settlement outcome, serialized as tagged JSON for the pub/sub channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuctionEvent {
    /// A new bid leads a permit. Broadcast globally.
    #[serde(rename = "bidPlaced")]
    BidPlaced {
        permit_id: PermitId,
        bidder: UserId,
        amount: Coins,
        /// The bidder's balance after the debit.
        new_balance: Coins,
    },
    /// The previous individual leader was outbid and refunded. Addressed.
    #[serde(rename = "outbid")]
    Outbid {
        permit_id: PermitId,
        refund: Coins,
        /// The refunded user's balance after the credit.
        new_balance: Coins,
        /// The amount that beat them.
        outbid_by: Coins,
    },
    /// A team invite was dispatched. Addressed to the invitee.
    #[serde(rename = "newInvite")]
    NewInvite {
        invite_id: InviteId,
        team_id: TeamId,
        permit_id: PermitId,
        inviter: UserId,
        contribution: Coins,
        total_team_bid: Coins,
    },
    /// All members accepted and the team bid now leads. Addressed to each
    /// member.
    #[serde(rename = "teamBidComplete")]
    TeamBidComplete {
        permit_id: PermitId,
        team_id: TeamId,
        team_bid_id: TeamBidId,
        total_amount: Coins,
    },
    /// An outbid team member got their contribution back. Addressed.
    #[serde(rename = "teamBidRefunded")]
    TeamBidRefunded {
        permit_id: PermitId,
        team_bid_id: TeamBidId,
        refund: Coins,
        /// The member's balance after the credit.
        new_balance: Coins,
    },
    /// A member rejected; the group can never form a bid. Addressed to
    /// each member.
    #[serde(rename = "teamFormationFailed")]
    TeamFormationFailed {
        permit_id: PermitId,
        team_id: TeamId,
        rejected_by: UserId,
    },
}

impl AuctionEvent {
    /// Stable name for logging and topic routing.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BidPlaced { .. } => "bidPlaced",
            Self::Outbid { .. } => "outbid",
            Self::NewInvite { .. } => "newInvite",
            Self::TeamBidComplete { .. } => "teamBidComplete",
            Self::TeamBidRefunded { .. } => "teamBidRefunded",
            Self::TeamFormationFailed { .. } => "teamFormationFailed",
        }
    }
}
