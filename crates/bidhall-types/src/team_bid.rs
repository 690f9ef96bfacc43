//! # TeamBid — the materialized aggregate of an accepted invite group
//!
//! A `TeamBid` record is created when every invite in a team group has
//! resolved. It reaches `COMPLETE` iff every member accepted **and** the
//! whole-team debit committed; one rejection anywhere forces `FAILED`
//! with no funds moving.
//!
//! ## Aggregate State Machine
//!
//! ```text
//!   ┌─────────┐  all accepted + debited   ┌──────────┐  outbid   ┌──────────┐
//!   │ PENDING ├──────────────────────────▶│ COMPLETE ├──────────▶│ REFUNDED │
//!   └────┬────┘                           └──────────┘           └──────────┘
//!        │ any rejection / failed debit
//!        ▼
//!   ┌────────┐
//!   │ FAILED │
//!   └────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BidhallError, Coins, PermitId, TeamBidId, TeamId, UserId};

/// Per-member status within a team bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberStatus {
    Pending,
    Accepted,
    Rejected,
    /// The member's contribution was debited as part of a complete team bid.
    Complete,
    /// The member's contribution was credited back after the team was outbid.
    Refunded,
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// Aggregate status of the team bid.
///
/// Transitions are **monotonic** (never go backwards):
/// - `Pending → Complete` (all accepted, whole-team debit committed)
/// - `Pending → Failed` (a rejection, or an insufficient-funds abort)
/// - `Complete → Refunded` (the team was outbid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamBidStatus {
    Pending,
    Complete,
    Failed,
    Refunded,
}

impl TeamBidStatus {
    /// Can this team bid transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Complete | Self::Failed) | (Self::Complete, Self::Refunded)
        )
    }
}

impl std::fmt::Display for TeamBidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::Failed => write!(f, "FAILED"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// One member of a team bid (the leader is a member too).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub user: UserId,
    pub contribution: Coins,
    pub status: MemberStatus,
}

/// The aggregate team bid for one permit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamBid {
    pub id: TeamBidId,
    /// The invite batch this bid grew out of.
    pub team_id: TeamId,
    pub permit_id: PermitId,
    pub leader: UserId,
    /// Ordered: leader first, then invitees in batch order.
    pub members: Vec<TeamMember>,
    /// Sum of all member contributions.
    pub total_amount: Coins,
    pub status: TeamBidStatus,
    pub created_at: DateTime<Utc>,
}

impl TeamBid {
    /// Sum of member contributions. Must equal `total_amount`.
    #[must_use]
    pub fn member_total(&self) -> Coins {
        self.members.iter().map(|m| m.contribution).sum()
    }

    #[must_use]
    pub fn member_ids(&self) -> Vec<UserId> {
        self.members.iter().map(|m| m.user).collect()
    }

    fn transition(&mut self, target: TeamBidStatus) -> crate::Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(BidhallError::InvalidTransition {
                reason: format!("team bid {} cannot go {} -> {target}", self.id, self.status),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Mark the bid complete; every member moves to `Complete`.
    ///
    /// # Errors
    /// Returns `InvalidTransition` unless the bid is pending.
    pub fn mark_complete(&mut self) -> crate::Result<()> {
        self.transition(TeamBidStatus::Complete)?;
        for member in &mut self.members {
            member.status = MemberStatus::Complete;
        }
        Ok(())
    }

    /// Mark the bid failed. Member statuses keep whatever they held when
    /// the group collapsed.
    ///
    /// # Errors
    /// Returns `InvalidTransition` unless the bid is pending.
    pub fn mark_failed(&mut self) -> crate::Result<()> {
        self.transition(TeamBidStatus::Failed)
    }

    /// Mark the bid refunded; every member moves to `Refunded`.
    ///
    /// # Errors
    /// Returns `InvalidTransition` unless the bid is complete.
    pub fn mark_refunded(&mut self) -> crate::Result<()> {
        self.transition(TeamBidStatus::Refunded)?;
        for member in &mut self.members {
            member.status = MemberStatus::Refunded;
        }
        Ok(())
    }
}
