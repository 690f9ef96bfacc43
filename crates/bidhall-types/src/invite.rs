//! # Invite — the team-formation fan-out record
//!
//! One invite is dispatched per invited member when a team batch is
//! created. All invites in a batch share a [`TeamId`], an identical
//! per-member contribution, and a team size / total that are **fixed at
//! creation** — responses never recompute them.
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐  accept   ┌──────────┐
//!   │ PENDING ├──────────▶│ ACCEPTED │
//!   └────┬────┘           └──────────┘
//!        │ reject
//!        ▼
//!   ┌──────────┐
//!   │ REJECTED │
//!   └──────────┘
//! ```
//!
//! Resolution is final: an invite is mutated exactly once, by its
//! invitee. A rejected invite dooms the whole group; sibling pending
//! invites are left as-is and simply stop being actionable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BidhallError, Coins, InviteId, PermitId, TeamId, UserId};

/// The lifecycle state of an invite.
///
/// Transitions are **monotonic** (never go backwards):
/// - `Pending → Accepted` (invitee joins the team)
/// - `Pending → Rejected` (invitee declines; the group fails)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InviteStatus {
    /// Awaiting the invitee's response.
    Pending,
    /// The invitee joined. **Irreversible.**
    Accepted,
    /// The invitee declined. **Irreversible.** Blocks team-bid formation
    /// for the whole group.
    Rejected,
}

impl InviteStatus {
    /// Can this invite transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Accepted | Self::Rejected)
        )
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        *self != Self::Pending
    }
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// The invitee's answer to an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InviteResponse {
    Accept,
    Reject,
}

/// A single team invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: InviteId,
    /// The batch this invite belongs to.
    pub team_id: TeamId,
    pub permit_id: PermitId,
    pub inviter: UserId,
    pub invitee: UserId,
    /// Coins each member (leader included) commits. Identical across the
    /// batch.
    pub contribution: Coins,
    /// Invited count + 1 (the leader counts). Fixed at batch creation.
    pub team_size: u32,
    /// `contribution × team_size`. Fixed at batch creation.
    pub total_team_bid: Coins,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Attempt to resolve the invite with the invitee's response.
    ///
    /// # Errors
    /// Returns [`BidhallError::AlreadyResolved`] if the invite is not
    /// pending.
    pub fn resolve(&mut self, response: InviteResponse) -> crate::Result<()> {
        let target = match response {
            InviteResponse::Accept => InviteStatus::Accepted,
            InviteResponse::Reject => InviteStatus::Rejected,
        };
        if !self.status.can_transition_to(target) {
            return Err(BidhallError::AlreadyResolved(self.id));
        }
        self.status = target;
        Ok(())
    }
}

/// Dummy invites for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Invite {
    /// A fully-accepted batch of `invited` invites sharing one team,
    /// ready to materialize into a team bid.
    #[must_use]
    pub fn dummy_accepted_batch(invited: u32, contribution: Coins) -> Vec<Self> {
        let team_id = TeamId::new();
        let permit_id = PermitId::new();
        let inviter = UserId::new();
        let team_size = invited + 1;
        let created_at = Utc::now();
        (0..invited)
            .map(|_| Self {
                id: InviteId::new(),
                team_id,
                permit_id,
                inviter,
                invitee: UserId::new(),
                contribution,
                team_size,
                total_team_bid: contribution * Coins::from(team_size),
                status: InviteStatus::Accepted,
                created_at,
            })
            .collect()
    }
}
