//! The team-bid book: materialization and status transitions.

use std::collections::HashMap;

use chrono::Utc;
use bidhall_types::{
    BidhallError, Invite, MemberStatus, PermitId, Result, TeamBid, TeamBidId, TeamBidStatus,
    TeamId, TeamMember,
};

/// Owns every materialized team bid.
pub struct TeamBidBook {
    bids: HashMap<TeamBidId, TeamBid>,
    by_permit: HashMap<PermitId, Vec<TeamBidId>>,
}

impl TeamBidBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bids: HashMap::new(),
            by_permit: HashMap::new(),
        }
    }

    /// Materialize a pending team bid from a fully accepted invite
    /// batch. The leader becomes the first member; invitees follow in
    /// batch order. No coins move here.
    ///
    /// # Errors
    /// `InvalidInput` if the batch is empty or its fixed totals are
    /// inconsistent.
    pub fn materialize(&mut self, invites: &[Invite]) -> Result<TeamBidId> {
        let first = invites.first().ok_or(BidhallError::InvalidInput {
            reason: "cannot materialize a team bid from zero invites".to_string(),
        })?;
        let contribution = first.contribution;
        let expected_total = first.total_team_bid;

        let mut members = Vec::with_capacity(invites.len() + 1);
        members.push(TeamMember {
            user: first.inviter,
            contribution,
            status: MemberStatus::Accepted,
        });
        for invite in invites {
            members.push(TeamMember {
                user: invite.invitee,
                contribution: invite.contribution,
                status: MemberStatus::Accepted,
            });
        }

        let total_amount: u64 = members.iter().map(|m| m.contribution).sum();
        if total_amount != expected_total {
            return Err(BidhallError::InvalidInput {
                reason: format!(
                    "member contributions sum to {total_amount}, batch fixed total is {expected_total}"
                ),
            });
        }

        let team_bid = TeamBid {
            id: TeamBidId::new(),
            team_id: first.team_id,
            permit_id: first.permit_id,
            leader: first.inviter,
            members,
            total_amount,
            status: TeamBidStatus::Pending,
            created_at: Utc::now(),
        };
        let id = team_bid.id;
        self.by_permit
            .entry(team_bid.permit_id)
            .or_default()
            .push(id);
        self.bids.insert(id, team_bid);
        Ok(id)
    }

    /// Look up a team bid.
    ///
    /// # Errors
    /// Returns `TeamBidNotFound` for an unknown id.
    pub fn get(&self, id: TeamBidId) -> Result<&TeamBid> {
        self.bids.get(&id).ok_or(BidhallError::TeamBidNotFound(id))
    }

    /// The complete team bid currently associated with a team id, if any.
    #[must_use]
    pub fn by_team(&self, team_id: TeamId) -> Option<&TeamBid> {
        self.bids.values().find(|tb| tb.team_id == team_id)
    }

    /// Team bids for a permit, newest first.
    #[must_use]
    pub fn for_permit(&self, permit_id: PermitId) -> Vec<&TeamBid> {
        let mut bids: Vec<&TeamBid> = self
            .by_permit
            .get(&permit_id)
            .map(|ids| ids.iter().filter_map(|id| self.bids.get(id)).collect())
            .unwrap_or_default();
        bids.reverse();
        bids
    }

    /// Transition a bid to `Complete` after the whole-team debit committed.
    ///
    /// # Errors
    /// `TeamBidNotFound`, `InvalidTransition` unless pending.
    pub fn mark_complete(&mut self, id: TeamBidId) -> Result<()> {
        self.get_mut(id)?.mark_complete()
    }

    /// Transition a bid to `Failed` (rejection, or a debit that bounced).
    ///
    /// # Errors
    /// `TeamBidNotFound`, `InvalidTransition` unless pending.
    pub fn mark_failed(&mut self, id: TeamBidId) -> Result<()> {
        self.get_mut(id)?.mark_failed()
    }

    /// Transition an outbid team bid to `Refunded`.
    ///
    /// # Errors
    /// `TeamBidNotFound`, `InvalidTransition` unless complete.
    pub fn mark_refunded(&mut self, id: TeamBidId) -> Result<()> {
        self.get_mut(id)?.mark_refunded()
    }

    fn get_mut(&mut self, id: TeamBidId) -> Result<&mut TeamBid> {
        self.bids
            .get_mut(&id)
            .ok_or(BidhallError::TeamBidNotFound(id))
    }
}

impl Default for TeamBidBook {
    fn default() -> Self {
        Self::new()
    }
}
