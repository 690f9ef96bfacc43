//! The invite book: batch fan-out and response handling.

use std::collections::HashMap;

use chrono::Utc;
use bidhall_types::{
    BidhallError, Coins, Invite, InviteId, InviteResponse, InviteStatus, PermitId, Result, TeamId,
    UserId,
};

/// What a response did to the invite group as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Some invites are still pending.
    Pending,
    /// This response was the rejection that killed the group.
    NewlyFailed { rejected_by: UserId },
    /// The group was already dead; the invite stays pending and is no
    /// longer actionable.
    AlreadyFailed { rejected_by: UserId },
    /// Every invite is now accepted. Carries the batch in creation
    /// order, ready to materialize a team bid.
    AllAccepted { invites: Vec<Invite> },
}

/// Owns every invite, indexed by id, team, and invitee.
pub struct InviteBook {
    invites: HashMap<InviteId, Invite>,
    /// Batch order is preserved: members materialize in the order they
    /// were invited.
    by_team: HashMap<TeamId, Vec<InviteId>>,
    by_invitee: HashMap<UserId, Vec<InviteId>>,
}

impl InviteBook {
    /// Create an empty invite book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            invites: HashMap::new(),
            by_team: HashMap::new(),
            by_invitee: HashMap::new(),
        }
    }

    /// Dispatch one batch of invites for a permit. Team size counts the
    /// inviter; the total team bid is fixed here and never recomputed.
    ///
    /// The caller has already resolved every invitee to a real user.
    ///
    /// # Errors
    /// `InvalidInput` for an empty list, a zero contribution, a batch
    /// over `max_batch`, a duplicate invitee, or a self-invite.
    pub fn create_batch(
        &mut self,
        inviter: UserId,
        permit_id: PermitId,
        invitees: &[UserId],
        contribution: Coins,
        max_batch: usize,
    ) -> Result<(TeamId, Vec<Invite>)> {
        if invitees.is_empty() {
            return Err(BidhallError::InvalidInput {
                reason: "invite list is empty".to_string(),
            });
        }
        if contribution == 0 {
            return Err(BidhallError::InvalidInput {
                reason: "contribution must be positive".to_string(),
            });
        }
        if invitees.len() > max_batch {
            return Err(BidhallError::InvalidInput {
                reason: format!("batch of {} exceeds limit {max_batch}", invitees.len()),
            });
        }
        for (i, invitee) in invitees.iter().enumerate() {
            if *invitee == inviter {
                return Err(BidhallError::InvalidInput {
                    reason: "inviter cannot invite themselves".to_string(),
                });
            }
            if invitees[..i].contains(invitee) {
                return Err(BidhallError::InvalidInput {
                    reason: format!("duplicate invitee {invitee}"),
                });
            }
        }

        let team_size = u32::try_from(invitees.len() + 1).map_err(|_| {
            BidhallError::InvalidInput {
                reason: "team too large".to_string(),
            }
        })?;
        let total_team_bid = contribution
            .checked_mul(Coins::from(team_size))
            .ok_or(BidhallError::InvalidInput {
                reason: "total team bid overflows".to_string(),
            })?;

        let team_id = TeamId::new();
        let now = Utc::now();
        let batch: Vec<Invite> = invitees
            .iter()
            .map(|&invitee| Invite {
                id: InviteId::new(),
                team_id,
                permit_id,
                inviter,
                invitee,
                contribution,
                team_size,
                total_team_bid,
                status: InviteStatus::Pending,
                created_at: now,
            })
            .collect();

        let ids: Vec<InviteId> = batch.iter().map(|i| i.id).collect();
        self.by_team.insert(team_id, ids);
        for invite in &batch {
            self.by_invitee
                .entry(invite.invitee)
                .or_default()
                .push(invite.id);
            self.invites.insert(invite.id, invite.clone());
        }

        tracing::info!(
            team = %team_id,
            permit = %permit_id,
            invitees = batch.len(),
            contribution,
            total_team_bid,
            "Invite batch dispatched"
        );
        Ok((team_id, batch))
    }

    /// Record an invitee's response and recompute the group resolution.
    ///
    /// A response to an invite in an already-failed group does not
    /// resolve the invite: the group's fate is sealed and the invite
    /// just stops being actionable.
    ///
    /// # Errors
    /// `InviteNotFound`, `Unauthorized` if the responder is not the
    /// invitee, `AlreadyResolved` on a double response.
    pub fn respond(
        &mut self,
        invite_id: InviteId,
        responder: UserId,
        response: InviteResponse,
    ) -> Result<GroupOutcome> {
        let invite = self
            .invites
            .get(&invite_id)
            .ok_or(BidhallError::InviteNotFound(invite_id))?;
        if invite.invitee != responder {
            return Err(BidhallError::Unauthorized { invite: invite_id });
        }
        if invite.status.is_resolved() {
            return Err(BidhallError::AlreadyResolved(invite_id));
        }

        let team_id = invite.team_id;
        if let Some(rejected_by) = self.group_rejector(team_id) {
            // Sibling already rejected — leave this invite pending.
            return Ok(GroupOutcome::AlreadyFailed { rejected_by });
        }

        let invite = self
            .invites
            .get_mut(&invite_id)
            .ok_or(BidhallError::InviteNotFound(invite_id))?;
        invite.resolve(response)?;

        match response {
            InviteResponse::Reject => {
                tracing::info!(team = %team_id, rejected_by = %responder, "Team formation failed");
                Ok(GroupOutcome::NewlyFailed {
                    rejected_by: responder,
                })
            }
            InviteResponse::Accept => {
                let invites = self.team_invites(team_id);
                if invites.iter().all(|i| i.status == InviteStatus::Accepted) {
                    tracing::info!(team = %team_id, "All invites accepted");
                    Ok(GroupOutcome::AllAccepted {
                        invites: invites.into_iter().cloned().collect(),
                    })
                } else {
                    Ok(GroupOutcome::Pending)
                }
            }
        }
    }

    /// Look up an invite.
    ///
    /// # Errors
    /// Returns `InviteNotFound` for an unknown id.
    pub fn invite(&self, invite_id: InviteId) -> Result<&Invite> {
        self.invites
            .get(&invite_id)
            .ok_or(BidhallError::InviteNotFound(invite_id))
    }

    /// Every invite of a team, in batch order.
    #[must_use]
    pub fn team_invites(&self, team_id: TeamId) -> Vec<&Invite> {
        self.by_team
            .get(&team_id)
            .map(|ids| ids.iter().filter_map(|id| self.invites.get(id)).collect())
            .unwrap_or_default()
    }

    /// Invites addressed to a user, newest first.
    #[must_use]
    pub fn invites_for(&self, invitee: UserId) -> Vec<&Invite> {
        let mut invites: Vec<&Invite> = self
            .by_invitee
            .get(&invitee)
            .map(|ids| ids.iter().filter_map(|id| self.invites.get(id)).collect())
            .unwrap_or_default();
        invites.reverse();
        invites
    }

    /// The invitee who rejected, if any invite in the group is rejected.
    fn group_rejector(&self, team_id: TeamId) -> Option<UserId> {
        self.team_invites(team_id)
            .into_iter()
            .find(|i| i.status == InviteStatus::Rejected)
            .map(|i| i.invitee)
    }
}

impl Default for InviteBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (InviteBook, UserId, PermitId, Vec<UserId>) {
        let book = InviteBook::new();
        let leader = UserId::new();
        let permit = PermitId::new();
        let members = vec![UserId::new(), UserId::new()];
        (book, leader, permit, members)
    }

    #[test]
    fn batch_shares_team_and_fixes_totals() {
        let (mut book, leader, permit, members) = setup();
        let (team_id, invites) = book
            .create_batch(leader, permit, &members, 30, 16)
            .unwrap();
        assert_eq!(invites.len(), 2);
        for invite in &invites {
            assert_eq!(invite.team_id, team_id);
            assert_eq!(invite.team_size, 3);
            assert_eq!(invite.total_team_bid, 90);
            assert_eq!(invite.status, InviteStatus::Pending);
        }
    }

    #[test]
    fn empty_list_rejected() {
        let (mut book, leader, permit, _) = setup();
        let err = book.create_batch(leader, permit, &[], 30, 16).unwrap_err();
        assert!(matches!(err, BidhallError::InvalidInput { .. }));
    }

    #[test]
    fn zero_contribution_rejected() {
        let (mut book, leader, permit, members) = setup();
        let err = book
            .create_batch(leader, permit, &members, 0, 16)
            .unwrap_err();
        assert!(matches!(err, BidhallError::InvalidInput { .. }));
    }

    #[test]
    fn self_invite_rejected() {
        let (mut book, leader, permit, _) = setup();
        let err = book
            .create_batch(leader, permit, &[UserId::new(), leader], 30, 16)
            .unwrap_err();
        assert!(matches!(err, BidhallError::InvalidInput { .. }));
    }

    #[test]
    fn duplicate_invitee_rejected() {
        let (mut book, leader, permit, _) = setup();
        let other = UserId::new();
        let err = book
            .create_batch(leader, permit, &[other, other], 30, 16)
            .unwrap_err();
        assert!(matches!(err, BidhallError::InvalidInput { .. }));
    }

    #[test]
    fn partial_acceptance_is_pending() {
        let (mut book, leader, permit, members) = setup();
        let (_, invites) = book
            .create_batch(leader, permit, &members, 30, 16)
            .unwrap();
        let outcome = book
            .respond(invites[0].id, members[0], InviteResponse::Accept)
            .unwrap();
        assert_eq!(outcome, GroupOutcome::Pending);
    }

    #[test]
    fn full_acceptance_yields_batch() {
        let (mut book, leader, permit, members) = setup();
        let (_, invites) = book
            .create_batch(leader, permit, &members, 30, 16)
            .unwrap();
        book.respond(invites[0].id, members[0], InviteResponse::Accept)
            .unwrap();
        let outcome = book
            .respond(invites[1].id, members[1], InviteResponse::Accept)
            .unwrap();
        match outcome {
            GroupOutcome::AllAccepted { invites } => {
                assert_eq!(invites.len(), 2);
                // batch order preserved
                assert_eq!(invites[0].invitee, members[0]);
                assert_eq!(invites[1].invitee, members[1]);
            }
            other => panic!("expected AllAccepted, got {other:?}"),
        }
    }

    #[test]
    fn one_rejection_kills_the_group() {
        let (mut book, leader, permit, members) = setup();
        let (_, invites) = book
            .create_batch(leader, permit, &members, 30, 16)
            .unwrap();
        let outcome = book
            .respond(invites[0].id, members[0], InviteResponse::Reject)
            .unwrap();
        assert_eq!(
            outcome,
            GroupOutcome::NewlyFailed {
                rejected_by: members[0]
            }
        );
        // a later acceptance cannot revive it; the sibling invite stays pending
        let outcome = book
            .respond(invites[1].id, members[1], InviteResponse::Accept)
            .unwrap();
        assert_eq!(
            outcome,
            GroupOutcome::AlreadyFailed {
                rejected_by: members[0]
            }
        );
        assert_eq!(
            book.invite(invites[1].id).unwrap().status,
            InviteStatus::Pending
        );
    }

    #[test]
    fn wrong_responder_is_unauthorized() {
        let (mut book, leader, permit, members) = setup();
        let (_, invites) = book
            .create_batch(leader, permit, &members, 30, 16)
            .unwrap();
        let err = book
            .respond(invites[0].id, members[1], InviteResponse::Accept)
            .unwrap_err();
        assert!(matches!(err, BidhallError::Unauthorized { .. }));
    }

    #[test]
    fn double_response_is_already_resolved() {
        let (mut book, leader, permit, members) = setup();
        let (_, invites) = book
            .create_batch(leader, permit, &members, 30, 16)
            .unwrap();
        book.respond(invites[0].id, members[0], InviteResponse::Accept)
            .unwrap();
        let err = book
            .respond(invites[0].id, members[0], InviteResponse::Reject)
            .unwrap_err();
        assert!(matches!(err, BidhallError::AlreadyResolved(_)));
    }

    #[test]
    fn unknown_invite_fails() {
        let mut book = InviteBook::new();
        let err = book
            .respond(InviteId::new(), UserId::new(), InviteResponse::Accept)
            .unwrap_err();
        assert!(matches!(err, BidhallError::InviteNotFound(_)));
    }

    #[test]
    fn invites_for_is_newest_first() {
        let (mut book, leader, permit, _) = setup();
        let invitee = UserId::new();
        let (_, first) = book.create_batch(leader, permit, &[invitee], 10, 16).unwrap();
        let (_, second) = book.create_batch(leader, permit, &[invitee], 20, 16).unwrap();
        let listed = book.invites_for(invitee);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second[0].id);
        assert_eq!(listed[1].id, first[0].id);
    }
}
