//! The settlement engine.
//!
//! Owns every store and runs each settlement as one critical section:
//! validate, stage, commit, publish. Exclusive access (`&mut self`)
//! serializes concurrent requests; the commit-time stale check in the
//! bid store covers callers that validated against a snapshot.

use bidhall_ledger::{Ledger, LedgerTxn};
use bidhall_store::{catalog, BidStore, LeaderSnapshot};
use bidhall_teams::{GroupOutcome, InviteBook, TeamBidBook};
use bidhall_types::{
    AuctionConfig, AuctionEvent, Bid, BidId, BidhallError, Coins, Invite, InviteId,
    InviteResponse, Leader, Permit, PermitId, Result, TeamBid, TeamBidId, TeamBidStatus, TeamId,
    Topic, User, UserId,
};

use crate::outbox::Outbox;
use crate::publisher::EventPublisher;

/// What the caller gets back from a successful individual bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidReceipt {
    pub bid_id: BidId,
    /// The bidder's balance after the debit.
    pub new_balance: Coins,
    /// The permit's highest bid after the commit (the bid amount).
    pub new_highest_bid: Coins,
}

/// What the caller gets back from dispatching a team invite batch.
#[derive(Debug, Clone)]
pub struct InviteBatch {
    pub team_id: TeamId,
    pub invites: Vec<Invite>,
}

/// Caller-facing resolution of an invite group after a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    /// Responses are still outstanding.
    Pending,
    /// A member rejected (or the whole-team debit bounced); the group
    /// will never bid.
    Failed,
    /// Every member accepted and the team bid settled as the new leader.
    Complete,
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Failed => write!(f, "FAILED"),
            Self::Complete => write!(f, "COMPLETE"),
        }
    }
}

/// The auction settlement engine.
pub struct SettlementEngine<P: EventPublisher> {
    config: AuctionConfig,
    ledger: Ledger,
    store: BidStore,
    invites: InviteBook,
    team_bids: TeamBidBook,
    publisher: P,
}

impl<P: EventPublisher> SettlementEngine<P> {
    /// Create an engine with empty stores.
    pub fn new(config: AuctionConfig, publisher: P) -> Self {
        Self {
            config,
            ledger: Ledger::new(),
            store: BidStore::new(),
            invites: InviteBook::new(),
            team_bids: TeamBidBook::new(),
            publisher,
        }
    }

    // =====================================================================
    // Seeding
    // =====================================================================

    /// Create every permit in the configured catalog.
    pub fn seed_catalog(&mut self) -> Vec<PermitId> {
        catalog::seed(&mut self.store, &self.config)
    }

    /// Register a user with the configured starting balance.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the username is taken.
    pub fn seed_user(&mut self, username: &str) -> Result<UserId> {
        self.ledger.seed_user(username, self.config.starting_coins)
    }

    /// Register a user with an explicit starting balance.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the username is taken.
    pub fn seed_user_with(&mut self, username: &str, coins: Coins) -> Result<UserId> {
        self.ledger.seed_user(username, coins)
    }

    // =====================================================================
    // Individual bids
    // =====================================================================

    /// Place an individual bid.
    ///
    /// Validation is side-effect free; once it passes, the outbid
    /// refund, the new debit, the history append, and the leader
    /// transition commit together or not at all. Events publish after
    /// commit.
    ///
    /// # Errors
    /// `InvalidAmount`, `PermitNotFound`, `UserNotFound`,
    /// `InsufficientFunds`, `BidTooLow`, `StaleBid`.
    pub fn place_bid(
        &mut self,
        permit_id: PermitId,
        bidder: UserId,
        amount: Coins,
    ) -> Result<BidReceipt> {
        self.place_bid_inner(permit_id, bidder, amount, None)
    }

    /// Optimistic variant: fails `StaleBid` if the permit's version has
    /// moved since the caller observed it, even when the amount would
    /// still clear. Concurrent front ends use this to guarantee their
    /// user saw the price they outbid.
    ///
    /// # Errors
    /// As [`Self::place_bid`], plus `StaleBid` on any version drift.
    pub fn place_bid_as_of(
        &mut self,
        permit_id: PermitId,
        bidder: UserId,
        amount: Coins,
        observed_version: u64,
    ) -> Result<BidReceipt> {
        self.place_bid_inner(permit_id, bidder, amount, Some(observed_version))
    }

    fn place_bid_inner(
        &mut self,
        permit_id: PermitId,
        bidder: UserId,
        amount: Coins,
        observed_version: Option<u64>,
    ) -> Result<BidReceipt> {
        let snap = self.store.current_leader(permit_id)?;
        // Zero is rejected before any balance is read.
        if amount == 0 {
            return Err(BidhallError::InvalidAmount);
        }
        if let Some(observed) = observed_version {
            if observed != snap.version {
                return Err(BidhallError::StaleBid { permit: permit_id });
            }
        }

        let balance = self.ledger.balance(bidder)?;
        // A self-outbid gets its previous escrow back in the same
        // transaction, so the funds check nets it out.
        let self_escrow = match snap.leader {
            Leader::Individual { bidder: prev, .. } if prev == bidder => snap.amount,
            _ => 0,
        };
        let available = balance.saturating_add(self_escrow);
        if amount > available {
            return Err(BidhallError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        if amount <= snap.amount {
            return Err(BidhallError::BidTooLow {
                offered: amount,
                highest: snap.amount,
            });
        }

        let mut outbox = Outbox::new();
        let mut txn = self.ledger.begin();
        let refunded_team = stage_leader_refund(
            &self.team_bids,
            &mut txn,
            &mut outbox,
            permit_id,
            &snap,
            amount,
            Some(bidder),
        )?;
        let new_balance = txn.debit(bidder, amount)?;

        let bid = Bid::new(permit_id, bidder, amount);
        let bid_id = bid.id;
        outbox.stage(
            Topic::Global,
            AuctionEvent::BidPlaced {
                permit_id,
                bidder,
                amount,
                new_balance,
            },
        );

        // Commit point: the stale guard runs inside the transition, and
        // an abort here drops the staged ledger ops and events.
        self.store.record_bid(bid, snap.version)?;
        if let Some(team_bid_id) = refunded_team {
            // Pre-validated COMPLETE while staging the refund.
            self.team_bids.mark_refunded(team_bid_id)?;
        }
        txn.commit();

        tracing::info!(
            permit = %permit_id,
            bidder = %bidder,
            amount,
            new_balance,
            "Bid settled"
        );
        outbox.publish_all(&self.publisher);
        Ok(BidReceipt {
            bid_id,
            new_balance,
            new_highest_bid: amount,
        })
    }

    // =====================================================================
    // Team formation
    // =====================================================================

    /// Dispatch one batch of team invites for a permit.
    ///
    /// No coins move: funds are checked only when the completed group
    /// debits. Each invitee gets a `newInvite` event.
    ///
    /// # Errors
    /// `UserNotFound` (inviter or any invitee), `PermitNotFound`,
    /// `InvalidInput` (empty list, zero contribution, oversized batch,
    /// duplicate or self invite).
    pub fn create_invites(
        &mut self,
        inviter: UserId,
        permit_id: PermitId,
        invitees: &[UserId],
        contribution: Coins,
    ) -> Result<InviteBatch> {
        self.ledger.user(inviter)?;
        self.store.permit(permit_id)?;
        for invitee in invitees {
            self.ledger.user(*invitee)?;
        }

        let (team_id, invites) = self.invites.create_batch(
            inviter,
            permit_id,
            invitees,
            contribution,
            self.config.max_invites_per_batch,
        )?;

        let mut outbox = Outbox::new();
        for invite in &invites {
            outbox.stage(
                Topic::User(invite.invitee),
                AuctionEvent::NewInvite {
                    invite_id: invite.id,
                    team_id,
                    permit_id,
                    inviter,
                    contribution,
                    total_team_bid: invite.total_team_bid,
                },
            );
        }
        outbox.publish_all(&self.publisher);
        Ok(InviteBatch { team_id, invites })
    }

    /// Record an invitee's response.
    ///
    /// The first rejection fails the group and notifies every member;
    /// the last acceptance triggers the whole-team debit and settles
    /// the aggregate as the permit's new leader.
    ///
    /// # Errors
    /// `InviteNotFound`, `Unauthorized`, `AlreadyResolved`; from the
    /// completion path also `InsufficientFunds` (a member cannot cover
    /// their contribution — the group fails, nothing moves) and
    /// `BidTooLow` (the fixed team total no longer clears the permit's
    /// highest bid — the group fails).
    pub fn respond_to_invite(
        &mut self,
        invite_id: InviteId,
        responder: UserId,
        response: InviteResponse,
    ) -> Result<GroupStatus> {
        match self.invites.respond(invite_id, responder, response)? {
            GroupOutcome::Pending => Ok(GroupStatus::Pending),
            GroupOutcome::AlreadyFailed { .. } => Ok(GroupStatus::Failed),
            GroupOutcome::NewlyFailed { rejected_by } => {
                let invite = self.invites.invite(invite_id)?;
                let (team_id, permit_id, inviter) =
                    (invite.team_id, invite.permit_id, invite.inviter);
                let event = AuctionEvent::TeamFormationFailed {
                    permit_id,
                    team_id,
                    rejected_by,
                };
                let mut outbox = Outbox::new();
                outbox.stage(Topic::User(inviter), event.clone());
                for member in self.invites.team_invites(team_id) {
                    outbox.stage(Topic::User(member.invitee), event.clone());
                }
                outbox.publish_all(&self.publisher);
                Ok(GroupStatus::Failed)
            }
            GroupOutcome::AllAccepted { invites } => self.settle_team_bid(&invites),
        }
    }

    /// Settle a fully accepted invite group: materialize the team bid,
    /// debit every member in one transaction, and take the lead.
    fn settle_team_bid(&mut self, invites: &[Invite]) -> Result<GroupStatus> {
        let team_bid_id = self.team_bids.materialize(invites)?;
        let team_bid = self.team_bids.get(team_bid_id)?.clone();
        let permit_id = team_bid.permit_id;
        let total = team_bid.total_amount;

        let snap = match self.store.current_leader(permit_id) {
            Ok(snap) => snap,
            Err(err) => {
                self.team_bids.mark_failed(team_bid_id)?;
                return Err(err);
            }
        };
        // The total was fixed at invite time; the permit may have moved
        // past it since.
        if total <= snap.amount {
            self.team_bids.mark_failed(team_bid_id)?;
            return Err(BidhallError::BidTooLow {
                offered: total,
                highest: snap.amount,
            });
        }

        let mut outbox = Outbox::new();
        let mut txn = self.ledger.begin();
        let refunded_team = match stage_leader_refund(
            &self.team_bids,
            &mut txn,
            &mut outbox,
            permit_id,
            &snap,
            total,
            None,
        ) {
            Ok(refunded) => refunded,
            Err(err) => {
                drop(txn);
                self.team_bids.mark_failed(team_bid_id)?;
                return Err(err);
            }
        };

        // Debit every member, leader included. One bounce aborts the
        // whole transition: the staged refund and every staged debit
        // evaporate with the transaction.
        for member in &team_bid.members {
            if let Err(err) = txn.debit(member.user, member.contribution) {
                drop(txn);
                self.team_bids.mark_failed(team_bid_id)?;
                tracing::warn!(
                    team_bid = %team_bid_id,
                    member = %member.user,
                    contribution = member.contribution,
                    "Team debit bounced; group failed"
                );
                return Err(err);
            }
        }

        self.store
            .record_team_leader(permit_id, team_bid_id, total, snap.version)?;
        if let Some(previous) = refunded_team {
            self.team_bids.mark_refunded(previous)?;
        }
        self.team_bids.mark_complete(team_bid_id)?;
        txn.commit();

        tracing::info!(
            permit = %permit_id,
            team_bid = %team_bid_id,
            members = team_bid.members.len(),
            total,
            "Team bid settled"
        );

        let event = AuctionEvent::TeamBidComplete {
            permit_id,
            team_id: team_bid.team_id,
            team_bid_id,
            total_amount: total,
        };
        outbox.stage(Topic::Global, event.clone());
        for member in &team_bid.members {
            outbox.stage(Topic::User(member.user), event.clone());
        }
        outbox.publish_all(&self.publisher);
        Ok(GroupStatus::Complete)
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// All permits, unordered.
    #[must_use]
    pub fn permits(&self) -> Vec<&Permit> {
        self.store.permits()
    }

    /// One permit.
    ///
    /// # Errors
    /// `PermitNotFound`.
    pub fn permit(&self, permit_id: PermitId) -> Result<&Permit> {
        self.store.permit(permit_id)
    }

    /// Individual bid history for a permit, newest first.
    ///
    /// # Errors
    /// `PermitNotFound`.
    pub fn bid_history(&self, permit_id: PermitId) -> Result<Vec<Bid>> {
        self.store.bid_history(permit_id)
    }

    /// Team bids for a permit, newest first.
    #[must_use]
    pub fn team_bids(&self, permit_id: PermitId) -> Vec<&TeamBid> {
        self.team_bids.for_permit(permit_id)
    }

    /// Invites addressed to a user, newest first.
    #[must_use]
    pub fn invites_for(&self, user: UserId) -> Vec<&Invite> {
        self.invites.invites_for(user)
    }

    /// A user's spendable balance.
    ///
    /// # Errors
    /// `UserNotFound`.
    pub fn balance(&self, user: UserId) -> Result<Coins> {
        self.ledger.balance(user)
    }

    /// Look up a user record.
    ///
    /// # Errors
    /// `UserNotFound`.
    pub fn user(&self, user: UserId) -> Result<&User> {
        self.ledger.user(user)
    }

    /// Resolve a username to an id.
    ///
    /// # Errors
    /// `UserNotFound`.
    pub fn resolve_user(&self, username: &str) -> Result<UserId> {
        self.ledger.resolve(username)
    }

    /// Verify that circulating coins plus escrowed leading-bid amounts
    /// equal everything ever seeded.
    ///
    /// # Errors
    /// `ConservationViolation` on drift.
    pub fn verify_conservation(&self) -> Result<()> {
        self.ledger.verify_conservation(self.store.total_escrowed())
    }

    /// The injected publisher (handy for subscribing in tests).
    #[must_use]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}

/// Stage the refund of a permit's current leader into `txn`.
///
/// Individual leaders get one credit (and an `outbid` event unless they
/// are outbidding themselves); team leaders get one credit and one
/// `teamBidRefunded` event per member. Returns the team bid to mark
/// refunded after the ledger commit, if the leader was a team.
fn stage_leader_refund(
    team_bids: &TeamBidBook,
    txn: &mut LedgerTxn<'_>,
    outbox: &mut Outbox,
    permit_id: PermitId,
    snap: &LeaderSnapshot,
    new_amount: Coins,
    new_bidder: Option<UserId>,
) -> Result<Option<TeamBidId>> {
    match snap.leader {
        Leader::None => Ok(None),
        Leader::Individual {
            bidder: previous, ..
        } => {
            let refunded_balance = txn.credit(previous, snap.amount)?;
            if new_bidder != Some(previous) {
                outbox.stage(
                    Topic::User(previous),
                    AuctionEvent::Outbid {
                        permit_id,
                        refund: snap.amount,
                        new_balance: refunded_balance,
                        outbid_by: new_amount,
                    },
                );
            }
            Ok(None)
        }
        Leader::Team { team_bid_id } => {
            let team_bid = team_bids.get(team_bid_id)?;
            if team_bid.status != TeamBidStatus::Complete {
                return Err(BidhallError::Internal(format!(
                    "leading team bid {team_bid_id} is {}, expected COMPLETE",
                    team_bid.status
                )));
            }
            for member in &team_bid.members {
                let new_balance = txn.credit(member.user, member.contribution)?;
                outbox.stage(
                    Topic::User(member.user),
                    AuctionEvent::TeamBidRefunded {
                        permit_id,
                        team_bid_id,
                        refund: member.contribution,
                        new_balance,
                    },
                );
            }
            Ok(Some(team_bid_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::RecordingPublisher;

    fn engine() -> SettlementEngine<RecordingPublisher> {
        SettlementEngine::new(AuctionConfig::demo(), RecordingPublisher::new())
    }

    fn engine_with_permit() -> (SettlementEngine<RecordingPublisher>, PermitId) {
        let mut engine = engine();
        let permits = engine.seed_catalog();
        (engine, permits[0])
    }

    #[test]
    fn zero_amount_rejected_before_balance_check() {
        let (mut engine, permit) = engine_with_permit();
        // even an unknown bidder gets InvalidAmount first
        let err = engine.place_bid(permit, UserId::new(), 0).unwrap_err();
        assert!(matches!(err, BidhallError::InvalidAmount));
    }

    #[test]
    fn unknown_permit_rejected() {
        let mut engine = engine();
        let alice = engine.seed_user("alice").unwrap();
        let err = engine.place_bid(PermitId::new(), alice, 10).unwrap_err();
        assert!(matches!(err, BidhallError::PermitNotFound(_)));
    }

    #[test]
    fn first_bid_settles() {
        let (mut engine, permit) = engine_with_permit();
        let alice = engine.seed_user("alice").unwrap();
        let receipt = engine.place_bid(permit, alice, 50).unwrap();
        assert_eq!(receipt.new_balance, 50);
        assert_eq!(receipt.new_highest_bid, 50);
        assert_eq!(engine.permit(permit).unwrap().highest_bid, 50);
        engine.verify_conservation().unwrap();
    }

    #[test]
    fn insufficient_funds_is_side_effect_free() {
        let (mut engine, permit) = engine_with_permit();
        let alice = engine.seed_user("alice").unwrap();
        let err = engine.place_bid(permit, alice, 150).unwrap_err();
        assert!(matches!(
            err,
            BidhallError::InsufficientFunds {
                needed: 150,
                available: 100
            }
        ));
        assert_eq!(engine.balance(alice).unwrap(), 100);
        assert_eq!(engine.permit(permit).unwrap().highest_bid, 0);
        assert!(engine.publisher().events().is_empty());
    }

    #[test]
    fn outbid_refunds_previous_bidder() {
        let (mut engine, permit) = engine_with_permit();
        let alice = engine.seed_user("alice").unwrap();
        let bob = engine.seed_user("bob").unwrap();
        engine.place_bid(permit, alice, 50).unwrap();
        engine.place_bid(permit, bob, 60).unwrap();

        assert_eq!(engine.balance(alice).unwrap(), 100);
        assert_eq!(engine.balance(bob).unwrap(), 40);
        assert_eq!(engine.permit(permit).unwrap().highest_bid, 60);
        engine.verify_conservation().unwrap();

        let to_alice = engine.publisher().for_topic(Topic::User(alice));
        assert!(matches!(
            to_alice.as_slice(),
            [AuctionEvent::Outbid {
                refund: 50,
                new_balance: 100,
                outbid_by: 60,
                ..
            }]
        ));
    }

    #[test]
    fn self_outbid_nets_the_difference() {
        let (mut engine, permit) = engine_with_permit();
        let alice = engine.seed_user("alice").unwrap();
        engine.place_bid(permit, alice, 50).unwrap();
        assert_eq!(engine.balance(alice).unwrap(), 50);

        // 80 > remaining 50, but the 50 refund nets it to -30
        let receipt = engine.place_bid(permit, alice, 80).unwrap();
        assert_eq!(receipt.new_balance, 20);
        assert_eq!(engine.balance(alice).unwrap(), 20);
        engine.verify_conservation().unwrap();

        // no outbid event for outbidding yourself
        assert!(engine.publisher().for_topic(Topic::User(alice)).is_empty());
    }

    #[test]
    fn equal_bid_is_too_low() {
        let (mut engine, permit) = engine_with_permit();
        let alice = engine.seed_user("alice").unwrap();
        let bob = engine.seed_user("bob").unwrap();
        engine.place_bid(permit, alice, 50).unwrap();
        let err = engine.place_bid(permit, bob, 50).unwrap_err();
        assert!(matches!(
            err,
            BidhallError::BidTooLow {
                offered: 50,
                highest: 50
            }
        ));
    }

    #[test]
    fn as_of_variant_detects_version_drift() {
        let (mut engine, permit) = engine_with_permit();
        let alice = engine.seed_user("alice").unwrap();
        let bob = engine.seed_user("bob").unwrap();

        let observed = engine.permit(permit).unwrap().version;
        engine.place_bid(permit, alice, 50).unwrap();

        // bob validated against version 0; even though 60 would clear,
        // he must re-read first
        let err = engine
            .place_bid_as_of(permit, bob, 60, observed)
            .unwrap_err();
        assert!(matches!(err, BidhallError::StaleBid { .. }));
        assert!(err.is_retryable());

        // retry with fresh state wins
        let fresh = engine.permit(permit).unwrap().version;
        engine.place_bid_as_of(permit, bob, 60, fresh).unwrap();
        assert_eq!(engine.permit(permit).unwrap().highest_bid, 60);
    }

    #[test]
    fn bid_history_tracks_accepted_bids_only() {
        let (mut engine, permit) = engine_with_permit();
        let alice = engine.seed_user("alice").unwrap();
        let bob = engine.seed_user("bob").unwrap();
        engine.place_bid(permit, alice, 50).unwrap();
        let _ = engine.place_bid(permit, bob, 20);
        engine.place_bid(permit, bob, 60).unwrap();

        let history = engine.bid_history(permit).unwrap();
        let amounts: Vec<_> = history.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, vec![60, 50]);
    }

    #[test]
    fn create_invites_validates_users_and_notifies() {
        let (mut engine, permit) = engine_with_permit();
        let leader = engine.seed_user("leader").unwrap();
        let member = engine.seed_user("member").unwrap();

        let err = engine
            .create_invites(leader, permit, &[member, UserId::new()], 30)
            .unwrap_err();
        assert!(matches!(err, BidhallError::UserNotFound(_)));

        let batch = engine.create_invites(leader, permit, &[member], 30).unwrap();
        assert_eq!(batch.invites.len(), 1);
        let to_member = engine.publisher().for_topic(Topic::User(member));
        assert!(matches!(
            to_member.as_slice(),
            [AuctionEvent::NewInvite {
                contribution: 30,
                total_team_bid: 60,
                ..
            }]
        ));
    }

    #[test]
    fn team_completion_debits_and_takes_lead() {
        let (mut engine, permit) = engine_with_permit();
        let leader = engine.seed_user("leader").unwrap();
        let m1 = engine.seed_user("m1").unwrap();
        let m2 = engine.seed_user("m2").unwrap();

        let batch = engine
            .create_invites(leader, permit, &[m1, m2], 30)
            .unwrap();
        engine
            .respond_to_invite(batch.invites[0].id, m1, InviteResponse::Accept)
            .unwrap();
        let status = engine
            .respond_to_invite(batch.invites[1].id, m2, InviteResponse::Accept)
            .unwrap();
        assert_eq!(status, GroupStatus::Complete);

        assert_eq!(engine.balance(leader).unwrap(), 70);
        assert_eq!(engine.balance(m1).unwrap(), 70);
        assert_eq!(engine.balance(m2).unwrap(), 70);
        assert_eq!(engine.permit(permit).unwrap().highest_bid, 90);
        assert!(matches!(
            engine.permit(permit).unwrap().leader,
            Leader::Team { .. }
        ));
        engine.verify_conservation().unwrap();

        let team_bids = engine.team_bids(permit);
        assert_eq!(team_bids.len(), 1);
        assert_eq!(team_bids[0].status, TeamBidStatus::Complete);
    }

    #[test]
    fn rejection_fails_group_without_moving_coins() {
        let (mut engine, permit) = engine_with_permit();
        let leader = engine.seed_user("leader").unwrap();
        let m1 = engine.seed_user("m1").unwrap();
        let m2 = engine.seed_user("m2").unwrap();

        let batch = engine
            .create_invites(leader, permit, &[m1, m2], 30)
            .unwrap();
        let status = engine
            .respond_to_invite(batch.invites[0].id, m1, InviteResponse::Reject)
            .unwrap();
        assert_eq!(status, GroupStatus::Failed);

        // a later acceptance cannot revive the group
        let status = engine
            .respond_to_invite(batch.invites[1].id, m2, InviteResponse::Accept)
            .unwrap();
        assert_eq!(status, GroupStatus::Failed);

        assert_eq!(engine.balance(leader).unwrap(), 100);
        assert_eq!(engine.balance(m1).unwrap(), 100);
        assert_eq!(engine.balance(m2).unwrap(), 100);
        assert_eq!(engine.permit(permit).unwrap().highest_bid, 0);
        assert!(engine.team_bids(permit).is_empty());
        engine.verify_conservation().unwrap();
    }

    #[test]
    fn late_insufficient_funds_fails_group_atomically() {
        let (mut engine, permit) = engine_with_permit();
        let leader = engine.seed_user("leader").unwrap();
        let m1 = engine.seed_user("m1").unwrap();
        let poor = engine.seed_user_with("poor", 10).unwrap();

        let batch = engine
            .create_invites(leader, permit, &[m1, poor], 30)
            .unwrap();
        engine
            .respond_to_invite(batch.invites[0].id, m1, InviteResponse::Accept)
            .unwrap();
        let err = engine
            .respond_to_invite(batch.invites[1].id, poor, InviteResponse::Accept)
            .unwrap_err();
        assert!(matches!(err, BidhallError::InsufficientFunds { .. }));

        // transactional rollback: nobody was debited
        assert_eq!(engine.balance(leader).unwrap(), 100);
        assert_eq!(engine.balance(m1).unwrap(), 100);
        assert_eq!(engine.balance(poor).unwrap(), 10);
        assert_eq!(engine.permit(permit).unwrap().highest_bid, 0);
        let team_bids = engine.team_bids(permit);
        assert_eq!(team_bids.len(), 1);
        assert_eq!(team_bids[0].status, TeamBidStatus::Failed);
        engine.verify_conservation().unwrap();
    }

    #[test]
    fn outbidding_a_team_refunds_every_member() {
        let (mut engine, permit) = engine_with_permit();
        let leader = engine.seed_user("leader").unwrap();
        let m1 = engine.seed_user("m1").unwrap();
        let rich = engine.seed_user_with("rich", 200).unwrap();

        let batch = engine.create_invites(leader, permit, &[m1], 30).unwrap();
        engine
            .respond_to_invite(batch.invites[0].id, m1, InviteResponse::Accept)
            .unwrap();
        assert_eq!(engine.permit(permit).unwrap().highest_bid, 60);

        engine.place_bid(permit, rich, 95).unwrap();
        assert_eq!(engine.balance(leader).unwrap(), 100);
        assert_eq!(engine.balance(m1).unwrap(), 100);
        assert_eq!(engine.balance(rich).unwrap(), 105);
        assert_eq!(engine.team_bids(permit)[0].status, TeamBidStatus::Refunded);
        engine.verify_conservation().unwrap();

        let refunds = engine.publisher().for_topic(Topic::User(m1));
        assert!(refunds
            .iter()
            .any(|e| matches!(e, AuctionEvent::TeamBidRefunded { refund: 30, .. })));
    }
}
