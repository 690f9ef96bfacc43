//! The bid store: permits, history, and leader transitions.

use std::collections::HashMap;

use bidhall_types::{Bid, BidhallError, Coins, Leader, Permit, PermitId, Result, TeamBidId};

/// A caller's view of a permit's leader at a point in time. The
/// `version` goes back into [`BidStore::record_bid`] so the store can
/// tell a merely-low bid from one that lost a commit race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderSnapshot {
    pub leader: Leader,
    pub amount: Coins,
    pub version: u64,
}

/// Owns every permit and its append-only bid history.
pub struct BidStore {
    permits: HashMap<PermitId, Permit>,
    history: HashMap<PermitId, Vec<Bid>>,
}

impl BidStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            permits: HashMap::new(),
            history: HashMap::new(),
        }
    }

    /// Add a permit to the catalog.
    pub fn add_permit(&mut self, permit: Permit) -> PermitId {
        let id = permit.id;
        self.history.entry(id).or_default();
        self.permits.insert(id, permit);
        id
    }

    /// Look up a permit.
    ///
    /// # Errors
    /// Returns `PermitNotFound` for an unknown id.
    pub fn permit(&self, permit_id: PermitId) -> Result<&Permit> {
        self.permits
            .get(&permit_id)
            .ok_or(BidhallError::PermitNotFound(permit_id))
    }

    /// All permits, unordered.
    #[must_use]
    pub fn permits(&self) -> Vec<&Permit> {
        self.permits.values().collect()
    }

    /// The present leader of a permit, or `Leader::None`.
    ///
    /// # Errors
    /// Returns `PermitNotFound` for an unknown id.
    pub fn current_leader(&self, permit_id: PermitId) -> Result<LeaderSnapshot> {
        let permit = self.permit(permit_id)?;
        Ok(LeaderSnapshot {
            leader: permit.leader,
            amount: permit.highest_bid,
            version: permit.version,
        })
    }

    /// Append an individual bid and move the leader pointer to it, in
    /// one step.
    ///
    /// The strictly-greater rule is re-checked here, at commit time. A
    /// non-clearing amount is `BidTooLow` if the permit hasn't moved
    /// since `expected_version` was read, `StaleBid` if it has — the
    /// caller lost a race and should re-fetch and retry.
    ///
    /// # Errors
    /// `PermitNotFound`, `BidTooLow`, `StaleBid`.
    pub fn record_bid(&mut self, bid: Bid, expected_version: u64) -> Result<()> {
        let permit_id = bid.permit_id;
        let leader = Leader::Individual {
            bid_id: bid.id,
            bidder: bid.bidder,
        };
        self.transition_leader(permit_id, leader, bid.amount, expected_version)?;
        self.history.entry(permit_id).or_default().push(bid);
        Ok(())
    }

    /// Move the leader pointer to a completed team bid. Same commit-time
    /// contract as [`Self::record_bid`]; team bids do not enter the
    /// individual history.
    ///
    /// # Errors
    /// `PermitNotFound`, `BidTooLow`, `StaleBid`.
    pub fn record_team_leader(
        &mut self,
        permit_id: PermitId,
        team_bid_id: TeamBidId,
        total: Coins,
        expected_version: u64,
    ) -> Result<()> {
        self.transition_leader(permit_id, Leader::Team { team_bid_id }, total, expected_version)
    }

    fn transition_leader(
        &mut self,
        permit_id: PermitId,
        leader: Leader,
        amount: Coins,
        expected_version: u64,
    ) -> Result<()> {
        let permit = self
            .permits
            .get_mut(&permit_id)
            .ok_or(BidhallError::PermitNotFound(permit_id))?;

        if !permit.clears(amount) {
            if permit.version != expected_version {
                return Err(BidhallError::StaleBid { permit: permit_id });
            }
            return Err(BidhallError::BidTooLow {
                offered: amount,
                highest: permit.highest_bid,
            });
        }

        permit.leader = leader;
        permit.highest_bid = amount;
        permit.version += 1;

        tracing::debug!(
            permit = %permit_id,
            leader = %permit.leader,
            amount,
            version = permit.version,
            "Leader transition committed"
        );
        Ok(())
    }

    /// The bid history for a permit, newest first.
    ///
    /// # Errors
    /// Returns `PermitNotFound` for an unknown id.
    pub fn bid_history(&self, permit_id: PermitId) -> Result<Vec<Bid>> {
        if !self.permits.contains_key(&permit_id) {
            return Err(BidhallError::PermitNotFound(permit_id));
        }
        let mut bids = self.history.get(&permit_id).cloned().unwrap_or_default();
        bids.reverse();
        Ok(bids)
    }

    /// Coins currently escrowed across all permits: the sum of every
    /// leading-bid amount. Refunded amounts have already left this sum
    /// because the leader pointer moved.
    #[must_use]
    pub fn total_escrowed(&self) -> Coins {
        self.permits.values().map(|p| p.highest_bid).sum()
    }

    /// Number of permits in the catalog.
    #[must_use]
    pub fn permit_count(&self) -> usize {
        self.permits.len()
    }
}

impl Default for BidStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidhall_types::UserId;

    fn store_with_permit() -> (BidStore, PermitId) {
        let mut store = BidStore::new();
        let id = store.add_permit(Permit::new("Armory", "Weapons and armor."));
        (store, id)
    }

    #[test]
    fn fresh_permit_has_no_leader() {
        let (store, id) = store_with_permit();
        let snap = store.current_leader(id).unwrap();
        assert_eq!(snap.leader, Leader::None);
        assert_eq!(snap.amount, 0);
        assert_eq!(snap.version, 0);
    }

    #[test]
    fn record_bid_moves_leader_and_version() {
        let (mut store, id) = store_with_permit();
        let alice = UserId::new();
        let bid = Bid::new(id, alice, 50);
        let bid_id = bid.id;
        store.record_bid(bid, 0).unwrap();

        let snap = store.current_leader(id).unwrap();
        assert_eq!(
            snap.leader,
            Leader::Individual {
                bid_id,
                bidder: alice
            }
        );
        assert_eq!(snap.amount, 50);
        assert_eq!(snap.version, 1);
    }

    #[test]
    fn equal_amount_is_too_low() {
        let (mut store, id) = store_with_permit();
        store.record_bid(Bid::new(id, UserId::new(), 50), 0).unwrap();
        let err = store
            .record_bid(Bid::new(id, UserId::new(), 50), 1)
            .unwrap_err();
        assert!(matches!(
            err,
            BidhallError::BidTooLow {
                offered: 50,
                highest: 50
            }
        ));
    }

    #[test]
    fn lost_race_is_stale_not_too_low() {
        let (mut store, id) = store_with_permit();
        // caller snapshots version 0 (highest 0), plans to bid 50
        let snap = store.current_leader(id).unwrap();
        // a concurrent 60 commits first
        store.record_bid(Bid::new(id, UserId::new(), 60), 0).unwrap();
        // the 50 no longer clears and the version moved: stale
        let err = store
            .record_bid(Bid::new(id, UserId::new(), 50), snap.version)
            .unwrap_err();
        assert!(matches!(err, BidhallError::StaleBid { .. }));
    }

    #[test]
    fn clearing_amount_wins_despite_version_drift() {
        let (mut store, id) = store_with_permit();
        store.record_bid(Bid::new(id, UserId::new(), 60), 0).unwrap();
        // stale snapshot, but 95 still clears 60 — commit check passes
        store.record_bid(Bid::new(id, UserId::new(), 95), 0).unwrap();
        assert_eq!(store.current_leader(id).unwrap().amount, 95);
    }

    #[test]
    fn failed_transition_keeps_history_clean() {
        let (mut store, id) = store_with_permit();
        store.record_bid(Bid::new(id, UserId::new(), 50), 0).unwrap();
        let _ = store.record_bid(Bid::new(id, UserId::new(), 10), 1);
        assert_eq!(store.bid_history(id).unwrap().len(), 1);
    }

    #[test]
    fn team_leader_transition() {
        let (mut store, id) = store_with_permit();
        let team_bid_id = TeamBidId::new();
        store.record_team_leader(id, team_bid_id, 90, 0).unwrap();
        let snap = store.current_leader(id).unwrap();
        assert_eq!(snap.leader, Leader::Team { team_bid_id });
        assert_eq!(snap.amount, 90);
        // team leads don't enter the individual history
        assert!(store.bid_history(id).unwrap().is_empty());
    }

    #[test]
    fn history_is_newest_first() {
        let (mut store, id) = store_with_permit();
        store.record_bid(Bid::new(id, UserId::new(), 50), 0).unwrap();
        store.record_bid(Bid::new(id, UserId::new(), 60), 1).unwrap();
        store.record_bid(Bid::new(id, UserId::new(), 70), 2).unwrap();
        let history = store.bid_history(id).unwrap();
        let amounts: Vec<_> = history.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, vec![70, 60, 50]);
    }

    #[test]
    fn unknown_permit_fails() {
        let store = BidStore::new();
        let ghost = PermitId::new();
        assert!(matches!(
            store.permit(ghost).unwrap_err(),
            BidhallError::PermitNotFound(_)
        ));
        assert!(matches!(
            store.bid_history(ghost).unwrap_err(),
            BidhallError::PermitNotFound(_)
        ));
    }

    #[test]
    fn escrow_total_tracks_leading_amounts() {
        let mut store = BidStore::new();
        let a = store.add_permit(Permit::new("A", "a"));
        let b = store.add_permit(Permit::new("B", "b"));
        store.record_bid(Bid::new(a, UserId::new(), 50), 0).unwrap();
        store.record_bid(Bid::new(b, UserId::new(), 30), 0).unwrap();
        assert_eq!(store.total_escrowed(), 80);
        // outbid on A replaces, not adds
        store.record_bid(Bid::new(a, UserId::new(), 60), 1).unwrap();
        assert_eq!(store.total_escrowed(), 90);
    }
}
