//! Permit record and the typed leader pointer.
//!
//! The permit's `leader` field is the **authoritative** source of truth
//! for who currently holds the highest bid. Refunds are driven off this
//! pointer; the append-only bid history is never scanned to re-derive it.

use serde::{Deserialize, Serialize};

use crate::{BidId, Coins, PermitId, TeamBidId, UserId};

/// The current holder of a permit's highest bid.
///
/// Exactly one variant is active at a time: an individual bid and a team
/// bid are never simultaneously leading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Leader {
    /// No bid has been accepted yet.
    #[default]
    None,
    /// An individual bid leads.
    Individual { bid_id: BidId, bidder: UserId },
    /// A completed team bid leads.
    Team { team_bid_id: TeamBidId },
}

impl Leader {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Display for Leader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Individual { bid_id, .. } => write!(f, "{bid_id}"),
            Self::Team { team_bid_id } => write!(f, "{team_bid_id}"),
        }
    }
}

/// An auctioned permit.
///
/// Created at catalog seeding, mutated once per accepted bid, never
/// deleted during normal operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permit {
    pub id: PermitId,
    pub name: String,
    pub description: String,
    /// Amount of the current leading bid (individual amount or team
    /// total). Zero until the first bid is accepted.
    pub highest_bid: Coins,
    /// Who holds the leading bid.
    pub leader: Leader,
    /// Bumped on every committed leader transition. Callers snapshot it
    /// to detect lost commit races.
    pub version: u64,
}

impl Permit {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: PermitId::new(),
            name: name.into(),
            description: description.into(),
            highest_bid: 0,
            leader: Leader::None,
            version: 0,
        }
    }

    /// Whether `amount` would strictly outbid the current highest.
    /// Equality is never enough.
    #[must_use]
    pub fn clears(&self, amount: Coins) -> bool {
        amount > self.highest_bid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_permit_has_no_leader() {
        let permit = Permit::new("Armory", "Weapons and armor.");
        assert_eq!(permit.highest_bid, 0);
        assert!(permit.leader.is_none());
        assert_eq!(permit.version, 0);
    }

    #[test]
    fn clears_requires_strict_increase() {
        let mut permit = Permit::new("Armory", "Weapons and armor.");
        permit.highest_bid = 50;
        assert!(!permit.clears(49));
        assert!(!permit.clears(50));
        assert!(permit.clears(51));
    }

    #[test]
    fn leader_display() {
        assert_eq!(Leader::None.to_string(), "none");
        let bid_id = BidId::new();
        let leader = Leader::Individual {
            bid_id,
            bidder: UserId::new(),
        };
        assert_eq!(leader.to_string(), bid_id.to_string());
    }

    #[test]
    fn permit_serde_roundtrip() {
        let mut permit = Permit::new("Fireworks Emporium", "Fireworks for celebrations.");
        permit.leader = Leader::Team {
            team_bid_id: TeamBidId::new(),
        };
        permit.highest_bid = 90;
        permit.version = 3;
        let json = serde_json::to_string(&permit).unwrap();
        let back: Permit = serde_json::from_str(&json).unwrap();
        assert_eq!(back.leader, permit.leader);
        assert_eq!(back.highest_bid, 90);
        assert_eq!(back.version, 3);
    }
}
