//! Individual bid record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BidId, Coins, PermitId, UserId};

/// A single accepted individual bid. Immutable once created — the bid
/// history is append-only, and the permit's leader pointer (not this
/// record) says whether the bid still leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub permit_id: PermitId,
    pub bidder: UserId,
    pub amount: Coins,
    pub placed_at: DateTime<Utc>,
}

impl Bid {
    #[must_use]
    pub fn new(permit_id: PermitId, bidder: UserId, amount: Coins) -> Self {
        Self {
            id: BidId::new(),
            permit_id,
            bidder,
            amount,
            placed_at: Utc::now(),
        }
    }
}
