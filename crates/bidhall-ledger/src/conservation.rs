//! Coin conservation invariant checker.
//!
//! Mathematical invariant enforced after every settlement:
//! ```text
//! Σ(user balances) + Σ(escrowed leading-bid amounts) == Σ(seeds)
//! ```
//!
//! Coins enter the system only through explicit seeding. A bid/refund
//! cycle moves coins between balances and escrow but never changes the
//! total. If this invariant ever breaks, something has gone
//! catastrophically wrong and the engine halts the operation.

use bidhall_types::{BidhallError, Coins, Result};

/// Tracks coins seeded into the system and validates conservation.
pub struct CoinConservation {
    seeded: Coins,
}

impl CoinConservation {
    /// Create a new conservation tracker.
    #[must_use]
    pub fn new() -> Self {
        Self { seeded: 0 }
    }

    /// Record coins entering the system (user seeding or admin grant).
    pub fn record_seed(&mut self, amount: Coins) {
        self.seeded = self.seeded.saturating_add(amount);
    }

    /// Total coins that should exist.
    #[must_use]
    pub fn expected_total(&self) -> Coins {
        self.seeded
    }

    /// Verify that circulating + escrowed coins match the seeded total.
    ///
    /// # Errors
    /// Returns [`BidhallError::ConservationViolation`] on any drift.
    pub fn verify(&self, circulating: Coins, escrowed: Coins) -> Result<()> {
        let actual = circulating.saturating_add(escrowed);
        if actual != self.seeded {
            return Err(BidhallError::ConservationViolation {
                reason: format!(
                    "circulating {circulating} + escrowed {escrowed} = {actual}, \
                     expected {} seeded",
                    self.seeded
                ),
            });
        }
        Ok(())
    }
}

impl Default for CoinConservation {
    fn default() -> Self {
        Self::new()
    }
}
