//! User account record.
//!
//! The coin balance lives here but is only ever mutated through the
//! Ledger's debit/credit operations — settlement logic never writes
//! the field directly.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Coin amounts are whole, non-negative integers. No fractional coins,
/// no multi-currency.
pub type Coins = u64;

/// A registered auction participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Current spendable balance. Coins escrowed behind a leading bid
    /// have already been debited and are not included here.
    pub coins: Coins,
}

impl User {
    #[must_use]
    pub fn new(username: impl Into<String>, coins: Coins) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            coins,
        }
    }
}

/// Dummy user for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl User {
    /// A user with a collision-resistant throwaway username and the
    /// stock starting balance.
    #[must_use]
    pub fn dummy() -> Self {
        Self::new(
            format!("user-{:08x}", rand::random::<u32>()),
            crate::constants::DEFAULT_STARTING_COINS,
        )
    }
}
