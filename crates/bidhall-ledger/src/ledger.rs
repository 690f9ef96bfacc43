//! The coin ledger.
//!
//! Owns every user account. All mutations are atomic: either the full
//! operation succeeds or the balance is unchanged.

use std::collections::HashMap;

use bidhall_types::{BidhallError, Coins, Result, User, UserId};

use crate::conservation::CoinConservation;
use crate::txn::LedgerTxn;

/// Source of truth for all user balances.
pub struct Ledger {
    accounts: HashMap<UserId, User>,
    by_username: HashMap<String, UserId>,
    conservation: CoinConservation,
}

impl Ledger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            by_username: HashMap::new(),
            conservation: CoinConservation::new(),
        }
    }

    /// Register a user with a starting balance. The seed is recorded for
    /// conservation checking.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the username is already taken.
    pub fn seed_user(&mut self, username: &str, coins: Coins) -> Result<UserId> {
        if self.by_username.contains_key(username) {
            return Err(BidhallError::InvalidInput {
                reason: format!("username {username} is taken"),
            });
        }
        let user = User::new(username, coins);
        let id = user.id;
        self.by_username.insert(username.to_string(), id);
        self.accounts.insert(id, user);
        self.conservation.record_seed(coins);
        Ok(id)
    }

    /// Resolve a username to a user id.
    ///
    /// # Errors
    /// Returns `UserNotFound` if the username does not resolve.
    pub fn resolve(&self, username: &str) -> Result<UserId> {
        self.by_username
            .get(username)
            .copied()
            .ok_or_else(|| BidhallError::UserNotFound(username.to_string()))
    }

    /// Look up a user record.
    ///
    /// # Errors
    /// Returns `UserNotFound` for an unknown id.
    pub fn user(&self, user_id: UserId) -> Result<&User> {
        self.accounts
            .get(&user_id)
            .ok_or_else(|| BidhallError::UserNotFound(user_id.to_string()))
    }

    /// Current spendable balance.
    ///
    /// # Errors
    /// Returns `UserNotFound` for an unknown id.
    pub fn balance(&self, user_id: UserId) -> Result<Coins> {
        self.user(user_id).map(|u| u.coins)
    }

    /// Atomically decrement a balance. Returns the new balance.
    ///
    /// # Errors
    /// - `UserNotFound` for an unknown id
    /// - `InsufficientFunds` if balance < amount (balance unchanged)
    pub fn debit(&mut self, user_id: UserId, amount: Coins) -> Result<Coins> {
        let account = self
            .accounts
            .get_mut(&user_id)
            .ok_or_else(|| BidhallError::UserNotFound(user_id.to_string()))?;
        let new_balance =
            account
                .coins
                .checked_sub(amount)
                .ok_or(BidhallError::InsufficientFunds {
                    needed: amount,
                    available: account.coins,
                })?;
        account.coins = new_balance;
        Ok(new_balance)
    }

    /// Atomically increment a balance. Returns the new balance.
    ///
    /// # Errors
    /// - `UserNotFound` for an unknown id
    /// - `BalanceOverflow` if the counter would wrap (balance unchanged)
    pub fn credit(&mut self, user_id: UserId, amount: Coins) -> Result<Coins> {
        let account = self
            .accounts
            .get_mut(&user_id)
            .ok_or_else(|| BidhallError::UserNotFound(user_id.to_string()))?;
        let new_balance = account
            .coins
            .checked_add(amount)
            .ok_or(BidhallError::BalanceOverflow { amount })?;
        account.coins = new_balance;
        Ok(new_balance)
    }

    /// Begin a staged transaction. Nothing touches the ledger until
    /// [`LedgerTxn::commit`].
    pub fn begin(&mut self) -> LedgerTxn<'_> {
        LedgerTxn::new(self)
    }

    /// Sum of all circulating balances.
    #[must_use]
    pub fn total_coins(&self) -> Coins {
        self.accounts.values().map(|u| u.coins).sum()
    }

    /// Number of registered users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.accounts.len()
    }

    /// Verify that circulating coins plus currently escrowed coins equal
    /// the seeded total.
    ///
    /// # Errors
    /// Returns `ConservationViolation` on drift.
    pub fn verify_conservation(&self, escrowed: Coins) -> Result<()> {
        self.conservation.verify(self.total_coins(), escrowed)
    }

    pub(crate) fn apply_committed(&mut self, user_id: UserId, balance: Coins) {
        if let Some(account) = self.accounts.get_mut(&user_id) {
            account.coins = balance;
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
