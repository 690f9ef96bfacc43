//! Staged ledger transactions.
//!
//! Every ledger movement belonging to one logical settlement — an
//! outbid refund plus the new debit, or a whole-team debit — must land
//! together or not at all. A [`LedgerTxn`] stages debits and credits
//! against shadow balances; [`LedgerTxn::commit`] writes them back in
//! one pass and cannot fail. A transaction dropped without commit
//! leaves the ledger untouched.

use std::collections::HashMap;

use bidhall_types::{BidhallError, Coins, Result, UserId};

use crate::ledger::Ledger;

/// An in-flight ledger transaction. Holds the ledger exclusively, so no
/// other operation can interleave with the staged state.
pub struct LedgerTxn<'a> {
    ledger: &'a mut Ledger,
    shadow: HashMap<UserId, Coins>,
}

impl<'a> LedgerTxn<'a> {
    pub(crate) fn new(ledger: &'a mut Ledger) -> Self {
        Self {
            ledger,
            shadow: HashMap::new(),
        }
    }

    /// The balance this transaction currently sees for a user: staged if
    /// touched, committed otherwise.
    ///
    /// # Errors
    /// Returns `UserNotFound` for an unknown id.
    pub fn balance(&self, user_id: UserId) -> Result<Coins> {
        match self.shadow.get(&user_id) {
            Some(balance) => Ok(*balance),
            None => self.ledger.balance(user_id),
        }
    }

    /// Stage a debit. Returns the staged new balance.
    ///
    /// # Errors
    /// - `UserNotFound` for an unknown id
    /// - `InsufficientFunds` if the staged balance cannot cover it; the
    ///   transaction remains usable and nothing is applied
    pub fn debit(&mut self, user_id: UserId, amount: Coins) -> Result<Coins> {
        let current = self.balance(user_id)?;
        let staged = current
            .checked_sub(amount)
            .ok_or(BidhallError::InsufficientFunds {
                needed: amount,
                available: current,
            })?;
        self.shadow.insert(user_id, staged);
        Ok(staged)
    }

    /// Stage a credit. Returns the staged new balance.
    ///
    /// # Errors
    /// - `UserNotFound` for an unknown id
    /// - `BalanceOverflow` if the counter would wrap
    pub fn credit(&mut self, user_id: UserId, amount: Coins) -> Result<Coins> {
        let current = self.balance(user_id)?;
        let staged = current
            .checked_add(amount)
            .ok_or(BidhallError::BalanceOverflow { amount })?;
        self.shadow.insert(user_id, staged);
        Ok(staged)
    }

    /// Number of accounts touched so far.
    #[must_use]
    pub fn touched(&self) -> usize {
        self.shadow.len()
    }

    /// Apply every staged balance to the ledger. Infallible: all checks
    /// happened at staging time.
    pub fn commit(self) {
        let count = self.shadow.len();
        for (user_id, balance) in self.shadow {
            self.ledger.apply_committed(user_id, balance);
        }
        tracing::debug!(accounts = count, "Ledger transaction committed");
    }
}
