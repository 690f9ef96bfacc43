//! # bidhall-ledger
//!
//! Coin balances for auction participants. The ledger is the **only**
//! place balances are mutated: settlement logic debits and credits
//! through it and never touches the numbers directly.
//!
//! ## Atomicity
//!
//! Single operations are check-then-mutate: either the full operation
//! succeeds or the balance is unchanged. Multi-operation settlements
//! (outbid refund + new debit, or a whole-team debit) go through a
//! [`LedgerTxn`]: operations are staged against shadow balances and hit
//! the ledger only at commit. Dropping the transaction discards every
//! staged operation — rollback is free, never compensating.
//!
//! ## Conservation
//!
//! [`CoinConservation`] tracks coins entering the system via seeding.
//! At any instant, circulating balances plus escrowed bid amounts must
//! equal the seeded total; no bid/refund cycle creates or destroys coins.

pub mod conservation;
pub mod ledger;
pub mod txn;

pub use conservation::CoinConservation;
pub use ledger::Ledger;
pub use txn::LedgerTxn;
