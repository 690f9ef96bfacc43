//! System-wide constants for the BidHall auction core.

use crate::Coins;

/// Coins granted to a freshly seeded user.
pub const DEFAULT_STARTING_COINS: Coins = 100;

/// Maximum invitees in a single team batch.
pub const DEFAULT_MAX_INVITES_PER_BATCH: usize = 16;

/// Capacity of the broadcast channel behind the reference publisher.
/// Slow subscribers that lag past this lose events; delivery is
/// best-effort by design.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
