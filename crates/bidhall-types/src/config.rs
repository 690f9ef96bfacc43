//! Configuration for seeding and running an auction instance.

use serde::{Deserialize, Serialize};

use crate::{constants, Coins};

/// A permit to create at catalog seeding time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermitSeed {
    pub name: String,
    pub description: String,
}

impl PermitSeed {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Configuration for one auction instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Balance granted to each seeded user.
    pub starting_coins: Coins,
    /// Upper bound on invitees per team batch.
    pub max_invites_per_batch: usize,
    /// Permits created at seeding.
    pub catalog: Vec<PermitSeed>,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            starting_coins: constants::DEFAULT_STARTING_COINS,
            max_invites_per_batch: constants::DEFAULT_MAX_INVITES_PER_BATCH,
            catalog: Vec::new(),
        }
    }
}

impl AuctionConfig {
    /// The stock demo catalog: four shop permits.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            catalog: vec![
                PermitSeed::new("Fireworks Emporium", "Fireworks for celebrations."),
                PermitSeed::new("Wood Block Depot", "All types of wood blocks."),
                PermitSeed::new("Redstone Engineer", "Redstone components and contraptions."),
                PermitSeed::new("Armory", "Weapons and armor."),
            ],
            ..Self::default()
        }
    }
}
