//! Catalog seeding.

use bidhall_types::{AuctionConfig, Permit, PermitId};

use crate::store::BidStore;

/// Create every permit named in the config. Returns the new ids in
/// catalog order.
pub fn seed(store: &mut BidStore, config: &AuctionConfig) -> Vec<PermitId> {
    let ids: Vec<PermitId> = config
        .catalog
        .iter()
        .map(|seed| store.add_permit(Permit::new(&seed.name, &seed.description)))
        .collect();
    tracing::info!(permits = ids.len(), "Catalog seeded");
    ids
}
