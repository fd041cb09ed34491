//! Seeding an empty store with sample reference data.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  Error, Result,
  precinct::{NewAddress, Precinct},
  store::CanvassStore,
};

/// A source of precincts and their addresses.
pub trait DemoDataProvider {
  fn precincts(&self) -> Vec<Precinct>;

  /// Addresses for `precinct`. The returned `precinct_id`s are overwritten
  /// with `precinct.id` on insert.
  fn addresses(&self, precinct: &Precinct) -> Vec<NewAddress>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSummary {
  pub precincts: usize,
  pub addresses: usize,
}

/// Seed `store` from `provider` if it holds no precincts yet.
///
/// Returns `None` when the store already had data. The whole district is
/// written in one store transaction, so a failure leaves the store empty and
/// the next call seeds from scratch.
pub async fn seed_if_empty<S, P>(store: &S, provider: &P) -> Result<Option<SeedSummary>>
where
  S: CanvassStore,
  P: DemoDataProvider + ?Sized,
{
  if !store.get_precincts().await.map_err(Into::<Error>::into)?.is_empty() {
    return Ok(None);
  }

  let mut summary = SeedSummary { precincts: 0, addresses: 0 };
  let mut data = Vec::new();
  for precinct in provider.precincts() {
    if !precinct.totals_consistent() {
      warn!(
        precinct_id = %precinct.id,
        total = precinct.total_addresses,
        owner_occupied = precinct.owner_occupied,
        non_owner_occupied = precinct.non_owner_occupied,
        "precinct occupancy totals do not add up"
      );
    }

    let mut addresses = provider.addresses(&precinct);
    for address in &mut addresses {
      address.precinct_id.clone_from(&precinct.id);
    }
    summary.precincts += 1;
    summary.addresses += addresses.len();
    data.push((precinct, addresses));
  }

  // Another writer may have seeded between the check and here.
  if !store.seed_reference_data(data).await.map_err(Into::<Error>::into)? {
    return Ok(None);
  }

  info!(
    precincts = summary.precincts,
    addresses = summary.addresses,
    "seeded demo data"
  );
  Ok(Some(summary))
}
