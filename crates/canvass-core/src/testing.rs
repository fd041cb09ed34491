//! In-memory [`CanvassStore`] used by the unit tests in this crate.

use std::{
  collections::BTreeMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::Utc;
use thiserror::Error;

use crate::{
  interaction::{
    AddressId, Interaction, InteractionId, InteractionRecord, NewInteraction, ResponseType,
  },
  precinct::{Address, NewAddress, Precinct},
  stats::{CoverageCounts, PrecinctCounts},
  store::CanvassStore,
  volunteer::{NewVolunteer, Volunteer, VolunteerId},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("injected failure")]
  Injected,
  #[error("address not found: {0}")]
  AddressNotFound(AddressId),
  #[error("volunteer not found: {0}")]
  VolunteerNotFound(VolunteerId),
}

impl From<MemoryError> for crate::Error {
  fn from(e: MemoryError) -> Self {
    match e {
      MemoryError::AddressNotFound(id) => Self::AddressNotFound(id),
      MemoryError::VolunteerNotFound(id) => Self::VolunteerNotFound(id),
      MemoryError::Injected => Self::store(e),
    }
  }
}

#[derive(Default)]
struct Inner {
  precincts:    BTreeMap<String, Precinct>,
  addresses:    Vec<Address>,
  interactions: Vec<Interaction>,
  volunteers:   Vec<Volunteer>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner:         Mutex<Inner>,
  fail_next:     AtomicBool,
  fail_precinct: Mutex<Option<String>>,
}

impl MemoryStore {
  /// Make the next store call fail with [`MemoryError::Injected`].
  pub fn fail_next_call(&self) { self.fail_next.store(true, Ordering::SeqCst); }

  /// Make the next seed fail once it reaches precinct `id`.
  pub fn fail_on_precinct(&self, id: &str) {
    *self
      .fail_precinct
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(id.to_owned());
  }

  pub fn interaction_count(&self) -> usize { self.lock().interactions.len() }

  fn check(&self) -> Result<(), MemoryError> {
    if self.fail_next.swap(false, Ordering::SeqCst) {
      return Err(MemoryError::Injected);
    }
    Ok(())
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl CanvassStore for MemoryStore {
  type Error = MemoryError;

  async fn create_schema(&self) -> Result<(), MemoryError> { self.check() }

  async fn get_precincts(&self) -> Result<Vec<Precinct>, MemoryError> {
    self.check()?;
    Ok(self.lock().precincts.values().cloned().collect())
  }

  async fn get_precinct(&self, id: &str) -> Result<Option<Precinct>, MemoryError> {
    self.check()?;
    Ok(self.lock().precincts.get(id).cloned())
  }

  async fn insert_precinct(&self, precinct: Precinct) -> Result<(), MemoryError> {
    self.check()?;
    self.lock().precincts.insert(precinct.id.clone(), precinct);
    Ok(())
  }

  async fn get_addresses(&self, precinct_id: &str) -> Result<Vec<Address>, MemoryError> {
    self.check()?;
    let mut out: Vec<Address> = self
      .lock()
      .addresses
      .iter()
      .filter(|a| a.precinct_id == precinct_id)
      .cloned()
      .collect();
    out.sort_by(Address::cmp_by_street);
    Ok(out)
  }

  async fn get_address(&self, id: AddressId) -> Result<Option<Address>, MemoryError> {
    self.check()?;
    Ok(self.lock().addresses.iter().find(|a| a.id == id).cloned())
  }

  async fn insert_address(&self, input: NewAddress) -> Result<AddressId, MemoryError> {
    self.check()?;
    let mut inner = self.lock();
    let id = inner.addresses.len() as AddressId + 1;
    inner.addresses.push(input.into_address(id));
    Ok(id)
  }

  async fn seed_reference_data(
    &self,
    data: Vec<(Precinct, Vec<NewAddress>)>,
  ) -> Result<bool, MemoryError> {
    self.check()?;
    let fail_at = self
      .fail_precinct
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .take();
    let mut inner = self.lock();
    if !inner.precincts.is_empty() {
      return Ok(false);
    }

    let mut precincts = BTreeMap::new();
    let mut addresses = inner.addresses.clone();
    for (precinct, list) in data {
      if fail_at.as_deref() == Some(precinct.id.as_str()) {
        return Err(MemoryError::Injected);
      }
      for input in list {
        let id = addresses.len() as AddressId + 1;
        addresses.push(input.into_address(id));
      }
      precincts.insert(precinct.id.clone(), precinct);
    }
    inner.precincts = precincts;
    inner.addresses = addresses;
    Ok(true)
  }

  async fn get_interactions(
    &self,
    address_id: AddressId,
  ) -> Result<Vec<InteractionRecord>, MemoryError> {
    self.check()?;
    let inner = self.lock();
    let mut out: Vec<InteractionRecord> = inner
      .interactions
      .iter()
      .filter(|i| i.address_id == address_id)
      .map(|i| InteractionRecord {
        interaction:    i.clone(),
        volunteer_name: inner
          .volunteers
          .iter()
          .find(|v| v.id == i.volunteer_id)
          .map(|v| v.name.clone())
          .unwrap_or_default(),
      })
      .collect();
    out.sort_by(|a, b| {
      (b.interaction.timestamp, b.interaction.id).cmp(&(a.interaction.timestamp, a.interaction.id))
    });
    Ok(out)
  }

  async fn latest_responses(
    &self,
    precinct_id: &str,
  ) -> Result<Vec<(AddressId, ResponseType)>, MemoryError> {
    self.check()?;
    let inner = self.lock();
    let mut latest: BTreeMap<AddressId, &Interaction> = BTreeMap::new();
    for i in &inner.interactions {
      let in_precinct = inner
        .addresses
        .iter()
        .any(|a| a.id == i.address_id && a.precinct_id == precinct_id);
      if !in_precinct {
        continue;
      }
      let newer = latest
        .get(&i.address_id)
        .is_none_or(|cur| (i.timestamp, i.id) > (cur.timestamp, cur.id));
      if newer {
        latest.insert(i.address_id, i);
      }
    }
    Ok(
      latest
        .into_iter()
        .map(|(id, i)| (id, i.response_type.clone()))
        .collect(),
    )
  }

  async fn insert_interaction(
    &self,
    input: NewInteraction,
  ) -> Result<InteractionId, MemoryError> {
    self.check()?;
    let mut inner = self.lock();
    if !inner.addresses.iter().any(|a| a.id == input.address_id) {
      return Err(MemoryError::AddressNotFound(input.address_id));
    }
    if !inner.volunteers.iter().any(|v| v.id == input.volunteer_id) {
      return Err(MemoryError::VolunteerNotFound(input.volunteer_id));
    }
    let id = inner.interactions.len() as InteractionId + 1;
    inner.interactions.push(Interaction {
      id,
      address_id: input.address_id,
      volunteer_id: input.volunteer_id,
      timestamp: Utc::now(),
      resident_name: input.resident_name,
      response_type: input.response_type,
      yard_sign: input.yard_sign,
      volunteer_interest: input.volunteer_interest,
      notes: input.notes,
    });
    Ok(id)
  }

  async fn find_or_create_volunteer(
    &self,
    input: NewVolunteer,
  ) -> Result<VolunteerId, MemoryError> {
    self.check()?;
    let mut inner = self.lock();
    if let Some(v) = inner.volunteers.iter().find(|v| v.name == input.name) {
      return Ok(v.id);
    }
    let id = inner.volunteers.len() as VolunteerId + 1;
    inner.volunteers.push(Volunteer {
      id,
      name: input.name,
      email: input.email,
      phone: input.phone,
      created_at: Utc::now(),
    });
    Ok(id)
  }

  async fn get_volunteer(&self, id: VolunteerId) -> Result<Option<Volunteer>, MemoryError> {
    self.check()?;
    Ok(self.lock().volunteers.iter().find(|v| v.id == id).cloned())
  }

  async fn coverage_counts(&self) -> Result<CoverageCounts, MemoryError> {
    self.check()?;
    let inner = self.lock();
    let contacted = |filter: &dyn Fn(AddressId) -> bool| {
      let mut ids: Vec<AddressId> = inner
        .interactions
        .iter()
        .map(|i| i.address_id)
        .filter(|id| filter(*id))
        .collect();
      ids.sort_unstable();
      ids.dedup();
      ids.len() as u64
    };

    let mut response_breakdown = BTreeMap::new();
    for i in &inner.interactions {
      if !i.response_type.is_empty() {
        *response_breakdown
          .entry(i.response_type.as_str().to_owned())
          .or_insert(0) += 1;
      }
    }

    let precincts = inner
      .precincts
      .values()
      .map(|p| {
        let in_precinct = |id: AddressId| {
          inner
            .addresses
            .iter()
            .any(|a| a.id == id && a.precinct_id == p.id)
        };
        PrecinctCounts {
          id:                  p.id.clone(),
          name:                p.name.clone(),
          total_addresses:     p.total_addresses,
          loaded_addresses:    inner
            .addresses
            .iter()
            .filter(|a| a.precinct_id == p.id)
            .count() as u64,
          addresses_contacted: contacted(&in_precinct),
        }
      })
      .collect();

    Ok(CoverageCounts {
      total_interactions: inner.interactions.len() as u64,
      addresses_contacted: contacted(&|_| true),
      total_addresses: inner.addresses.len() as u64,
      response_breakdown,
      precincts,
    })
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// Add a precinct with `n` geocoded addresses on MAIN ST, inserted in
/// reverse walking order. Returns the address ids in insertion order.
pub async fn add_precinct(store: &MemoryStore, id: &str, n: u64) -> Vec<AddressId> {
  store
    .insert_precinct(Precinct {
      id:                 id.into(),
      name:               format!("Precinct {id}"),
      total_addresses:    n,
      owner_occupied:     n,
      non_owner_occupied: 0,
    })
    .await
    .unwrap();

  let mut ids = Vec::new();
  for i in (0..n).rev() {
    let id = store
      .insert_address(NewAddress {
        precinct_id: id.into(),
        owner1: format!("SMITH, JOHN {i}"),
        street_number: Some(100 + i as i64 * 10),
        street_name: "MAIN ST".into(),
        city_zip: "ST PETERSBURG, FL 33701".into(),
        zip_code: "33701".into(),
        property_type: "Single Family".into(),
        owner_occupied: true,
        latitude: Some(27.77 + i as f64 * 0.001),
        longitude: Some(-82.64),
        ..NewAddress::default()
      })
      .await
      .unwrap();
    ids.push(id);
  }
  ids
}

/// One precinct `"123"` with three addresses and one volunteer.
pub async fn seeded_store() -> (MemoryStore, VolunteerId, Vec<AddressId>) {
  let store = MemoryStore::default();
  let ids = add_precinct(&store, "123", 3).await;
  let volunteer = store
    .find_or_create_volunteer(NewVolunteer::named("Jane Doe"))
    .await
    .unwrap();
  (store, volunteer, ids)
}
