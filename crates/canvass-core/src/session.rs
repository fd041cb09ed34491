//! The canvassing session: one volunteer's working set for one precinct.
//!
//! A session is an explicit context object owned by its caller. It holds the
//! loaded address list (in display order) and the visit state accumulated
//! since the precinct was selected. Nothing here is persisted; the store only
//! ever sees interactions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, Result,
  interaction::{AddressId, ResponseType},
  precinct::{Address, LatLon},
  store::CanvassStore,
  volunteer::VolunteerId,
};

// ─── Visit state ─────────────────────────────────────────────────────────────

/// Which addresses have been resolved, and with what response.
///
/// An address is visited if and only if it has an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitState {
  resolved: HashMap<AddressId, ResponseType>,
}

impl VisitState {
  /// Build a state from `(address, latest response)` pairs, e.g. the
  /// output of [`CanvassStore::latest_responses`].
  pub fn from_latest(latest: impl IntoIterator<Item = (AddressId, ResponseType)>) -> Self {
    Self { resolved: latest.into_iter().collect() }
  }

  pub fn is_visited(&self, id: AddressId) -> bool { self.resolved.contains_key(&id) }

  pub fn response(&self, id: AddressId) -> Option<&ResponseType> { self.resolved.get(&id) }

  /// Record a resolution; a later one replaces an earlier one.
  pub fn resolve(&mut self, id: AddressId, response: ResponseType) {
    self.resolved.insert(id, response);
  }

  pub fn len(&self) -> usize { self.resolved.len() }

  pub fn is_empty(&self) -> bool { self.resolved.is_empty() }

  fn clear(&mut self) { self.resolved.clear(); }
}

// ─── Session state machine ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
  /// No precinct chosen.
  Unselected,
  /// Precinct chosen, nothing resolved yet.
  Loaded,
  /// At least one address resolved.
  InProgress,
}

/// How to order the loaded address list. Ordering is presentational only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum SortCriterion {
  /// Street name, then house number.
  Name,
  /// Nearest first from `origin`; addresses without coordinates go last.
  Distance { origin: LatLon },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
  pub total:      usize,
  pub visited:    usize,
  pub remaining:  usize,
  pub percentage: f64,
}

/// One row of the walking list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressEntry {
  #[serde(flatten)]
  pub address:  Address,
  pub visited:  bool,
  pub response: Option<ResponseType>,
}

/// Everything the presentation layer needs to redraw the canvassing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
  pub volunteer_id: VolunteerId,
  pub precinct_id:  Option<String>,
  pub state:        SessionState,
  pub progress:     Progress,
  pub addresses:    Vec<AddressEntry>,
}

#[derive(Debug, Clone)]
pub struct CanvassSession {
  volunteer_id: VolunteerId,
  precinct_id:  Option<String>,
  addresses:    Vec<Address>,
  visits:       VisitState,
}

impl CanvassSession {
  /// A fresh session in the [`SessionState::Unselected`] state.
  pub fn new(volunteer_id: VolunteerId) -> Self {
    Self {
      volunteer_id,
      precinct_id: None,
      addresses: Vec::new(),
      visits: VisitState::default(),
    }
  }

  pub fn volunteer_id(&self) -> VolunteerId { self.volunteer_id }

  pub fn precinct_id(&self) -> Option<&str> { self.precinct_id.as_deref() }

  pub fn addresses(&self) -> &[Address] { &self.addresses }

  pub fn visits(&self) -> &VisitState { &self.visits }

  pub fn contains(&self, address_id: AddressId) -> bool {
    self.addresses.iter().any(|a| a.id == address_id)
  }

  pub fn state(&self) -> SessionState {
    match (&self.precinct_id, self.visits.is_empty()) {
      (None, _) => SessionState::Unselected,
      (Some(_), true) => SessionState::Loaded,
      (Some(_), false) => SessionState::InProgress,
    }
  }

  /// Switch to precinct `id`.
  ///
  /// Only a different id reloads the address list and clears the visit
  /// state; re-selecting the current precinct keeps work in progress.
  /// Returns whether a reload happened. On a store error the session is
  /// left exactly as it was.
  pub async fn select_precinct<S: CanvassStore>(&mut self, store: &S, id: &str) -> Result<bool> {
    if self.precinct_id.as_deref() == Some(id) {
      return Ok(false);
    }

    let addresses = store.get_addresses(id).await.map_err(Into::<Error>::into)?;
    debug!(
      volunteer_id = self.volunteer_id,
      precinct_id = id,
      addresses = addresses.len(),
      "precinct selected"
    );

    self.precinct_id = Some(id.to_owned());
    self.addresses = addresses;
    self.visits.clear();
    Ok(true)
  }

  /// Mark `address_id` as resolved with `response`.
  ///
  /// Fails with [`Error::AddressNotLoaded`] if the address is not in the
  /// loaded list; the session is unchanged in that case.
  pub fn resolve(&mut self, address_id: AddressId, response: ResponseType) -> Result<()> {
    if !self.contains(address_id) {
      return Err(Error::AddressNotLoaded(address_id));
    }
    debug!(volunteer_id = self.volunteer_id, address_id, %response, "address resolved");
    self.visits.resolve(address_id, response);
    Ok(())
  }

  /// Stable re-order by street name then number. Idempotent.
  pub fn sort_by_name(&mut self) { self.addresses.sort_by(Address::cmp_by_street); }

  pub fn sort(&mut self, criterion: SortCriterion) {
    match criterion {
      SortCriterion::Name => self.sort_by_name(),
      SortCriterion::Distance { origin } => {
        self.addresses.sort_by(|a, b| {
          let da = a.position().map(|p| origin.approx_distance_sq(&p));
          let db = b.position().map(|p| origin.approx_distance_sq(&p));
          match (da, db) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
          }
        });
      }
    }
  }

  pub fn progress(&self) -> Progress {
    let total = self.addresses.len();
    let visited = self
      .addresses
      .iter()
      .filter(|a| self.visits.is_visited(a.id))
      .count();
    let percentage = if total == 0 {
      0.0
    } else {
      (visited as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    };
    Progress { total, visited, remaining: total - visited, percentage }
  }

  pub fn view(&self) -> SessionView {
    SessionView {
      volunteer_id: self.volunteer_id,
      precinct_id:  self.precinct_id.clone(),
      state:        self.state(),
      progress:     self.progress(),
      addresses:    self
        .addresses
        .iter()
        .map(|a| AddressEntry {
          address:  a.clone(),
          visited:  self.visits.is_visited(a.id),
          response: self.visits.response(a.id).cloned(),
        })
        .collect(),
    }
  }
}
