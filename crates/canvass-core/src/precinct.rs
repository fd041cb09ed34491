//! Precincts and the addresses inside them.
//!
//! Both are reference data: seeded once and never edited by canvassing.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::interaction::AddressId;

// ─── Geometry ────────────────────────────────────────────────────────────────

/// A WGS-84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
  pub lat: f64,
  pub lon: f64,
}

impl LatLon {
  pub fn new(lat: f64, lon: f64) -> Self { Self { lat, lon } }

  /// Squared planar distance in an equirectangular projection around the
  /// midpoint latitude. Good enough to order doors within a precinct.
  pub fn approx_distance_sq(&self, other: &LatLon) -> f64 {
    let mid_lat = ((self.lat + other.lat) / 2.0).to_radians();
    let dx = (other.lon - self.lon).to_radians() * mid_lat.cos();
    let dy = (other.lat - self.lat).to_radians();
    dx * dx + dy * dy
  }
}

// ─── Precinct ────────────────────────────────────────────────────────────────

/// A fixed geographic voting district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precinct {
  pub id:                 String,
  pub name:               String,
  /// Reference count from the voter file, not the number of loaded rows.
  pub total_addresses:    u64,
  pub owner_occupied:     u64,
  pub non_owner_occupied: u64,
}

impl Precinct {
  /// Whether `total_addresses = owner_occupied + non_owner_occupied`.
  /// Expected of seeded data but not enforced.
  pub fn totals_consistent(&self) -> bool {
    self.owner_occupied.checked_add(self.non_owner_occupied)
      == Some(self.total_addresses)
  }
}

// ─── Address ─────────────────────────────────────────────────────────────────

/// A single property record. Belongs to exactly one precinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
  pub id:             AddressId,
  pub precinct_id:    String,
  pub owner1:         String,
  pub owner2:         String,
  pub street_number:  Option<i64>,
  pub street_name:    String,
  pub unit:           String,
  /// City, state and zip as printed on the parcel record.
  pub city_zip:       String,
  pub zip_code:       String,
  pub property_type:  String,
  pub owner_occupied: bool,
  pub latitude:       Option<f64>,
  pub longitude:      Option<f64>,
}

impl Address {
  /// Both coordinates, if the address has been geocoded.
  pub fn position(&self) -> Option<LatLon> {
    match (self.latitude, self.longitude) {
      (Some(lat), Some(lon)) => Some(LatLon { lat, lon }),
      _ => None,
    }
  }

  /// `"<number> <street>[ <unit>]"`.
  pub fn street_line(&self) -> String {
    let mut line = match self.street_number {
      Some(n) => format!("{n} {}", self.street_name),
      None => self.street_name.clone(),
    };
    if !self.unit.is_empty() {
      line.push(' ');
      line.push_str(&self.unit);
    }
    line
  }

  /// Walking-list order: street name, then house number.
  pub fn cmp_by_street(&self, other: &Self) -> Ordering {
    self
      .street_name
      .cmp(&other.street_name)
      .then_with(|| self.street_number.cmp(&other.street_number))
  }
}

/// Input to [`crate::store::CanvassStore::insert_address`]; the id is
/// assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
  pub precinct_id:    String,
  pub owner1:         String,
  pub owner2:         String,
  pub street_number:  Option<i64>,
  pub street_name:    String,
  pub unit:           String,
  pub city_zip:       String,
  pub zip_code:       String,
  pub property_type:  String,
  pub owner_occupied: bool,
  pub latitude:       Option<f64>,
  pub longitude:      Option<f64>,
}

impl NewAddress {
  /// Attach a store-assigned id.
  pub fn into_address(self, id: AddressId) -> Address {
    Address {
      id,
      precinct_id: self.precinct_id,
      owner1: self.owner1,
      owner2: self.owner2,
      street_number: self.street_number,
      street_name: self.street_name,
      unit: self.unit,
      city_zip: self.city_zip,
      zip_code: self.zip_code,
      property_type: self.property_type,
      owner_occupied: self.owner_occupied,
      latitude: self.latitude,
      longitude: self.longitude,
    }
  }
}
