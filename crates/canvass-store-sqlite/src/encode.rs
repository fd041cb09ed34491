//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 strings with microseconds, so text
//! order is time order. Occupancy is stored as `Yes`/`No`.

use canvass_core::{
  interaction::{Interaction, InteractionRecord, ResponseType},
  precinct::{Address, Precinct},
  volunteer::Volunteer,
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Occupancy ───────────────────────────────────────────────────────────────

pub fn encode_occupied(owner_occupied: bool) -> &'static str {
  if owner_occupied { "Yes" } else { "No" }
}

/// Anything other than a yes-like value reads as not owner occupied.
pub fn decode_occupied(s: &str) -> bool {
  matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "y" | "true" | "1")
}

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn encode_count(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

pub fn decode_count(n: i64) -> u64 { u64::try_from(n).unwrap_or(0) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PRECINCT_COLUMNS: &str =
  "id, name, total_addresses, owner_occupied, non_owner_occupied";

pub struct RawPrecinct {
  pub id:                 String,
  pub name:               String,
  pub total_addresses:    i64,
  pub owner_occupied:     i64,
  pub non_owner_occupied: i64,
}

impl RawPrecinct {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get(0)?,
      name:               row.get(1)?,
      total_addresses:    row.get(2)?,
      owner_occupied:     row.get(3)?,
      non_owner_occupied: row.get(4)?,
    })
  }

  pub fn into_precinct(self) -> Precinct {
    Precinct {
      id:                 self.id,
      name:               self.name,
      total_addresses:    decode_count(self.total_addresses),
      owner_occupied:     decode_count(self.owner_occupied),
      non_owner_occupied: decode_count(self.non_owner_occupied),
    }
  }
}

pub const ADDRESS_COLUMNS: &str = "id, precinct_id, owner1, owner2, street_number, street_name, \
                                   unit, city_zip, zip_code, property_type, owner_occupied, \
                                   latitude, longitude";

/// Raw values read directly from an `addresses` row.
pub struct RawAddress {
  pub id:             i64,
  pub precinct_id:    String,
  pub owner1:         String,
  pub owner2:         String,
  pub street_number:  Option<i64>,
  pub street_name:    String,
  pub unit:           String,
  pub city_zip:       String,
  pub zip_code:       String,
  pub property_type:  String,
  pub owner_occupied: String,
  pub latitude:       Option<f64>,
  pub longitude:      Option<f64>,
}

impl RawAddress {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      precinct_id:    row.get(1)?,
      owner1:         row.get(2)?,
      owner2:         row.get(3)?,
      street_number:  row.get(4)?,
      street_name:    row.get(5)?,
      unit:           row.get(6)?,
      city_zip:       row.get(7)?,
      zip_code:       row.get(8)?,
      property_type:  row.get(9)?,
      owner_occupied: row.get(10)?,
      latitude:       row.get(11)?,
      longitude:      row.get(12)?,
    })
  }

  pub fn into_address(self) -> Address {
    Address {
      id:             self.id,
      precinct_id:    self.precinct_id,
      owner1:         self.owner1,
      owner2:         self.owner2,
      street_number:  self.street_number,
      street_name:    self.street_name,
      unit:           self.unit,
      city_zip:       self.city_zip,
      zip_code:       self.zip_code,
      property_type:  self.property_type,
      owner_occupied: decode_occupied(&self.owner_occupied),
      latitude:       self.latitude,
      longitude:      self.longitude,
    }
  }
}

/// An `interactions` row joined with the volunteer's name.
pub struct RawInteraction {
  pub id:                 i64,
  pub address_id:         i64,
  pub volunteer_id:       i64,
  pub timestamp:          String,
  pub resident_name:      String,
  pub response_type:      String,
  pub yard_sign:          String,
  pub volunteer_interest: String,
  pub notes:              String,
  pub volunteer_name:     String,
}

impl RawInteraction {
  pub fn into_record(self) -> Result<InteractionRecord> {
    Ok(InteractionRecord {
      interaction:    Interaction {
        id:                 self.id,
        address_id:         self.address_id,
        volunteer_id:       self.volunteer_id,
        timestamp:          decode_dt(&self.timestamp)?,
        resident_name:      self.resident_name,
        response_type:      ResponseType::parse(&self.response_type),
        yard_sign:          self.yard_sign,
        volunteer_interest: self.volunteer_interest,
        notes:              self.notes,
      },
      volunteer_name: self.volunteer_name,
    })
  }
}

pub struct RawVolunteer {
  pub id:         i64,
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub created_at: String,
}

impl RawVolunteer {
  pub fn into_volunteer(self) -> Result<Volunteer> {
    Ok(Volunteer {
      id:         self.id,
      name:       self.name,
      email:      self.email,
      phone:      self.phone,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
