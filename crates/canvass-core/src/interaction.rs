//! Interactions, the append-only log of door visits.
//!
//! An address accumulates zero or more interactions. The latest one by
//! timestamp is its current visit state; earlier ones are history.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::volunteer::VolunteerId;

pub type AddressId = i64;
pub type InteractionId = i64;

// ─── Response ────────────────────────────────────────────────────────────────

/// The canonical set of door outcomes.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Response {
  Supportive,
  Leaning,
  Undecided,
  Opposed,
  NotHome,
  Inaccessible,
  Skipped,
  /// Contact made but no response chosen.
  #[strum(serialize = "")]
  #[serde(rename = "")]
  Unspecified,
}

impl Response {
  pub fn all() -> impl Iterator<Item = Response> { Self::iter() }

  /// The string stored in the `response_type` column.
  pub fn as_str(self) -> &'static str { self.into() }
}

/// A normalized `response_type`: one of the canonical [`Response`]s, or free
/// text carried over from older data entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseType {
  Known(Response),
  Unrecognized(String),
}

impl ResponseType {
  /// Lower-case, trim, and join inner whitespace or underscores with `-`,
  /// so the form label `"Not Home"` and the stored `"not-home"` agree.
  pub fn normalize(raw: &str) -> String {
    raw
      .trim()
      .to_lowercase()
      .replace('_', " ")
      .split_whitespace()
      .collect::<Vec<_>>()
      .join("-")
  }

  /// Normalize and classify raw input. Never fails.
  pub fn parse(raw: &str) -> Self {
    let normalized = Self::normalize(raw);
    match Response::from_str(&normalized) {
      Ok(known) => Self::Known(known),
      Err(_) => Self::Unrecognized(normalized),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Known(r) => r.as_str(),
      Self::Unrecognized(s) => s,
    }
  }

  pub fn known(&self) -> Option<Response> {
    match self {
      Self::Known(r) => Some(*r),
      Self::Unrecognized(_) => None,
    }
  }

  pub fn is_unrecognized(&self) -> bool { matches!(self, Self::Unrecognized(_)) }

  /// Empty responses are left out of the response breakdown.
  pub fn is_empty(&self) -> bool { self.as_str().is_empty() }
}

impl Default for ResponseType {
  fn default() -> Self { Self::Known(Response::Unspecified) }
}

impl From<Response> for ResponseType {
  fn from(r: Response) -> Self { Self::Known(r) }
}

impl From<String> for ResponseType {
  fn from(s: String) -> Self { Self::parse(&s) }
}

impl From<ResponseType> for String {
  fn from(r: ResponseType) -> Self { r.as_str().to_owned() }
}

impl fmt::Display for ResponseType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// What to do with a `response_type` outside the canonical set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePolicy {
  /// Store the normalized text and flag it.
  #[default]
  Permissive,
  /// Reject with a validation error.
  Strict,
}

// ─── Interaction ─────────────────────────────────────────────────────────────

/// One recorded door visit. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
  pub id:                 InteractionId,
  pub address_id:         AddressId,
  pub volunteer_id:       VolunteerId,
  /// Store-assigned.
  pub timestamp:          DateTime<Utc>,
  pub resident_name:      String,
  pub response_type:      ResponseType,
  pub yard_sign:          String,
  pub volunteer_interest: String,
  pub notes:              String,
}

/// An interaction joined with the volunteer's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
  #[serde(flatten)]
  pub interaction:    Interaction,
  pub volunteer_name: String,
}

/// The form a volunteer fills in at the door. Every field is optional on
/// the wire and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionFields {
  pub resident_name:      String,
  pub response_type:      String,
  pub yard_sign:          String,
  pub volunteer_interest: String,
  pub notes:              String,
}

impl InteractionFields {
  /// The shape produced by the "Not Home" and "Skip" buttons: a fixed
  /// response and nothing else.
  pub fn quick(response: Response) -> Self {
    Self { response_type: response.as_str().to_owned(), ..Self::default() }
  }
}

/// Input to [`crate::store::CanvassStore::insert_interaction`].
/// `id` and `timestamp` are always set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInteraction {
  pub address_id:         AddressId,
  pub volunteer_id:       VolunteerId,
  pub resident_name:      String,
  pub response_type:      ResponseType,
  pub yard_sign:          String,
  pub volunteer_interest: String,
  pub notes:              String,
}

impl NewInteraction {
  pub fn new(
    address_id: AddressId,
    volunteer_id: VolunteerId,
    response_type: ResponseType,
    fields: InteractionFields,
  ) -> Self {
    Self {
      address_id,
      volunteer_id,
      resident_name: fields.resident_name,
      response_type,
      yard_sign: fields.yard_sign,
      volunteer_interest: fields.volunteer_interest,
      notes: fields.notes,
    }
  }
}
