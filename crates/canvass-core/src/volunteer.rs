//! Volunteers: the people knocking on doors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type VolunteerId = i64;

/// A canvassing volunteer. Created on first use; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
  pub id:         VolunteerId,
  /// Lookup key for find-or-create. Compared exactly, including case.
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::CanvassStore::find_or_create_volunteer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVolunteer {
  pub name:  String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
}

impl NewVolunteer {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  /// A name made only of whitespace cannot identify anyone.
  pub fn validate(&self) -> crate::Result<()> {
    if self.name.trim().is_empty() {
      return Err(crate::Error::BlankVolunteerName);
    }
    Ok(())
  }
}
