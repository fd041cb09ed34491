//! Error types for `canvass-core`.

use thiserror::Error;

use crate::{interaction::AddressId, volunteer::VolunteerId};

/// Broad classification of an [`Error`], used by presentation layers to pick
/// a status code without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed or referentially-invalid input; nothing was written.
  Validation,
  /// The operation named an id outside the current scope.
  NotFound,
  /// The underlying store failed.
  Store,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("address not found: {0}")]
  AddressNotFound(AddressId),

  #[error("volunteer not found: {0}")]
  VolunteerNotFound(VolunteerId),

  #[error("volunteer name must not be blank")]
  BlankVolunteerName,

  #[error("unrecognized response type: {0:?}")]
  UnrecognizedResponse(String),

  #[error("address {0} is not in the loaded precinct")]
  AddressNotLoaded(AddressId),

  #[error("no precinct is selected")]
  NoPrecinctSelected,

  #[error("precinct not found: {0}")]
  PrecinctNotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::AddressNotFound(_)
      | Self::VolunteerNotFound(_)
      | Self::BlankVolunteerName
      | Self::UnrecognizedResponse(_) => ErrorKind::Validation,
      Self::AddressNotLoaded(_)
      | Self::NoPrecinctSelected
      | Self::PrecinctNotFound(_) => ErrorKind::NotFound,
      Self::Store(_) => ErrorKind::Store,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
