//! Error type for `canvass-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A write referenced a missing row, or input failed validation.
  #[error("core error: {0}")]
  Core(#[from] canvass_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl From<Error> for canvass_core::Error {
  /// Validation errors raised inside the store come back unchanged; the
  /// rest are persistence failures.
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => canvass_core::Error::store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
