//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use canvass_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error through [`canvass_core::Error`], so validation
  /// failures raised by the store still map to 400.
  pub fn store<E>(e: E) -> Self
  where
    E: Into<canvass_core::Error>,
  {
    Self::from(e.into())
  }
}

impl From<canvass_core::Error> for ApiError {
  fn from(e: canvass_core::Error) -> Self {
    match e.kind() {
      ErrorKind::Validation => Self::BadRequest(e.to_string()),
      ErrorKind::NotFound => Self::NotFound(e.to_string()),
      ErrorKind::Store => Self::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
