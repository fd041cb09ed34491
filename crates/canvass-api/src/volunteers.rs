//! `POST /volunteers`: sign in by name.

use axum::{Json, extract::State};
use canvass_core::{
  store::CanvassStore,
  volunteer::{NewVolunteer, Volunteer},
};
use tracing::info;

use crate::{AppState, error::ApiError};

/// `POST /volunteers`, body `{"name":"Jane Doe"}`.
///
/// Returns the existing volunteer with exactly that name, or a new one.
pub async fn sign_in<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewVolunteer>,
) -> Result<Json<Volunteer>, ApiError>
where
  S: CanvassStore + 'static,
{
  body.validate()?;
  let id = state
    .store
    .find_or_create_volunteer(body)
    .await
    .map_err(ApiError::store)?;

  let volunteer = state
    .store
    .get_volunteer(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("volunteer {id} not found")))?;

  info!(volunteer_id = id, name = %volunteer.name, "volunteer signed in");
  Ok(Json(volunteer))
}
