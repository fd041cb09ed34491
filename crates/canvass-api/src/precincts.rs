//! Handlers for reference data: precincts, addresses and visit history.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/precincts` | Ordered by id |
//! | `GET`  | `/precincts/{id}/addresses` | Walking order; unknown id gives `[]` |
//! | `GET`  | `/precincts/{id}/markers` | Colored by each address's latest interaction |
//! | `GET`  | `/addresses/{id}/interactions` | Newest first; 404 if the address is unknown |

use axum::{
  Json,
  extract::{Path, State},
};
use canvass_core::{
  interaction::{AddressId, InteractionRecord},
  marker::{self, MapView},
  precinct::{Address, Precinct},
  session::VisitState,
  store::CanvassStore,
};

use crate::{AppState, error::ApiError};

/// `GET /precincts`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Precinct>>, ApiError>
where
  S: CanvassStore + 'static,
{
  let precincts = state.store.get_precincts().await.map_err(ApiError::store)?;
  Ok(Json(precincts))
}

/// `GET /precincts/{id}/addresses`
pub async fn addresses<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Address>>, ApiError>
where
  S: CanvassStore + 'static,
{
  let addresses = state.store.get_addresses(&id).await.map_err(ApiError::store)?;
  Ok(Json(addresses))
}

/// `GET /precincts/{id}/markers`
///
/// Unlike the session markers this view is built from stored history, so it
/// shows every volunteer's work.
pub async fn markers<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<MapView>, ApiError>
where
  S: CanvassStore + 'static,
{
  let addresses = state.store.get_addresses(&id).await.map_err(ApiError::store)?;
  let latest = state.store.latest_responses(&id).await.map_err(ApiError::store)?;
  let visits = VisitState::from_latest(latest);
  Ok(Json(marker::map_view(&addresses, &visits, state.settings.map_center)))
}

/// `GET /addresses/{id}/interactions`
pub async fn interactions<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<AddressId>,
) -> Result<Json<Vec<InteractionRecord>>, ApiError>
where
  S: CanvassStore + 'static,
{
  state
    .store
    .get_address(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("address {id} not found")))?;

  let history = state.store.get_interactions(id).await.map_err(ApiError::store)?;
  Ok(Json(history))
}
