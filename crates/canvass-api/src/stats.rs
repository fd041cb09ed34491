//! `GET /stats`

use axum::{Json, extract::State};
use canvass_core::{
  stats::{self, GlobalStats},
  store::CanvassStore,
};

use crate::{AppState, error::ApiError};

pub async fn handler<S>(State(state): State<AppState<S>>) -> Result<Json<GlobalStats>, ApiError>
where
  S: CanvassStore + 'static,
{
  Ok(Json(stats::global_stats(state.store.as_ref()).await?))
}
