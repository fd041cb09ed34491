//! Handlers for `/sessions/{volunteer_id}` endpoints.
//!
//! Every mutating call answers with the refreshed [`SessionView`], so the
//! client redraws from the response instead of polling.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sessions/{vid}` | Current view |
//! | `PUT`  | `/sessions/{vid}/precinct` | Body: `{"precinct_id":"123"}` |
//! | `POST` | `/sessions/{vid}/sort` | Body: `{"by":"name"}` or `{"by":"distance","origin":{..}}` |
//! | `POST` | `/sessions/{vid}/addresses/{aid}/interactions` | Body: interaction form |
//! | `POST` | `/sessions/{vid}/addresses/{aid}/not-home` | No body |
//! | `POST` | `/sessions/{vid}/addresses/{aid}/skip` | No body |
//! | `GET`  | `/sessions/{vid}/markers` | Markers for the loaded precinct |

use std::{
  collections::HashMap,
  sync::{Arc, Mutex as StdMutex},
};

use axum::{
  Json,
  extract::{Path, State},
};
use canvass_core::{
  Error,
  interaction::{AddressId, InteractionFields},
  marker::{self, MapView},
  recorder::{InteractionRecorder, Recorded},
  session::{CanvassSession, SessionView, SortCriterion},
  store::CanvassStore,
  volunteer::VolunteerId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{AppState, error::ApiError};

// ─── Registry ────────────────────────────────────────────────────────────────

/// One [`CanvassSession`] per volunteer, created on first use.
///
/// Each session has its own lock, so volunteers never wait on each other.
#[derive(Default)]
pub struct SessionRegistry {
  sessions: StdMutex<HashMap<VolunteerId, Arc<Mutex<CanvassSession>>>>,
}

impl SessionRegistry {
  pub fn get_or_create(&self, volunteer_id: VolunteerId) -> Arc<Mutex<CanvassSession>> {
    let mut sessions = self
      .sessions
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    sessions
      .entry(volunteer_id)
      .or_insert_with(|| Arc::new(Mutex::new(CanvassSession::new(volunteer_id))))
      .clone()
  }

  pub fn len(&self) -> usize {
    self
      .sessions
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Session for a volunteer that exists in the store.
async fn session_for<S>(
  state: &AppState<S>,
  volunteer_id: VolunteerId,
) -> Result<Arc<Mutex<CanvassSession>>, ApiError>
where
  S: CanvassStore + 'static,
{
  state
    .store
    .get_volunteer(volunteer_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("volunteer {volunteer_id} not found")))?;
  Ok(state.sessions.get_or_create(volunteer_id))
}

// ─── View ────────────────────────────────────────────────────────────────────

/// `GET /sessions/{vid}`
pub async fn view<S>(
  State(state): State<AppState<S>>,
  Path(volunteer_id): Path<VolunteerId>,
) -> Result<Json<SessionView>, ApiError>
where
  S: CanvassStore + 'static,
{
  let session = session_for(&state, volunteer_id).await?;
  let session = session.lock().await;
  Ok(Json(session.view()))
}

// ─── Precinct selection ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SelectBody {
  pub precinct_id: String,
}

/// `PUT /sessions/{vid}/precinct`
pub async fn select_precinct<S>(
  State(state): State<AppState<S>>,
  Path(volunteer_id): Path<VolunteerId>,
  Json(body): Json<SelectBody>,
) -> Result<Json<SessionView>, ApiError>
where
  S: CanvassStore + 'static,
{
  let session = session_for(&state, volunteer_id).await?;

  state
    .store
    .get_precinct(&body.precinct_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| Error::PrecinctNotFound(body.precinct_id.clone()))?;

  let mut session = session.lock().await;
  session
    .select_precinct(state.store.as_ref(), &body.precinct_id)
    .await?;
  Ok(Json(session.view()))
}

/// `POST /sessions/{vid}/sort`
pub async fn sort<S>(
  State(state): State<AppState<S>>,
  Path(volunteer_id): Path<VolunteerId>,
  Json(criterion): Json<SortCriterion>,
) -> Result<Json<SessionView>, ApiError>
where
  S: CanvassStore + 'static,
{
  let session = session_for(&state, volunteer_id).await?;
  let mut session = session.lock().await;
  session.sort(criterion);
  Ok(Json(session.view()))
}

// ─── Recording ───────────────────────────────────────────────────────────────

/// Answer to every recording call.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
  pub recorded: Recorded,
  pub session:  SessionView,
}

#[derive(Debug, Clone, Copy)]
enum Action {
  Form,
  NotHome,
  Skip,
}

async fn record<S>(
  state: AppState<S>,
  volunteer_id: VolunteerId,
  address_id: AddressId,
  action: Action,
  fields: InteractionFields,
) -> Result<Json<RecordResponse>, ApiError>
where
  S: CanvassStore + 'static,
{
  let session = session_for(&state, volunteer_id).await?;
  let mut session = session.lock().await;

  let recorder =
    InteractionRecorder::new(state.store.as_ref()).with_policy(state.settings.response_policy);
  let recorded = match action {
    Action::Form => recorder.record(&mut session, address_id, fields).await?,
    Action::NotHome => recorder.not_home(&mut session, address_id).await?,
    Action::Skip => recorder.skip(&mut session, address_id).await?,
  };

  Ok(Json(RecordResponse { recorded, session: session.view() }))
}

/// `POST /sessions/{vid}/addresses/{aid}/interactions`
pub async fn record_form<S>(
  State(state): State<AppState<S>>,
  Path((volunteer_id, address_id)): Path<(VolunteerId, AddressId)>,
  Json(fields): Json<InteractionFields>,
) -> Result<Json<RecordResponse>, ApiError>
where
  S: CanvassStore + 'static,
{
  record(state, volunteer_id, address_id, Action::Form, fields).await
}

/// `POST /sessions/{vid}/addresses/{aid}/not-home`
pub async fn not_home<S>(
  State(state): State<AppState<S>>,
  Path((volunteer_id, address_id)): Path<(VolunteerId, AddressId)>,
) -> Result<Json<RecordResponse>, ApiError>
where
  S: CanvassStore + 'static,
{
  record(state, volunteer_id, address_id, Action::NotHome, InteractionFields::default()).await
}

/// `POST /sessions/{vid}/addresses/{aid}/skip`
pub async fn skip<S>(
  State(state): State<AppState<S>>,
  Path((volunteer_id, address_id)): Path<(VolunteerId, AddressId)>,
) -> Result<Json<RecordResponse>, ApiError>
where
  S: CanvassStore + 'static,
{
  record(state, volunteer_id, address_id, Action::Skip, InteractionFields::default()).await
}

// ─── Markers ─────────────────────────────────────────────────────────────────

/// `GET /sessions/{vid}/markers`
pub async fn markers<S>(
  State(state): State<AppState<S>>,
  Path(volunteer_id): Path<VolunteerId>,
) -> Result<Json<MapView>, ApiError>
where
  S: CanvassStore + 'static,
{
  let session = session_for(&state, volunteer_id).await?;
  let session = session.lock().await;
  if session.precinct_id().is_none() {
    return Err(Error::NoPrecinctSelected.into());
  }
  Ok(Json(marker::map_view(
    session.addresses(),
    session.visits(),
    state.settings.map_center,
  )))
}
