//! JSON REST API for the canvassing engine.
//!
//! Exposes an axum [`Router`] backed by any
//! [`canvass_core::store::CanvassStore`]. Per-volunteer sessions live in the
//! router state. Transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", canvass_api::api_router(state))
//! ```

pub mod error;
pub mod precincts;
pub mod sessions;
pub mod stats;
pub mod volunteers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use canvass_core::{interaction::ResponsePolicy, precinct::LatLon, store::CanvassStore};

pub use error::ApiError;
pub use sessions::SessionRegistry;

// ─── Application state ───────────────────────────────────────────────────────

/// Knobs the handlers read on every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApiSettings {
  pub response_policy: ResponsePolicy,
  /// Where maps center when nothing in view is geocoded.
  pub map_center:      LatLon,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      response_policy: ResponsePolicy::default(),
      map_center:      LatLon::new(27.77, -82.64),
    }
  }
}

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub sessions: Arc<SessionRegistry>,
  pub settings: Arc<ApiSettings>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, settings: ApiSettings) -> Self {
    Self {
      store,
      sessions: Arc::new(SessionRegistry::default()),
      settings: Arc::new(settings),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      sessions: self.sessions.clone(),
      settings: self.settings.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: CanvassStore + 'static,
{
  Router::new()
    // Reference data
    .route("/precincts", get(precincts::list::<S>))
    .route("/precincts/{id}/addresses", get(precincts::addresses::<S>))
    .route("/precincts/{id}/markers", get(precincts::markers::<S>))
    .route("/addresses/{id}/interactions", get(precincts::interactions::<S>))
    // Volunteers
    .route("/volunteers", post(volunteers::sign_in::<S>))
    // Sessions
    .route("/sessions/{volunteer_id}", get(sessions::view::<S>))
    .route("/sessions/{volunteer_id}/precinct", put(sessions::select_precinct::<S>))
    .route("/sessions/{volunteer_id}/sort", post(sessions::sort::<S>))
    .route(
      "/sessions/{volunteer_id}/addresses/{address_id}/interactions",
      post(sessions::record_form::<S>),
    )
    .route(
      "/sessions/{volunteer_id}/addresses/{address_id}/not-home",
      post(sessions::not_home::<S>),
    )
    .route(
      "/sessions/{volunteer_id}/addresses/{address_id}/skip",
      post(sessions::skip::<S>),
    )
    .route("/sessions/{volunteer_id}/markers", get(sessions::markers::<S>))
    // Statistics
    .route("/stats", get(stats::handler::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use canvass_core::precinct::{NewAddress, Precinct};
  use canvass_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  /// Precinct "123" with three addresses, the middle one not geocoded.
  async fn make_state(settings: ApiSettings) -> (AppState<SqliteStore>, Vec<i64>) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .insert_precinct(Precinct {
        id:                 "123".into(),
        name:               "Precinct 123".into(),
        total_addresses:    3,
        owner_occupied:     2,
        non_owner_occupied: 1,
      })
      .await
      .unwrap();

    let mut ids = Vec::new();
    for (i, number) in [100, 110, 120].into_iter().enumerate() {
      let geocoded = i != 1;
      let id = store
        .insert_address(NewAddress {
          precinct_id: "123".into(),
          owner1: "SMITH, JOHN".into(),
          street_number: Some(number),
          street_name: "MAIN ST".into(),
          city_zip: "ST PETERSBURG, FL 33701".into(),
          property_type: "Single Family".into(),
          owner_occupied: i != 2,
          latitude: geocoded.then_some(27.77),
          longitude: geocoded.then_some(-82.64),
          ..NewAddress::default()
        })
        .await
        .unwrap();
      ids.push(id);
    }
    (AppState::new(Arc::new(store), settings), ids)
  }

  async fn call(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn sign_in(state: &AppState<SqliteStore>, name: &str) -> i64 {
    let (status, body) =
      call(state.clone(), "POST", "/volunteers", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
  }

  async fn select(state: &AppState<SqliteStore>, volunteer: i64, precinct: &str) -> Value {
    let (status, body) = call(
      state.clone(),
      "PUT",
      &format!("/sessions/{volunteer}/precinct"),
      Some(json!({ "precinct_id": precinct })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
  }

  // ── Reference data ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn lists_precincts_and_addresses() {
    let (state, _) = make_state(ApiSettings::default()).await;

    let (status, body) = call(state.clone(), "GET", "/precincts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "123");
    assert_eq!(body[0]["total_addresses"], 3);

    let (_, body) = call(state.clone(), "GET", "/precincts/123/addresses", None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = call(state, "GET", "/precincts/999/addresses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn unknown_address_history_is_404() {
    let (state, _) = make_state(ApiSettings::default()).await;
    let (status, body) = call(state, "GET", "/addresses/999/interactions", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));
  }

  // ── Volunteers ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sign_in_is_find_or_create() {
    let (state, _) = make_state(ApiSettings::default()).await;
    let a = sign_in(&state, "Jane Doe").await;
    let b = sign_in(&state, "Jane Doe").await;
    assert_eq!(a, b);

    let (status, _) =
      call(state, "POST", "/volunteers", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Sessions ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_volunteer_has_no_session() {
    let (state, _) = make_state(ApiSettings::default()).await;
    let (status, _) = call(state.clone(), "GET", "/sessions/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.sessions.is_empty());
  }

  #[tokio::test]
  async fn select_precinct_loads_addresses() {
    let (state, _) = make_state(ApiSettings::default()).await;
    let volunteer = sign_in(&state, "Jane Doe").await;

    let (_, body) = call(state.clone(), "GET", &format!("/sessions/{volunteer}"), None).await;
    assert_eq!(body["state"], "unselected");

    let view = select(&state, volunteer, "123").await;
    assert_eq!(view["state"], "loaded");
    assert_eq!(view["progress"]["total"], 3);
    assert_eq!(view["addresses"][0]["street_number"], 100);
    assert_eq!(view["addresses"][0]["visited"], false);

    let (status, _) = call(
      state,
      "PUT",
      &format!("/sessions/{volunteer}/precinct"),
      Some(json!({ "precinct_id": "999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn recording_returns_refreshed_view() {
    let (state, ids) = make_state(ApiSettings::default()).await;
    let volunteer = sign_in(&state, "Jane Doe").await;
    select(&state, volunteer, "123").await;

    let (status, body) = call(
      state.clone(),
      "POST",
      &format!("/sessions/{volunteer}/addresses/{}/interactions", ids[0]),
      Some(json!({ "response_type": "Supportive", "resident_name": "Pat" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["recorded"]["response_type"], "supportive");
    assert_eq!(body["recorded"]["flagged"], false);
    assert_eq!(body["session"]["state"], "in_progress");
    assert_eq!(body["session"]["progress"]["visited"], 1);

    let (_, body) = call(
      state.clone(),
      "POST",
      &format!("/sessions/{volunteer}/addresses/{}/not-home", ids[2]),
      None,
    )
    .await;
    assert_eq!(body["recorded"]["response_type"], "not-home");
    assert_eq!(body["session"]["progress"]["visited"], 2);

    let (_, history) =
      call(state.clone(), "GET", &format!("/addresses/{}/interactions", ids[0]), None).await;
    assert_eq!(history[0]["volunteer_name"], "Jane Doe");
    assert_eq!(history[0]["resident_name"], "Pat");

    let (_, stats) = call(state, "GET", "/stats", None).await;
    assert_eq!(stats["total_interactions"], 2);
    assert_eq!(stats["coverage_percentage"], 66.67);
  }

  #[tokio::test]
  async fn recording_outside_loaded_precinct_is_404() {
    let (state, ids) = make_state(ApiSettings::default()).await;
    let volunteer = sign_in(&state, "Jane Doe").await;

    let (status, _) = call(
      state.clone(),
      "POST",
      &format!("/sessions/{volunteer}/addresses/{}/skip", ids[0]),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, stats) = call(state, "GET", "/stats", None).await;
    assert_eq!(stats["total_interactions"], 0);
  }

  #[tokio::test]
  async fn strict_policy_rejects_free_text() {
    let settings = ApiSettings { response_policy: ResponsePolicy::Strict, ..Default::default() };
    let (state, ids) = make_state(settings).await;
    let volunteer = sign_in(&state, "Jane Doe").await;
    select(&state, volunteer, "123").await;

    let (status, body) = call(
      state,
      "POST",
      &format!("/sessions/{volunteer}/addresses/{}/interactions", ids[0]),
      Some(json!({ "response_type": "Moved Away" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("moved-away"));
  }

  #[tokio::test]
  async fn sort_by_distance_reorders_view() {
    let (state, ids) = make_state(ApiSettings::default()).await;
    let volunteer = sign_in(&state, "Jane Doe").await;
    select(&state, volunteer, "123").await;

    let (status, view) = call(
      state,
      "POST",
      &format!("/sessions/{volunteer}/sort"),
      Some(json!({ "by": "distance", "origin": { "lat": 27.77, "lon": -82.64 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // The ungeocoded address sorts last.
    assert_eq!(view["addresses"][2]["id"], ids[1]);
  }

  // ── Markers ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn markers_skip_ungeocoded_and_follow_visits() {
    let (state, ids) = make_state(ApiSettings::default()).await;
    let volunteer = sign_in(&state, "Jane Doe").await;

    let (status, _) =
      call(state.clone(), "GET", &format!("/sessions/{volunteer}/markers"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    select(&state, volunteer, "123").await;
    call(
      state.clone(),
      "POST",
      &format!("/sessions/{volunteer}/addresses/{}/interactions", ids[0]),
      Some(json!({ "response_type": "opposed" })),
    )
    .await;

    let (_, view) =
      call(state.clone(), "GET", &format!("/sessions/{volunteer}/markers"), None).await;
    let markers = view["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0]["address_id"], ids[0]);
    assert_eq!(markers[0]["color"], "red");
    assert_eq!(markers[1]["color"], "blue");

    // A second volunteer's fresh session sees the stored history only on the
    // precinct map.
    let other = sign_in(&state, "Sam").await;
    select(&state, other, "123").await;
    let (_, own) = call(state.clone(), "GET", &format!("/sessions/{other}/markers"), None).await;
    assert_eq!(own["markers"][0]["color"], "blue");
    let (_, shared) = call(state, "GET", "/precincts/123/markers", None).await;
    assert_eq!(shared["markers"][0]["color"], "red");
  }
}
