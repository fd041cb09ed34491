//! Recording door outcomes.
//!
//! The recorder validates the form, appends an interaction through the store
//! and then resolves the address in the caller's session. Every check runs
//! before the write, so a rejected call changes neither store nor session.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
  Error, Result,
  interaction::{
    AddressId, InteractionFields, InteractionId, NewInteraction, Response, ResponsePolicy,
    ResponseType,
  },
  session::CanvassSession,
  store::CanvassStore,
};

/// The result of a successful [`InteractionRecorder::record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recorded {
  pub interaction_id: InteractionId,
  pub response_type:  ResponseType,
  /// The response was outside the canonical set and stored as free text.
  pub flagged:        bool,
}

pub struct InteractionRecorder<'a, S> {
  store:  &'a S,
  policy: ResponsePolicy,
}

impl<'a, S: CanvassStore> InteractionRecorder<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store, policy: ResponsePolicy::default() } }

  pub fn with_policy(mut self, policy: ResponsePolicy) -> Self {
    self.policy = policy;
    self
  }

  /// Record a full form submission for `address_id` on behalf of the
  /// session's volunteer.
  pub async fn record(
    &self,
    session: &mut CanvassSession,
    address_id: AddressId,
    fields: InteractionFields,
  ) -> Result<Recorded> {
    let response_type = ResponseType::parse(&fields.response_type);
    let flagged = response_type.is_unrecognized();
    if flagged {
      match self.policy {
        ResponsePolicy::Strict => {
          return Err(Error::UnrecognizedResponse(response_type.as_str().to_owned()));
        }
        ResponsePolicy::Permissive => {
          warn!(address_id, response_type = %response_type, "storing unrecognized response type");
        }
      }
    }

    if !session.contains(address_id) {
      return Err(Error::AddressNotLoaded(address_id));
    }

    let input = NewInteraction::new(
      address_id,
      session.volunteer_id(),
      response_type.clone(),
      fields,
    );
    let interaction_id = self
      .store
      .insert_interaction(input)
      .await
      .map_err(Into::<Error>::into)?;

    session.resolve(address_id, response_type.clone())?;
    Ok(Recorded { interaction_id, response_type, flagged })
  }

  /// "Not Home" button: same stored shape as a form with only the response
  /// set.
  pub async fn not_home(
    &self,
    session: &mut CanvassSession,
    address_id: AddressId,
  ) -> Result<Recorded> {
    self
      .record(session, address_id, InteractionFields::quick(Response::NotHome))
      .await
  }

  /// "Skip" button.
  pub async fn skip(&self, session: &mut CanvassSession, address_id: AddressId) -> Result<Recorded> {
    self
      .record(session, address_id, InteractionFields::quick(Response::Skipped))
      .await
  }
}
