//! The `CanvassStore` trait.
//!
//! Implemented by storage backends (e.g. `canvass-store-sqlite`). The
//! session, recorder and aggregator depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  interaction::{AddressId, InteractionId, InteractionRecord, NewInteraction, ResponseType},
  precinct::{Address, NewAddress, Precinct},
  stats::CoverageCounts,
  volunteer::{NewVolunteer, Volunteer, VolunteerId},
};

/// Abstraction over a canvassing store backend.
///
/// Interactions are append-only. Precincts and addresses are reference data
/// written only by seeding. Reads may run concurrently with writes; every
/// write is atomic per row.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CanvassStore: Send + Sync {
  /// Backend error. Converting it into [`crate::Error`] must hand back any
  /// validation error the store raised, so callers see its real kind.
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Create any missing tables. Safe to call on every startup; never erases
  /// existing rows.
  fn create_schema(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Precincts ─────────────────────────────────────────────────────────

  /// All precincts ordered by id ascending.
  fn get_precincts(
    &self,
  ) -> impl Future<Output = Result<Vec<Precinct>, Self::Error>> + Send + '_;

  fn get_precinct<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Precinct>, Self::Error>> + Send + 'a;

  fn insert_precinct(
    &self,
    precinct: Precinct,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Addresses ─────────────────────────────────────────────────────────

  /// Addresses in a precinct ordered by `(street_name, street_number)`.
  /// An unknown precinct yields an empty list, not an error.
  fn get_addresses<'a>(
    &'a self,
    precinct_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Address>, Self::Error>> + Send + 'a;

  fn get_address(
    &self,
    id: AddressId,
  ) -> impl Future<Output = Result<Option<Address>, Self::Error>> + Send + '_;

  fn insert_address(
    &self,
    input: NewAddress,
  ) -> impl Future<Output = Result<AddressId, Self::Error>> + Send + '_;

  /// Write every precinct and its addresses in one transaction, but only if
  /// the store holds no precincts yet. Returns `false` without writing when
  /// it already does. On error nothing is written.
  fn seed_reference_data(
    &self,
    data: Vec<(Precinct, Vec<NewAddress>)>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Interactions ──────────────────────────────────────────────────────

  /// History for one address, most recent first, with volunteer names.
  fn get_interactions(
    &self,
    address_id: AddressId,
  ) -> impl Future<Output = Result<Vec<InteractionRecord>, Self::Error>> + Send + '_;

  /// The latest response for every address in a precinct that has at least
  /// one interaction.
  fn latest_responses<'a>(
    &'a self,
    precinct_id: &'a str,
  ) -> impl Future<Output = Result<Vec<(AddressId, ResponseType)>, Self::Error>> + Send + 'a;

  /// Append an interaction and return its id. The timestamp is set by the
  /// store. Fails without writing if the address or volunteer does not
  /// exist.
  fn insert_interaction(
    &self,
    input: NewInteraction,
  ) -> impl Future<Output = Result<InteractionId, Self::Error>> + Send + '_;

  // ── Volunteers ────────────────────────────────────────────────────────

  /// Return the id of the volunteer with exactly this name (case-sensitive),
  /// creating one if none exists.
  fn find_or_create_volunteer(
    &self,
    input: NewVolunteer,
  ) -> impl Future<Output = Result<VolunteerId, Self::Error>> + Send + '_;

  fn get_volunteer(
    &self,
    id: VolunteerId,
  ) -> impl Future<Output = Result<Option<Volunteer>, Self::Error>> + Send + '_;

  // ── Statistics ────────────────────────────────────────────────────────

  /// Raw counts for [`crate::stats::global_stats`].
  fn coverage_counts(
    &self,
  ) -> impl Future<Output = Result<CoverageCounts, Self::Error>> + Send + '_;
}
