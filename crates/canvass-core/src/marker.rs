//! Map markers derived from addresses and visit state.
//!
//! Marker color is a pure function of the address and the visit state; the
//! rendering library only ever sees finished [`Marker`] descriptors.

use serde::{Deserialize, Serialize};

use crate::{
  interaction::{Response, ResponseType},
  precinct::{Address, LatLon},
  session::VisitState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
  /// Unvisited, or visited with an outcome that has no color of its own.
  Blue,
  Green,
  Red,
  Orange,
  Gray,
}

impl MarkerColor {
  pub fn for_response(response: Option<&ResponseType>) -> Self {
    match response.and_then(ResponseType::known) {
      Some(Response::Supportive) => Self::Green,
      Some(Response::Opposed) => Self::Red,
      Some(Response::Undecided) => Self::Orange,
      Some(Response::NotHome) => Self::Gray,
      _ => Self::Blue,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
  pub address_id: crate::interaction::AddressId,
  pub position:   LatLon,
  pub color:      MarkerColor,
  pub label:      String,
}

/// Marker for `address`, or `None` if it has no coordinates.
pub fn resolve(address: &Address, visits: &VisitState) -> Option<Marker> {
  let position = address.position()?;
  Some(Marker {
    address_id: address.id,
    position,
    color: MarkerColor::for_response(visits.response(address.id)),
    label: label(address),
  })
}

/// `owner1[ & owner2] | street, city/zip | property type • occupancy`.
pub fn label(address: &Address) -> String {
  let owner = match (address.owner1.trim(), address.owner2.trim()) {
    ("", "") => "Unknown".to_owned(),
    (one, "") => one.to_owned(),
    ("", two) => two.to_owned(),
    (one, two) => format!("{one} & {two}"),
  };
  let property_type = match address.property_type.trim() {
    "" => "Unknown",
    t => t,
  };
  let occupancy = if address.owner_occupied {
    "Owner Occupied"
  } else {
    "Not Owner Occupied"
  };
  format!(
    "{owner} | {}, {} | {property_type} • {occupancy}",
    address.street_line(),
    address.city_zip
  )
}

/// Markers for every geocoded address, in input order.
pub fn resolve_all<'a>(
  addresses: impl IntoIterator<Item = &'a Address>,
  visits: &VisitState,
) -> Vec<Marker> {
  addresses
    .into_iter()
    .filter_map(|a| resolve(a, visits))
    .collect()
}

// ─── Rendering seam ──────────────────────────────────────────────────────────

/// Receives marker descriptors, e.g. a map-tile renderer.
pub trait MarkerSink {
  fn accept(&mut self, marker: Marker);
}

impl MarkerSink for Vec<Marker> {
  fn accept(&mut self, marker: Marker) { self.push(marker); }
}

/// Push a marker for every geocoded address into `sink`. Addresses without
/// coordinates never reach the sink. Returns the number published.
pub fn publish<'a>(
  addresses: impl IntoIterator<Item = &'a Address>,
  visits: &VisitState,
  sink: &mut impl MarkerSink,
) -> usize {
  let mut n = 0;
  for marker in addresses.into_iter().filter_map(|a| resolve(a, visits)) {
    sink.accept(marker);
    n += 1;
  }
  n
}

/// Markers plus the point to center the map on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
  pub center:  LatLon,
  pub markers: Vec<Marker>,
}

/// Build a [`MapView`]; the center is the mean marker position, or
/// `fallback` when nothing is geocoded.
pub fn map_view<'a>(
  addresses: impl IntoIterator<Item = &'a Address>,
  visits: &VisitState,
  fallback: LatLon,
) -> MapView {
  let markers = resolve_all(addresses, visits);
  let center = if markers.is_empty() {
    fallback
  } else {
    let n = markers.len() as f64;
    let (lat, lon) = markers
      .iter()
      .fold((0.0, 0.0), |(lat, lon), m| (lat + m.position.lat, lon + m.position.lon));
    LatLon::new(lat / n, lon / n)
  };
  MapView { center, markers }
}
