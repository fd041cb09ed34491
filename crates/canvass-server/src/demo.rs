//! The sample district seeded by `--seed-demo`.
//!
//! Eleven St. Petersburg precincts with their voter-file totals, plus a
//! synthetic walking list of up to fifty addresses each.

use canvass_core::{
  demo::DemoDataProvider,
  precinct::{NewAddress, Precinct},
};

const PRECINCTS: &[(&str, u64, u64)] = &[
  ("123", 950, 303),
  ("125", 1890, 687),
  ("130", 1200, 415),
  ("135", 3100, 1098),
  ("136", 210, 64),
  ("138", 3900, 1437),
  ("142", 3300, 1260),
  ("144", 2500, 834),
  ("145", 2000, 704),
  ("154", 3600, 1308),
  ("155", 3700, 1268),
];

const STREETS: &[&str] = &[
  "MAIN ST",
  "OAK AVE",
  "PINE ST",
  "MAPLE DR",
  "CEDAR LN",
  "BEACH BLVD",
  "CENTRAL AVE",
];

const PROPERTY_TYPES: &[&str] =
  &["Single Family", "Condominium", "Duplex", "Apartment", "Townhouse"];

const MAX_ADDRESSES: usize = 50;

pub struct SampleDistrict {
  pub base_lat: f64,
  pub base_lon: f64,
}

impl Default for SampleDistrict {
  fn default() -> Self { Self { base_lat: 27.77, base_lon: -82.64 } }
}

impl DemoDataProvider for SampleDistrict {
  fn precincts(&self) -> Vec<Precinct> {
    PRECINCTS
      .iter()
      .map(|&(id, owner, non_owner)| Precinct {
        id:                 id.to_owned(),
        name:               format!("Precinct {id}"),
        total_addresses:    owner + non_owner,
        owner_occupied:     owner,
        non_owner_occupied: non_owner,
      })
      .collect()
  }

  fn addresses(&self, precinct: &Precinct) -> Vec<NewAddress> {
    let count = precinct
      .id
      .parse::<usize>()
      .map_or(MAX_ADDRESSES, |n| n.saturating_mul(5).min(MAX_ADDRESSES));

    (0..count)
      .map(|i| {
        let number = 100 + i as i64 * 10;
        NewAddress {
          precinct_id:    precinct.id.clone(),
          owner1:         format!("SMITH, JOHN {i}"),
          owner2:         if i % 3 == 0 { "SMITH, JANE".to_owned() } else { String::new() },
          street_number:  Some(number),
          street_name:    STREETS[i % STREETS.len()].to_owned(),
          unit:           if i % 4 == 0 { format!("#{}", i % 10) } else { String::new() },
          city_zip:       "ST PETERSBURG, FL 33701".to_owned(),
          zip_code:       "33701".to_owned(),
          property_type:  PROPERTY_TYPES[i % PROPERTY_TYPES.len()].to_owned(),
          owner_occupied: i % 2 == 0,
          latitude:       Some(self.base_lat + (i % 10) as f64 * 0.001),
          longitude:      Some(self.base_lon + (i % 5) as f64 * 0.001),
        }
      })
      .collect()
  }
}
