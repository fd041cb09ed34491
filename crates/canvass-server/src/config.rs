//! Runtime configuration, read from a TOML file and `CANVASS_*` variables.

use std::path::PathBuf;

use anyhow::Context as _;
use canvass_api::ApiSettings;
use canvass_core::{interaction::ResponsePolicy, precinct::LatLon};
use serde::Deserialize;

/// Server configuration. Every field has a default, so an absent file is
/// a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Seed the sample district into an empty store at startup.
  pub seed_demo_data:  bool,
  pub response_policy: ResponsePolicy,
  pub map_center:      LatLon,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_owned(),
      port:            8080,
      store_path:      PathBuf::from("canvassing.db"),
      seed_demo_data:  false,
      response_policy: ResponsePolicy::Permissive,
      map_center:      LatLon::new(27.77, -82.64),
    }
  }
}

impl ServerConfig {
  /// Layer the file at `path` (optional) under `CANVASS_*` environment
  /// variables. Nested keys use `__`, e.g. `CANVASS_MAP_CENTER__LAT`.
  pub fn load(path: PathBuf) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("CANVASS")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings { response_policy: self.response_policy, map_center: self.map_center }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
