//! Coverage aggregation.
//!
//! The store supplies raw counts; this module turns them into the statistics
//! shown on the stats page. Read-only: nothing here writes to the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, store::CanvassStore};

// ─── Raw counts ──────────────────────────────────────────────────────────────

/// Counts read from the store. Each field is independently derived; a store
/// may read them in one snapshot but callers must not rely on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageCounts {
  /// Every interaction row, history included.
  pub total_interactions:  u64,
  /// Distinct addresses with at least one interaction.
  pub addresses_contacted: u64,
  /// Address rows loaded.
  pub total_addresses:     u64,
  /// Interaction count per non-empty `response_type`.
  pub response_breakdown:  BTreeMap<String, u64>,
  /// One entry per precinct, ordered by id.
  pub precincts:           Vec<PrecinctCounts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecinctCounts {
  pub id:                  String,
  pub name:                String,
  /// Reference total from the precinct record.
  pub total_addresses:     u64,
  pub loaded_addresses:    u64,
  pub addresses_contacted: u64,
}

// ─── Derived statistics ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
  pub total_interactions:        u64,
  pub total_addresses_contacted: u64,
  pub total_addresses:           u64,
  pub coverage_percentage:       f64,
  pub response_breakdown:        BTreeMap<String, u64>,
  pub precinct_coverage:         Vec<PrecinctCoverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecinctCoverage {
  pub id:                  String,
  pub name:                String,
  pub total_addresses:     u64,
  pub loaded_addresses:    u64,
  pub addresses_contacted: u64,
  pub coverage_percentage: f64,
}

/// `part / whole * 100` rounded to two places and clamped to `[0, 100]`.
/// Zero when `whole` is zero.
pub fn coverage_percentage(part: u64, whole: u64) -> f64 {
  if whole == 0 {
    return 0.0;
  }
  let pct = part as f64 / whole as f64 * 100.0;
  ((pct * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

impl From<CoverageCounts> for GlobalStats {
  fn from(c: CoverageCounts) -> Self {
    let precinct_coverage = c
      .precincts
      .into_iter()
      .map(|p| PrecinctCoverage {
        coverage_percentage: coverage_percentage(p.addresses_contacted, p.total_addresses),
        id:                  p.id,
        name:                p.name,
        total_addresses:     p.total_addresses,
        loaded_addresses:    p.loaded_addresses,
        addresses_contacted: p.addresses_contacted,
      })
      .collect();

    let mut response_breakdown = c.response_breakdown;
    response_breakdown.retain(|k, _| !k.is_empty());

    GlobalStats {
      total_interactions: c.total_interactions,
      total_addresses_contacted: c.addresses_contacted,
      total_addresses: c.total_addresses,
      coverage_percentage: coverage_percentage(c.addresses_contacted, c.total_addresses),
      response_breakdown,
      precinct_coverage,
    }
  }
}

/// Compute global and per-precinct statistics from `store`.
///
/// Store failures propagate; no placeholder figures are ever substituted.
pub async fn global_stats<S: CanvassStore>(store: &S) -> Result<GlobalStats> {
  let counts = store.coverage_counts().await.map_err(Into::<Error>::into)?;
  Ok(GlobalStats::from(counts))
}
