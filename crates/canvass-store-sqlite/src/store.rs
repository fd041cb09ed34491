//! [`SqliteStore`]: the SQLite implementation of [`CanvassStore`].

use std::{collections::BTreeMap, path::Path};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;

use canvass_core::{
  interaction::{AddressId, InteractionId, InteractionRecord, NewInteraction, ResponseType},
  precinct::{Address, NewAddress, Precinct},
  stats::{CoverageCounts, PrecinctCounts},
  store::CanvassStore,
  volunteer::{NewVolunteer, Volunteer, VolunteerId},
};

use crate::{
  Error, Result,
  encode::{
    ADDRESS_COLUMNS, PRECINCT_COLUMNS, RawAddress, RawInteraction, RawPrecinct, RawVolunteer,
    decode_count, encode_count, encode_dt, encode_occupied,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A canvassing store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, as the tests do.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CanvassStore impl ───────────────────────────────────────────────────────

impl CanvassStore for SqliteStore {
  type Error = Error;

  async fn create_schema(&self) -> Result<()> { self.init_schema().await }

  // ── Precincts ─────────────────────────────────────────────────────────────

  async fn get_precincts(&self) -> Result<Vec<Precinct>> {
    let raws: Vec<RawPrecinct> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PRECINCT_COLUMNS} FROM precincts ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawPrecinct::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawPrecinct::into_precinct).collect())
  }

  async fn get_precinct(&self, id: &str) -> Result<Option<Precinct>> {
    let id = id.to_owned();

    let raw: Option<RawPrecinct> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PRECINCT_COLUMNS} FROM precincts WHERE id = ?1"),
              rusqlite::params![id],
              RawPrecinct::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawPrecinct::into_precinct))
  }

  async fn insert_precinct(&self, precinct: Precinct) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO precincts (id, name, total_addresses, owner_occupied, non_owner_occupied)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            precinct.id,
            precinct.name,
            encode_count(precinct.total_addresses),
            encode_count(precinct.owner_occupied),
            encode_count(precinct.non_owner_occupied),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Addresses ─────────────────────────────────────────────────────────────

  async fn get_addresses(&self, precinct_id: &str) -> Result<Vec<Address>> {
    let precinct_id = precinct_id.to_owned();

    let raws: Vec<RawAddress> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ADDRESS_COLUMNS} FROM addresses
           WHERE precinct_id = ?1
           ORDER BY street_name, street_number, id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![precinct_id], RawAddress::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawAddress::into_address).collect())
  }

  async fn get_address(&self, id: AddressId) -> Result<Option<Address>> {
    let raw: Option<RawAddress> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ?1"),
              rusqlite::params![id],
              RawAddress::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawAddress::into_address))
  }

  async fn insert_address(&self, input: NewAddress) -> Result<AddressId> {
    let occupied = encode_occupied(input.owner_occupied);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO addresses (
             precinct_id, owner1, owner2, street_number, street_name, unit,
             city_zip, zip_code, property_type, owner_occupied, latitude, longitude
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            input.precinct_id,
            input.owner1,
            input.owner2,
            input.street_number,
            input.street_name,
            input.unit,
            input.city_zip,
            input.zip_code,
            input.property_type,
            occupied,
            input.latitude,
            input.longitude,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  async fn seed_reference_data(&self, data: Vec<(Precinct, Vec<NewAddress>)>) -> Result<bool> {
    let seeded = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM precincts", [], |r| r.get(0))?;
        if existing > 0 {
          return Ok(false);
        }

        {
          let mut insert_precinct = tx.prepare(
            "INSERT INTO precincts (id, name, total_addresses, owner_occupied, non_owner_occupied)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          let mut insert_address = tx.prepare(
            "INSERT INTO addresses (
               precinct_id, owner1, owner2, street_number, street_name, unit,
               city_zip, zip_code, property_type, owner_occupied, latitude, longitude
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          )?;

          for (precinct, addresses) in &data {
            insert_precinct.execute(rusqlite::params![
              precinct.id,
              precinct.name,
              encode_count(precinct.total_addresses),
              encode_count(precinct.owner_occupied),
              encode_count(precinct.non_owner_occupied),
            ])?;
            for a in addresses {
              insert_address.execute(rusqlite::params![
                a.precinct_id,
                a.owner1,
                a.owner2,
                a.street_number,
                a.street_name,
                a.unit,
                a.city_zip,
                a.zip_code,
                a.property_type,
                encode_occupied(a.owner_occupied),
                a.latitude,
                a.longitude,
              ])?;
            }
          }
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;
    Ok(seeded)
  }

  // ── Interactions ──────────────────────────────────────────────────────────

  async fn get_interactions(&self, address_id: AddressId) -> Result<Vec<InteractionRecord>> {
    let raws: Vec<RawInteraction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             i.id, i.address_id, i.volunteer_id, i.timestamp,
             i.resident_name, i.response_type, i.yard_sign,
             i.volunteer_interest, i.notes,
             COALESCE(v.name, '') AS volunteer_name
           FROM interactions i
           LEFT JOIN volunteers v ON v.id = i.volunteer_id
           WHERE i.address_id = ?1
           ORDER BY i.timestamp DESC, i.id DESC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![address_id], |row| {
            Ok(RawInteraction {
              id:                 row.get(0)?,
              address_id:         row.get(1)?,
              volunteer_id:       row.get(2)?,
              timestamp:          row.get(3)?,
              resident_name:      row.get(4)?,
              response_type:      row.get(5)?,
              yard_sign:          row.get(6)?,
              volunteer_interest: row.get(7)?,
              notes:              row.get(8)?,
              volunteer_name:     row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInteraction::into_record).collect()
  }

  async fn latest_responses(&self, precinct_id: &str) -> Result<Vec<(AddressId, ResponseType)>> {
    let precinct_id = precinct_id.to_owned();

    let rows: Vec<(AddressId, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT i.address_id, i.response_type
           FROM interactions i
           JOIN addresses a ON a.id = i.address_id
           WHERE a.precinct_id = ?1
           ORDER BY i.address_id, i.timestamp DESC, i.id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![precinct_id], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // Rows arrive newest first within each address; keep the first.
    let mut latest: Vec<(AddressId, ResponseType)> = Vec::new();
    for (address_id, response) in rows {
      if latest.last().is_some_and(|(id, _)| *id == address_id) {
        continue;
      }
      latest.push((address_id, ResponseType::parse(&response)));
    }
    Ok(latest)
  }

  async fn insert_interaction(&self, input: NewInteraction) -> Result<InteractionId> {
    let timestamp = encode_dt(Utc::now());
    let response_type = input.response_type.as_str().to_owned();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let address: Option<i64> = tx
          .query_row(
            "SELECT id FROM addresses WHERE id = ?1",
            rusqlite::params![input.address_id],
            |r| r.get(0),
          )
          .optional()?;
        if address.is_none() {
          return Ok(Err(canvass_core::Error::AddressNotFound(input.address_id)));
        }

        let volunteer: Option<i64> = tx
          .query_row(
            "SELECT id FROM volunteers WHERE id = ?1",
            rusqlite::params![input.volunteer_id],
            |r| r.get(0),
          )
          .optional()?;
        if volunteer.is_none() {
          return Ok(Err(canvass_core::Error::VolunteerNotFound(input.volunteer_id)));
        }

        tx.execute(
          "INSERT INTO interactions (
             address_id, volunteer_id, timestamp, resident_name, response_type,
             yard_sign, volunteer_interest, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            input.address_id,
            input.volunteer_id,
            timestamp,
            input.resident_name,
            response_type,
            input.yard_sign,
            input.volunteer_interest,
            input.notes,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await??;
    Ok(id)
  }

  // ── Volunteers ────────────────────────────────────────────────────────────

  async fn find_or_create_volunteer(&self, input: NewVolunteer) -> Result<VolunteerId> {
    input.validate()?;
    let created_at = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        // Immediate so two first-time sign-ins for one name cannot race.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<i64> = tx
          .query_row(
            "SELECT id FROM volunteers WHERE name = ?1",
            rusqlite::params![input.name],
            |r| r.get(0),
          )
          .optional()?;

        let id = match existing {
          Some(id) => id,
          None => {
            tx.execute(
              "INSERT INTO volunteers (name, email, phone, created_at) VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![input.name, input.email, input.phone, created_at],
            )?;
            tx.last_insert_rowid()
          }
        };
        tx.commit()?;
        Ok(id)
      })
      .await?;
    Ok(id)
  }

  async fn get_volunteer(&self, id: VolunteerId) -> Result<Option<Volunteer>> {
    let raw: Option<RawVolunteer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, email, phone, created_at FROM volunteers WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawVolunteer {
                  id:         row.get(0)?,
                  name:       row.get(1)?,
                  email:      row.get(2)?,
                  phone:      row.get(3)?,
                  created_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVolunteer::into_volunteer).transpose()
  }

  // ── Statistics ────────────────────────────────────────────────────────────

  async fn coverage_counts(&self) -> Result<CoverageCounts> {
    self
      .conn
      .call(|conn| {
        // One read transaction so every count comes from the same snapshot.
        let tx = conn.transaction()?;

        let count = |sql: &str| -> rusqlite::Result<u64> {
          tx.query_row(sql, [], |r| r.get::<_, i64>(0)).map(decode_count)
        };
        let total_interactions = count("SELECT COUNT(*) FROM interactions")?;
        let addresses_contacted = count("SELECT COUNT(DISTINCT address_id) FROM interactions")?;
        let total_addresses = count("SELECT COUNT(*) FROM addresses")?;

        let mut response_breakdown = BTreeMap::new();
        {
          let mut stmt = tx.prepare(
            "SELECT response_type, COUNT(*) FROM interactions
             WHERE response_type != ''
             GROUP BY response_type",
          )?;
          let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
          for row in rows {
            let (response, n) = row?;
            let key = ResponseType::normalize(&response);
            if !key.is_empty() {
              *response_breakdown.entry(key).or_insert(0) += decode_count(n);
            }
          }
        }

        let precincts = {
          let mut stmt = tx.prepare(
            "SELECT
               p.id, p.name, p.total_addresses,
               (SELECT COUNT(*) FROM addresses a WHERE a.precinct_id = p.id),
               (SELECT COUNT(DISTINCT i.address_id)
                  FROM interactions i
                  JOIN addresses a ON a.id = i.address_id
                 WHERE a.precinct_id = p.id)
             FROM precincts p
             ORDER BY p.id",
          )?;
          stmt
            .query_map([], |r| {
              Ok(PrecinctCounts {
                id:                  r.get(0)?,
                name:                r.get(1)?,
                total_addresses:     decode_count(r.get(2)?),
                loaded_addresses:    decode_count(r.get(3)?),
                addresses_contacted: decode_count(r.get(4)?),
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        tx.commit()?;

        Ok(CoverageCounts {
          total_interactions,
          addresses_contacted,
          total_addresses,
          response_breakdown,
          precincts,
        })
      })
      .await
      .map_err(Error::from)
  }
}
