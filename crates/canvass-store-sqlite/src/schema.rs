//! SQL schema for the canvassing SQLite store.
//!
//! Run on every open and by `create_schema`. Future migrations will be gated
//! on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- `name` uses the default BINARY collation: lookups are case-sensitive.
CREATE TABLE IF NOT EXISTS volunteers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL DEFAULT '',
    phone       TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS precincts (
    id                  TEXT PRIMARY KEY,
    name                TEXT NOT NULL,
    total_addresses     INTEGER NOT NULL DEFAULT 0,
    owner_occupied      INTEGER NOT NULL DEFAULT 0,
    non_owner_occupied  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS addresses (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    precinct_id     TEXT NOT NULL REFERENCES precincts(id),
    owner1          TEXT NOT NULL DEFAULT '',
    owner2          TEXT NOT NULL DEFAULT '',
    street_number   INTEGER,
    street_name     TEXT NOT NULL DEFAULT '',
    unit            TEXT NOT NULL DEFAULT '',
    city_zip        TEXT NOT NULL DEFAULT '',
    zip_code        TEXT NOT NULL DEFAULT '',
    property_type   TEXT NOT NULL DEFAULT '',
    owner_occupied  TEXT NOT NULL DEFAULT 'No',   -- 'Yes' | 'No'
    latitude        REAL,
    longitude       REAL
);

-- Interactions are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS interactions (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    address_id          INTEGER NOT NULL REFERENCES addresses(id),
    volunteer_id        INTEGER NOT NULL REFERENCES volunteers(id),
    timestamp           TEXT NOT NULL,   -- RFC 3339 UTC, microseconds; store-assigned
    resident_name       TEXT NOT NULL DEFAULT '',
    response_type       TEXT NOT NULL DEFAULT '',
    yard_sign           TEXT NOT NULL DEFAULT '',
    volunteer_interest  TEXT NOT NULL DEFAULT '',
    notes               TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS addresses_precinct_idx   ON addresses(precinct_id);
CREATE INDEX IF NOT EXISTS interactions_address_idx ON interactions(address_id, timestamp);

PRAGMA user_version = 1;
";
