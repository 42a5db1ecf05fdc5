// ==========================================
// Asset Inventory - inventory database
// ==========================================
// Connection setup and the schema. The inventory schema relies on
// foreign keys (ext attributes, group relations, links all reference
// asset_element), which SQLite enforces per connection, so every
// connection goes through one of the open functions here.
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)
}

/// Open the inventory database file.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    apply_pragmas(&conn)?;
    Ok(conn)
}

/// In-memory inventory database, used by tests.
pub fn open_in_memory_connection() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    apply_pragmas(&conn)?;
    Ok(conn)
}

/// Inventory schema, idempotent.
///
/// Element/device type tables are reference data and are seeded here;
/// asset rows are only ever written through the repository.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS asset_element_type (
    id_asset_element_type INTEGER PRIMARY KEY,
    name                  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS asset_device_type (
    id_asset_device_type INTEGER PRIMARY KEY,
    name                 TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS asset_element (
    id_asset_element INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL UNIQUE,
    id_type          INTEGER NOT NULL REFERENCES asset_element_type(id_asset_element_type),
    id_subtype       INTEGER NOT NULL REFERENCES asset_device_type(id_asset_device_type),
    id_parent        INTEGER REFERENCES asset_element(id_asset_element),
    status           TEXT NOT NULL DEFAULT 'nonactive',
    priority         INTEGER NOT NULL DEFAULT 5,
    asset_tag        TEXT
);

CREATE TABLE IF NOT EXISTS asset_ext_attributes (
    id_asset_ext_attribute INTEGER PRIMARY KEY AUTOINCREMENT,
    keytag                 TEXT NOT NULL,
    value                  TEXT NOT NULL,
    id_asset_element       INTEGER NOT NULL REFERENCES asset_element(id_asset_element) ON DELETE CASCADE,
    read_only              INTEGER NOT NULL DEFAULT 0,
    UNIQUE (keytag, id_asset_element)
);

CREATE TABLE IF NOT EXISTS asset_group_relation (
    id_asset_group_relation INTEGER PRIMARY KEY AUTOINCREMENT,
    id_asset_group          INTEGER NOT NULL REFERENCES asset_element(id_asset_element),
    id_asset_element        INTEGER NOT NULL REFERENCES asset_element(id_asset_element),
    UNIQUE (id_asset_group, id_asset_element)
);

CREATE TABLE IF NOT EXISTS asset_link (
    id_link              INTEGER PRIMARY KEY AUTOINCREMENT,
    id_asset_device_src  INTEGER NOT NULL REFERENCES asset_element(id_asset_element),
    id_asset_device_dest INTEGER NOT NULL REFERENCES asset_element(id_asset_element),
    src_out              TEXT,
    dest_in              TEXT,
    id_asset_link_type   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS monitor_device_type (
    id_device_type INTEGER PRIMARY KEY,
    name           TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS monitor_device (
    id_device      INTEGER PRIMARY KEY AUTOINCREMENT,
    id_device_type INTEGER NOT NULL REFERENCES monitor_device_type(id_device_type),
    name           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS monitor_asset_relation (
    id_ma_relation       INTEGER PRIMARY KEY AUTOINCREMENT,
    id_discovered_device INTEGER NOT NULL REFERENCES monitor_device(id_device),
    id_asset_element     INTEGER NOT NULL REFERENCES asset_element(id_asset_element)
);

INSERT OR IGNORE INTO asset_element_type (id_asset_element_type, name) VALUES
    (1, 'group'),
    (2, 'datacenter'),
    (3, 'room'),
    (4, 'row'),
    (5, 'rack'),
    (6, 'device');

INSERT OR IGNORE INTO asset_device_type (id_asset_device_type, name) VALUES
    (1,  'ups'),
    (2,  'epdu'),
    (3,  'pdu'),
    (4,  'server'),
    (5,  'feed'),
    (6,  'sts'),
    (7,  'switch'),
    (8,  'storage'),
    (9,  'router'),
    (10, 'rack controller'),
    (11, 'sensor'),
    (12, 'appliance'),
    (13, 'patch panel'),
    (14, 'other'),
    (15, 'N_A');

INSERT OR IGNORE INTO monitor_device_type (id_device_type, name) VALUES
    (1, 'datacenter'),
    (2, 'rack'),
    (3, 'ups'),
    (4, 'epdu'),
    (5, 'sensor');
"#;

/// Create (if missing) and seed the inventory schema.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
