// ==========================================
// Asset Inventory - asset repository
// ==========================================
// Responsibility: all reads/writes of asset_element and its satellite
// tables. Composite writes run inside one transaction per call; the
// caller decides which write to issue, this layer contains no
// import-policy logic.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::asset::{AssetElement, AssetRow, ExtValue};
use crate::domain::types::AssetStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// AssetRepository
// ==========================================
pub struct AssetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssetRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Open a repository over a database file, bootstrapping the schema.
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        crate::db::init_schema(&conn)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Lookups
    // ==========================================

    /// Internal name -> element id.
    pub fn name_to_asset_id(&self, name: &str) -> RepositoryResult<Option<u32>> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                "SELECT id_asset_element FROM asset_element WHERE name = ?1",
                params![name],
                |row| row.get::<_, u32>(0),
            )
            .optional()?;
        Ok(id)
    }

    /// User-facing name (ext attribute "name") -> internal name.
    pub fn ext_name_to_asset_name(&self, ext_name: &str) -> RepositoryResult<Option<String>> {
        let conn = self.lock()?;
        let name = conn
            .query_row(
                r#"
                SELECT e.name
                FROM asset_element e
                JOIN asset_ext_attributes a ON a.id_asset_element = e.id_asset_element
                WHERE a.keytag = 'name' AND a.value = ?1
                "#,
                params![ext_name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(name)
    }

    /// Resolve a user-supplied name to an element id, trying the
    /// internal name first and the "name" ext attribute second.
    pub fn resolve_name(&self, name: &str) -> RepositoryResult<Option<u32>> {
        if let Some(id) = self.name_to_asset_id(name)? {
            return Ok(Some(id));
        }
        match self.ext_name_to_asset_name(name)? {
            Some(internal) => self.name_to_asset_id(&internal),
            None => Ok(None),
        }
    }

    pub fn read_element_types(&self) -> RepositoryResult<HashMap<String, u32>> {
        self.read_type_table("asset_element_type", "id_asset_element_type")
    }

    pub fn read_device_types(&self) -> RepositoryResult<HashMap<String, u32>> {
        self.read_type_table("asset_device_type", "id_asset_device_type")
    }

    fn read_type_table(&self, table: &str, id_col: &str) -> RepositoryResult<HashMap<String, u32>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT name, {} FROM {}", id_col, table))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut map = HashMap::new();
        for row in rows {
            let (name, id) = row?;
            map.insert(name, id);
        }
        Ok(map)
    }

    /// Read one element with its ext attributes.
    pub fn select_asset_element(&self, id: u32) -> RepositoryResult<Option<AssetElement>> {
        let conn = self.lock()?;
        let core = conn
            .query_row(
                r#"
                SELECT id_asset_element, name, id_type, id_subtype, id_parent,
                       status, priority, asset_tag
                FROM asset_element
                WHERE id_asset_element = ?1
                "#,
                params![id],
                Self::map_element_row,
            )
            .optional()?;

        let Some(mut element) = core else {
            return Ok(None);
        };
        element.ext = Self::select_ext_attributes_conn(&conn, id)?;
        Ok(Some(element))
    }

    pub fn select_asset_element_by_name(&self, name: &str) -> RepositoryResult<Option<AssetElement>> {
        let id = self.name_to_asset_id(name)?;
        match id {
            Some(id) => self.select_asset_element(id),
            None => Ok(None),
        }
    }

    fn map_element_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssetElement> {
        let status_raw: String = row.get(5)?;
        let status = status_raw.parse::<AssetStatus>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                format!("unknown status '{}'", status_raw).into(),
            )
        })?;
        Ok(AssetElement {
            id: row.get(0)?,
            name: row.get(1)?,
            type_id: row.get(2)?,
            subtype_id: row.get(3)?,
            parent_id: row.get::<_, Option<u32>>(4)?.unwrap_or(0),
            status,
            priority: row.get(6)?,
            asset_tag: row.get(7)?,
            ext: BTreeMap::new(),
        })
    }

    pub fn select_ext_attributes(&self, id: u32) -> RepositoryResult<BTreeMap<String, ExtValue>> {
        let conn = self.lock()?;
        Self::select_ext_attributes_conn(&conn, id)
    }

    fn select_ext_attributes_conn(
        conn: &Connection,
        id: u32,
    ) -> RepositoryResult<BTreeMap<String, ExtValue>> {
        let mut stmt = conn.prepare(
            "SELECT keytag, value, read_only FROM asset_ext_attributes WHERE id_asset_element = ?1",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                ExtValue {
                    value: row.get(1)?,
                    read_only: row.get::<_, i64>(2)? != 0,
                },
            ))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Single ext attribute value, if recorded.
    pub fn select_ext_attribute(&self, id: u32, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM asset_ext_attributes WHERE id_asset_element = ?1 AND keytag = ?2",
                params![id, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Ids of all direct children of `parent_id`.
    pub fn select_assets_by_parent(&self, parent_id: u32) -> RepositoryResult<Vec<u32>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id_asset_element FROM asset_element WHERE id_parent = ?1")?;
        let rows = stmt.query_map(params![parent_id], |row| row.get::<_, u32>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    // ==========================================
    // Composite writes (one transaction per call)
    // ==========================================

    /// Insert a new element with its ext attributes, group memberships
    /// and power links, plus a monitor-device shadow when `monitor_type`
    /// is given, all in one transaction. Returns the assigned element id.
    pub fn insert_asset(
        &self,
        row: &AssetRow,
        status: AssetStatus,
        monitor_type: Option<&str>,
    ) -> RepositoryResult<u32> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let id = Self::insert_element_tx(&tx, row, status)?;
        Self::insert_ext_attributes_tx(&tx, id, &row.ext)?;
        Self::insert_groups_tx(&tx, id, row)?;
        Self::replace_power_links_tx(&tx, id, row)?;
        if let Some(monitor_type) = monitor_type {
            Self::insert_monitor_shadow_tx(&tx, id, &row.name, monitor_type)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(id)
    }

    /// Update an existing element: core fields, ext attributes
    /// (read-write replaced, read-only inserted if new), group
    /// memberships and power links replaced wholesale.
    pub fn update_asset(&self, row: &AssetRow, status: AssetStatus) -> RepositoryResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Self::update_element_tx(&tx, row, status)?;
        Self::replace_ext_attributes_tx(&tx, row.id, &row.ext)?;
        Self::replace_groups_tx(&tx, row.id, row)?;
        if row.is_device() {
            Self::replace_power_links_tx(&tx, row.id, row)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Flip only the status column (post-activation).
    pub fn update_asset_status(&self, id: u32, status: AssetStatus) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE asset_element SET status = ?1 WHERE id_asset_element = ?2",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "asset_element".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Whether a monitor-device shadow is registered for `asset_id`.
    pub fn has_monitor_shadow(&self, asset_id: u32) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM monitor_asset_relation WHERE id_asset_element = ?1",
            params![asset_id],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    // ==========================================
    // Transaction-scoped helpers
    // ==========================================

    fn insert_element_tx(
        tx: &Transaction,
        row: &AssetRow,
        status: AssetStatus,
    ) -> RepositoryResult<u32> {
        tx.execute(
            r#"
            INSERT INTO asset_element (name, id_type, id_subtype, id_parent, status, priority, asset_tag)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                row.name,
                row.type_id,
                row.subtype_id,
                if row.parent_id == 0 { None } else { Some(row.parent_id) },
                status.as_str(),
                row.priority,
                row.asset_tag,
            ],
        )?;
        Ok(tx.last_insert_rowid() as u32)
    }

    fn update_element_tx(
        tx: &Transaction,
        row: &AssetRow,
        status: AssetStatus,
    ) -> RepositoryResult<()> {
        let changed = tx.execute(
            r#"
            UPDATE asset_element
            SET name = ?1, id_type = ?2, id_subtype = ?3, id_parent = ?4,
                status = ?5, priority = ?6, asset_tag = ?7
            WHERE id_asset_element = ?8
            "#,
            params![
                row.name,
                row.type_id,
                row.subtype_id,
                if row.parent_id == 0 { None } else { Some(row.parent_id) },
                status.as_str(),
                row.priority,
                row.asset_tag,
                row.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "asset_element".to_string(),
                id: row.id.to_string(),
            });
        }
        Ok(())
    }

    fn insert_ext_attributes_tx(
        tx: &Transaction,
        id: u32,
        ext: &BTreeMap<String, ExtValue>,
    ) -> RepositoryResult<()> {
        let mut stmt = tx.prepare(
            "INSERT INTO asset_ext_attributes (keytag, value, id_asset_element, read_only) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (key, value) in ext {
            stmt.execute(params![key, value.value, id, value.read_only as i64])?;
        }
        Ok(())
    }

    /// Read-write attributes are dropped and re-inserted; read-only
    /// attributes are only inserted when not yet present.
    fn replace_ext_attributes_tx(
        tx: &Transaction,
        id: u32,
        ext: &BTreeMap<String, ExtValue>,
    ) -> RepositoryResult<()> {
        tx.execute(
            "DELETE FROM asset_ext_attributes WHERE id_asset_element = ?1 AND read_only = 0",
            params![id],
        )?;

        let mut insert_rw = tx.prepare(
            "INSERT INTO asset_ext_attributes (keytag, value, id_asset_element, read_only) VALUES (?1, ?2, ?3, 0)",
        )?;
        let mut insert_ro = tx.prepare(
            "INSERT OR IGNORE INTO asset_ext_attributes (keytag, value, id_asset_element, read_only) VALUES (?1, ?2, ?3, 1)",
        )?;
        for (key, value) in ext {
            if value.read_only {
                insert_ro.execute(params![key, value.value, id])?;
            } else {
                insert_rw.execute(params![key, value.value, id])?;
            }
        }
        Ok(())
    }

    /// Monitor-device shadow for types with a monitor mapping. Runs
    /// inside the element's insert transaction; unmapped types are
    /// skipped silently.
    fn insert_monitor_shadow_tx(
        tx: &Transaction,
        asset_id: u32,
        asset_name: &str,
        monitor_type: &str,
    ) -> RepositoryResult<bool> {
        let type_id: Option<u32> = tx
            .query_row(
                "SELECT id_device_type FROM monitor_device_type WHERE name = ?1",
                params![monitor_type],
                |row| row.get(0),
            )
            .optional()?;
        let Some(type_id) = type_id else {
            return Ok(false);
        };

        tx.execute(
            "INSERT INTO monitor_device (id_device_type, name) VALUES (?1, ?2)",
            params![type_id, asset_name],
        )?;
        let device_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO monitor_asset_relation (id_discovered_device, id_asset_element) VALUES (?1, ?2)",
            params![device_id, asset_id],
        )?;
        Ok(true)
    }

    fn insert_groups_tx(tx: &Transaction, id: u32, row: &AssetRow) -> RepositoryResult<()> {
        let mut stmt = tx.prepare(
            "INSERT INTO asset_group_relation (id_asset_group, id_asset_element) VALUES (?1, ?2)",
        )?;
        for group_id in &row.group_ids {
            stmt.execute(params![group_id, id])?;
        }
        Ok(())
    }

    fn replace_groups_tx(tx: &Transaction, id: u32, row: &AssetRow) -> RepositoryResult<()> {
        tx.execute(
            "DELETE FROM asset_group_relation WHERE id_asset_element = ?1",
            params![id],
        )?;
        Self::insert_groups_tx(tx, id, row)
    }

    /// Delete-all-then-reinsert; the destination id is fixed to the
    /// element id assigned in this transaction.
    fn replace_power_links_tx(tx: &Transaction, dest_id: u32, row: &AssetRow) -> RepositoryResult<()> {
        tx.execute(
            "DELETE FROM asset_link WHERE id_asset_device_dest = ?1",
            params![dest_id],
        )?;

        let mut stmt = tx.prepare(
            r#"
            INSERT INTO asset_link (id_asset_device_src, id_asset_device_dest, src_out, dest_in)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )?;
        for link in &row.power_links {
            stmt.execute(params![link.src_id, dest_id, link.src_out, link.dest_in])?;
        }
        Ok(())
    }

    /// Power links terminating at `dest_id` (src id, src_out, dest_in).
    pub fn select_power_links_to(
        &self,
        dest_id: u32,
    ) -> RepositoryResult<Vec<(u32, Option<String>, Option<String>)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id_asset_device_src, src_out, dest_in FROM asset_link WHERE id_asset_device_dest = ?1",
        )?;
        let rows = stmt.query_map(params![dest_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?;

        let mut links = Vec::new();
        for row in rows {
            links.push(row?);
        }
        Ok(links)
    }
}
