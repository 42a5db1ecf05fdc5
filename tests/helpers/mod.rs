// ==========================================
// Shared test fixtures
// ==========================================

#![allow(dead_code)]

use asset_inventory::api::{ImportApi, ImportApiResponse, ImportRowResult};
use asset_inventory::db::{init_schema, open_in_memory_connection};
use asset_inventory::repository::AssetRepository;
use std::sync::{Arc, Mutex};

/// Fresh repository over an in-memory database with the full schema.
pub fn setup_repo() -> Arc<AssetRepository> {
    let conn = open_in_memory_connection().unwrap();
    init_schema(&conn).unwrap();
    Arc::new(AssetRepository::new(Arc::new(Mutex::new(conn))))
}

/// Run a CSV import with defaults (no licensing, name sanitation on).
pub fn import(repo: &Arc<AssetRepository>, csv: &str) -> ImportApiResponse {
    ImportApi::new(Arc::clone(repo))
        .import_csv(csv, "tester")
        .expect("batch-level import failure")
}

/// The outcome of 1-based data row `row`.
pub fn row<'a>(response: &'a ImportApiResponse, row: usize) -> &'a ImportRowResult {
    response
        .rows
        .iter()
        .find(|r| r.row == row)
        .unwrap_or_else(|| panic!("no outcome for row {}", row))
}

/// The element id assigned to row `row`, panicking on a failed row.
pub fn row_id(response: &ImportApiResponse, index: usize) -> u32 {
    let outcome = row(response, index);
    outcome.asset_id.unwrap_or_else(|| {
        panic!(
            "row {} failed: {}",
            index,
            outcome.error.as_deref().unwrap_or("unknown")
        )
    })
}

/// The error message of row `row`, panicking on a successful row.
pub fn row_error<'a>(response: &'a ImportApiResponse, index: usize) -> &'a str {
    row(response, index)
        .error
        .as_deref()
        .unwrap_or_else(|| panic!("row {} unexpectedly succeeded", index))
}
