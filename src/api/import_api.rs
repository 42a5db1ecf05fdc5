// ==========================================
// Asset Inventory - import API
// ==========================================
// Responsibility: the caller-facing import entry point. Serializes
// whole import/create calls behind one process-wide lock (the
// persistence layer's uniqueness and rack-space checks are not safe
// under concurrent writers), runs the orchestrator, and publishes
// change events for the committed rows.
// ==========================================

use crate::api::error::ApiError;
use crate::engine::{
    ImportOrchestrator, Licensing, NotificationSink, PermissiveLicensing, TracingNotificationSink,
};
use crate::importer::{ImportMeta, Table};
use crate::repository::AssetRepository;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// At most one in-flight import/create call system-wide.
static IMPORT_LOCK: Mutex<()> = Mutex::new(());

/// Outcome of one row, flattened for API callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRowResult {
    /// 1-based data row number.
    pub row: usize,
    /// Assigned element id on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<u32>,
    /// Internal name on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// "insert" or "update" on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The row committed, but its change event was not published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Import API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// Batch id for tracing this call in the logs.
    pub batch_id: String,
    /// Newly created assets.
    pub imported: usize,
    /// Updated assets.
    pub updated: usize,
    /// Rejected rows.
    pub failed: usize,
    /// Wall time of the call (milliseconds).
    pub elapsed_ms: u64,
    /// Per-row outcomes, in document order.
    pub rows: Vec<ImportRowResult>,
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi {
    repo: Arc<AssetRepository>,
    licensing: Box<dyn Licensing>,
    sink: Box<dyn NotificationSink>,
    check_licensing: bool,
    sanitize_names: bool,
}

impl ImportApi {
    /// API with the permissive licensing backend and the logging sink.
    pub fn new(repo: Arc<AssetRepository>) -> Self {
        Self {
            repo,
            licensing: Box::new(PermissiveLicensing),
            sink: Box::new(TracingNotificationSink),
            check_licensing: false,
            sanitize_names: true,
        }
    }

    pub fn with_licensing(mut self, licensing: Box<dyn Licensing>, enforce: bool) -> Self {
        self.licensing = licensing;
        self.check_licensing = enforce;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_sanitize_names(mut self, sanitize: bool) -> Self {
        self.sanitize_names = sanitize;
        self
    }

    /// Import a CSV document on behalf of `user`.
    pub fn import_csv(&self, csv_text: &str, user: &str) -> Result<ImportApiResponse, ApiError> {
        let table = Table::from_csv(csv_text, ImportMeta::csv_import(user))
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        self.import_table(&table)
    }

    /// Create a single asset from pre-split columns (create mode 1).
    pub fn create_asset(
        &self,
        titles: Vec<String>,
        values: Vec<String>,
        user: &str,
    ) -> Result<ImportApiResponse, ApiError> {
        let table = Table::from_rows(titles, vec![values], ImportMeta::one_asset(user));
        self.import_table(&table)
    }

    fn import_table(&self, table: &Table) -> Result<ImportApiResponse, ApiError> {
        let started = std::time::Instant::now();
        let batch_id = Uuid::new_v4().to_string();

        // poisoning only happens if an import panicked; proceed anyway
        let _guard = IMPORT_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());

        tracing::info!(%batch_id, rows = table.rows(),
            create_mode = ?table.meta().create_mode,
            user = %table.meta().update_user, "import started");

        let orchestrator =
            ImportOrchestrator::new(&self.repo, self.licensing.as_ref(), self.sanitize_names);
        let results = orchestrator.process(table, self.check_licensing)?;

        let mut rows = Vec::with_capacity(results.len());
        let mut imported = 0;
        let mut updated = 0;
        let mut failed = 0;

        for (row, outcome) in &results {
            match outcome {
                Ok(committed) => {
                    match committed.operation {
                        crate::domain::AssetOperation::Insert => imported += 1,
                        crate::domain::AssetOperation::Update => updated += 1,
                    }
                    // best-effort, never rolls the row back; the caller
                    // still learns the event was not published
                    let warning = match self.sink.publish(&committed.element, committed.operation)
                    {
                        Ok(()) => None,
                        Err(error) => {
                            tracing::warn!(row, %error, "change event not published");
                            Some(format!("change event not published: {}", error))
                        }
                    };
                    rows.push(ImportRowResult {
                        row: *row,
                        asset_id: Some(committed.element.id),
                        name: Some(committed.element.name.clone()),
                        operation: Some(committed.operation.to_string()),
                        error: None,
                        warning,
                    });
                }
                Err(error) => {
                    failed += 1;
                    rows.push(ImportRowResult {
                        row: *row,
                        asset_id: None,
                        name: None,
                        operation: None,
                        error: Some(error.to_string()),
                        warning: None,
                    });
                }
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(%batch_id, imported, updated, failed, elapsed_ms, "import finished");

        Ok(ImportApiResponse {
            batch_id,
            imported,
            updated,
            failed,
            elapsed_ms,
            rows,
        })
    }
}
