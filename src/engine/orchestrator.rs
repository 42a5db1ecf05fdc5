// ==========================================
// Asset Inventory - import orchestrator
// ==========================================
// Responsibility: drive one import call. Batch-level failures abort
// before any row; row-level failures are recorded per row and never
// stop the batch. Each row commits in its own transaction, so a later
// row can reference elements a previous row just created.
// ==========================================

use crate::domain::asset::{AssetElement, AssetRow};
use crate::domain::types::{AssetOperation, AssetStatus, RC0_ID};
use crate::engine::catalog::TypeCatalog;
use crate::engine::error::ImportError;
use crate::engine::licensing::Licensing;
use crate::engine::validator::{RowValidator, MANDATORY_COLUMNS};
use crate::importer::Table;
use crate::repository::AssetRepository;
use std::collections::{BTreeMap, HashSet};

/// One successfully committed row.
#[derive(Debug, Clone)]
pub struct ImportedRow {
    pub element: AssetElement,
    pub operation: AssetOperation,
}

/// Per-row outcome map: 1-based row number -> committed row or the
/// row's error.
pub type RowResults = BTreeMap<usize, Result<ImportedRow, ImportError>>;

// ==========================================
// ImportOrchestrator
// ==========================================
pub struct ImportOrchestrator<'a> {
    repo: &'a AssetRepository,
    licensing: &'a dyn Licensing,
    sanitize_names: bool,
}

impl<'a> ImportOrchestrator<'a> {
    pub fn new(
        repo: &'a AssetRepository,
        licensing: &'a dyn Licensing,
        sanitize_names: bool,
    ) -> Self {
        Self {
            repo,
            licensing,
            sanitize_names,
        }
    }

    /// Process the whole document. The returned map always covers every
    /// data row; only batch-level failures surface as `Err`.
    pub fn process(&self, table: &Table, check_licensing: bool) -> Result<RowResults, ImportError> {
        // batch-level: mandatory columns must exist at all
        for column in MANDATORY_COLUMNS {
            if !table.has_title(column) {
                return Err(ImportError::param_required(column));
            }
        }
        if table.rows() == 0 {
            return Err(ImportError::BadRequestDocument(
                "document contains no data rows".to_string(),
            ));
        }

        // batch-level: licensing gate before touching any row
        if check_licensing {
            let allowed = self
                .licensing
                .global_configurability()
                .map_err(|e| ImportError::Internal(e.to_string()))?;
            if !allowed {
                return Err(ImportError::ActionForbidden(
                    "license does not permit inventory changes (global_configurability)"
                        .to_string(),
                ));
            }
        }

        let catalog = TypeCatalog::load(self.repo)?;
        let rc0 = self.detect_rc0(table);
        let validator = RowValidator::new(self.repo, &catalog, self.sanitize_names);

        let mut seen_ids: HashSet<u32> = HashSet::new();
        let mut results: RowResults = BTreeMap::new();

        for row in 1..=table.rows() {
            let outcome = validator
                .validate_row(table, row, rc0, &seen_ids)
                .and_then(|asset_row| {
                    let operation = asset_row.operation;
                    self.write_row(&asset_row, check_licensing)
                        .map(|element| ImportedRow { element, operation })
                });

            match &outcome {
                Ok(imported) => {
                    seen_ids.insert(imported.element.id);
                    tracing::info!(row, asset_id = imported.element.id,
                        name = %imported.element.name, operation = %imported.operation,
                        "row imported");
                }
                Err(error) => {
                    tracing::warn!(row, %error, "row rejected");
                }
            }
            results.insert(row, outcome);
        }

        Ok(results)
    }

    /// First row claiming the RC-0 identity is the canonical self.
    fn detect_rc0(&self, table: &Table) -> Option<usize> {
        if !table.has_title("id") {
            return None;
        }
        (1..=table.rows()).find(|&row| {
            table
                .get(row, "id")
                .map(|value| value.trim() == RC0_ID)
                .unwrap_or(false)
        })
    }

    // ==========================================
    // Row write dispatch
    // ==========================================

    fn write_row(
        &self,
        row: &AssetRow,
        check_licensing: bool,
    ) -> Result<AssetElement, ImportError> {
        if row.is_device() {
            match row.operation {
                AssetOperation::Update => self.update_device(row, check_licensing),
                AssetOperation::Insert => self.insert_device(row, check_licensing),
            }
        } else {
            match row.operation {
                AssetOperation::Update => self.update_container(row),
                AssetOperation::Insert => self.insert_container(row),
            }
        }
    }

    /// datacenter / room / row / rack / group, update.
    fn update_container(&self, row: &AssetRow) -> Result<AssetElement, ImportError> {
        self.guard_root_status(row.id, row.status)?;
        self.repo.update_asset(row, row.status)?;
        self.read_back(row.id)
    }

    /// datacenter / room / row / rack / group, insert.
    fn insert_container(&self, row: &AssetRow) -> Result<AssetElement, ImportError> {
        self.guard_insert_conflict(row)?;
        if row.status == AssetStatus::Nonactive {
            return Err(ImportError::bad_params(
                "status",
                "nonactive",
                "a status other than nonactive at creation",
            ));
        }
        // datacenters and racks carry a monitor-device shadow, written
        // in the same transaction as the element
        let monitor_type = matches!(row.type_name.as_str(), "datacenter" | "rack")
            .then(|| row.type_name.as_str());
        let id = self.repo.insert_asset(row, row.status, monitor_type)?;
        self.read_back(id)
    }

    fn update_device(
        &self,
        row: &AssetRow,
        check_licensing: bool,
    ) -> Result<AssetElement, ImportError> {
        let two_step = self.needs_activation(row, check_licensing);
        // RC-0-self keeps its submitted status; an activatable device is
        // parked nonactive until the activation RPC succeeds
        let written_status = if row.is_rc0_self {
            row.status
        } else if two_step {
            AssetStatus::Nonactive
        } else {
            row.status
        };
        self.guard_root_status(row.id, written_status)?;
        self.repo.update_asset(row, written_status)?;

        if two_step {
            self.activate(row.id)?;
        }
        self.read_back(row.id)
    }

    fn insert_device(
        &self,
        row: &AssetRow,
        check_licensing: bool,
    ) -> Result<AssetElement, ImportError> {
        self.guard_insert_conflict(row)?;

        if row.is_rack_controller {
            // rack controllers bypass the create-nonactive-then-activate
            // two-step and are created with the submitted status
            let id = self
                .repo
                .insert_asset(row, row.status, Some(&row.subtype_name))?;
            return self.read_back(id);
        }

        let two_step = self.needs_activation(row, check_licensing);
        let initial_status = if two_step {
            AssetStatus::Nonactive
        } else {
            row.status
        };
        let id = self
            .repo
            .insert_asset(row, initial_status, Some(&row.subtype_name))?;

        if two_step {
            self.activate(id)?;
        }
        self.read_back(id)
    }

    /// The activation two-step applies to devices that want to be
    /// active, are not rack controllers, and only when the caller asked
    /// for licensing enforcement.
    fn needs_activation(&self, row: &AssetRow, check_licensing: bool) -> bool {
        check_licensing
            && row.is_device()
            && !row.is_rack_controller
            && row.status == AssetStatus::Active
    }

    /// Runs after the row's transaction committed. Failure leaves the
    /// asset persisted (nonactive) and is reported as the row's error.
    fn activate(&self, id: u32) -> Result<(), ImportError> {
        let element = self.read_back(id)?;
        let payload = serde_json::to_value(&element)
            .map_err(|e| ImportError::Internal(format!("cannot serialize asset: {}", e)))?;

        let activable = self
            .licensing
            .is_activable(&payload)
            .map_err(|e| ImportError::Licensing(e.to_string()))?;
        if !activable {
            return Err(ImportError::Licensing(format!(
                "asset '{}' exceeds the licensed power-device limit",
                element.name
            )));
        }
        self.licensing
            .activate(&payload)
            .map_err(|e| ImportError::Licensing(e.to_string()))?;

        self.repo.update_asset_status(id, AssetStatus::Active)?;
        Ok(())
    }

    /// The root element (id 1) must stay activable.
    fn guard_root_status(&self, id: u32, status: AssetStatus) -> Result<(), ImportError> {
        if id == 1 && status == AssetStatus::Nonactive {
            return Err(ImportError::bad_params(
                "status",
                "nonactive",
                "an activable status for the root element",
            ));
        }
        Ok(())
    }

    /// Insert conflict check by name: an existing element with the same
    /// internal or user-facing name rejects the row.
    fn guard_insert_conflict(&self, row: &AssetRow) -> Result<(), ImportError> {
        if self.repo.name_to_asset_id(&row.name)?.is_some()
            || self.repo.resolve_name(&row.ext_name)?.is_some()
        {
            return Err(ImportError::BadRequestDocument(format!(
                "asset '{}' already exists",
                row.ext_name
            )));
        }
        Ok(())
    }

    fn read_back(&self, id: u32) -> Result<AssetElement, ImportError> {
        self.repo
            .select_asset_element(id)?
            .ok_or_else(|| ImportError::Internal(format!("committed asset {} vanished", id)))
    }
}
