// ==========================================
// Asset Inventory - licensing seam
// ==========================================
// The licensing agent is a separate service reached over a blocking
// RPC. This module only defines the boundary; callers wrap failures
// into the import error taxonomy.
// ==========================================

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LicensingError {
    #[error("licensing agent unreachable: {0}")]
    Unreachable(String),

    #[error("activation denied: {0}")]
    Denied(String),
}

/// Capability checks and the activation RPC.
pub trait Licensing: Send + Sync {
    /// May this deployment modify the inventory at all?
    fn global_configurability(&self) -> Result<bool, LicensingError>;

    /// Would activating this asset stay within the license limits?
    fn is_activable(&self, asset: &Value) -> Result<bool, LicensingError>;

    /// Activate the asset. Runs outside the row transaction.
    fn activate(&self, asset: &Value) -> Result<(), LicensingError>;
}

/// Licensing backend that allows everything. Used when no licensing
/// agent is deployed, and by most tests.
pub struct PermissiveLicensing;

impl Licensing for PermissiveLicensing {
    fn global_configurability(&self) -> Result<bool, LicensingError> {
        Ok(true)
    }

    fn is_activable(&self, _asset: &Value) -> Result<bool, LicensingError> {
        Ok(true)
    }

    fn activate(&self, _asset: &Value) -> Result<(), LicensingError> {
        Ok(())
    }
}
