// ==========================================
// Asset Inventory - asset entities
// ==========================================
// AssetRow is the transient, validated shape of one imported line.
// AssetElement is the persisted shape handed to callers and to the
// notification sink after a commit.
// ==========================================

use crate::domain::types::{AssetOperation, AssetStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// Ext attribute value
// ==========================================
/// A single extended attribute. Read-only attributes are inserted once
/// and never replaced by later updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtValue {
    pub value: String,
    pub read_only: bool,
}

impl ExtValue {
    pub fn rw(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            read_only: false,
        }
    }

    pub fn ro(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            read_only: true,
        }
    }
}

// ==========================================
// Power link
// ==========================================
/// One power-chain edge: the row's device draws power from `src_id`.
/// Outlet/inlet codes are free-form, at most 4 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerLink {
    pub src_id: u32,
    pub src_out: Option<String>,
    pub dest_in: Option<String>,
}

// ==========================================
// AssetRow - one validated import line
// ==========================================
/// Fully validated and normalized content of one import row, ready for
/// the orchestrator's write dispatch. Nothing here has touched the
/// database yet except the lookups performed during validation.
#[derive(Debug, Clone)]
pub struct AssetRow {
    /// 1-based data row number (header excluded).
    pub row: usize,
    /// Existing element id when updating; 0 when inserting.
    pub id: u32,
    pub operation: AssetOperation,
    /// Internal, unique name.
    pub name: String,
    /// User-facing name, stored as ext attribute "name".
    pub ext_name: String,
    pub type_name: String,
    pub type_id: u32,
    pub subtype_name: String,
    pub subtype_id: u32,
    pub status: AssetStatus,
    pub priority: u8,
    pub asset_tag: Option<String>,
    /// 0 = no parent.
    pub parent_id: u32,
    pub group_ids: BTreeSet<u32>,
    pub power_links: Vec<PowerLink>,
    pub ext: BTreeMap<String, ExtValue>,
    /// The row was recognized as this machine's own rack controller.
    pub is_rc0_self: bool,
    /// The row's subtype is the rack-controller subtype.
    pub is_rack_controller: bool,
}

impl AssetRow {
    pub fn is_device(&self) -> bool {
        self.type_name == "device"
    }

    pub fn is_group(&self) -> bool {
        self.type_name == "group"
    }

    /// Ext attribute value by key, if collected.
    pub fn ext_value(&self, key: &str) -> Option<&str> {
        self.ext.get(key).map(|v| v.value.as_str())
    }
}

// ==========================================
// AssetElement - persisted element
// ==========================================
/// A committed asset as read back from the store. This is the payload
/// serialized for the activation RPC and the notification sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetElement {
    pub id: u32,
    pub name: String,
    pub status: AssetStatus,
    pub parent_id: u32,
    pub priority: u8,
    pub type_id: u32,
    pub subtype_id: u32,
    pub asset_tag: Option<String>,
    pub ext: BTreeMap<String, ExtValue>,
}

impl AssetElement {
    /// User-facing name: the "name" ext attribute when present,
    /// otherwise the internal name.
    pub fn ext_name(&self) -> &str {
        self.ext
            .get("name")
            .map(|v| v.value.as_str())
            .unwrap_or(&self.name)
    }
}
