// ==========================================
// Asset Inventory - domain type definitions
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Asset status
// ==========================================
// Serialized lowercase, matching the database column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Active,
    Nonactive,
    Spare,
    Retired,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "active",
            AssetStatus::Nonactive => "nonactive",
            AssetStatus::Spare => "spare",
            AssetStatus::Retired => "retired",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AssetStatus::Active),
            "nonactive" => Ok(AssetStatus::Nonactive),
            "spare" => Ok(AssetStatus::Spare),
            "retired" => Ok(AssetStatus::Retired),
            _ => Err(()),
        }
    }
}

// ==========================================
// Row operation
// ==========================================
// An "id" value on the row means Update; its absence means Insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetOperation {
    Insert,
    Update,
}

impl fmt::Display for AssetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetOperation::Insert => write!(f, "insert"),
            AssetOperation::Update => write!(f, "update"),
        }
    }
}

// ==========================================
// Creation mode
// ==========================================
// 1 = single-asset creation request, 2 = CSV bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateMode {
    OneAsset = 1,
    Csv = 2,
}

/// Maximum length of an asset name and of an asset tag.
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum length of a power outlet/inlet code.
pub const MAX_OUTLET_LENGTH: usize = 4;

/// Rack unit range accepted for u_size / location_u_pos.
pub const MIN_U_SIZE: u32 = 1;
pub const MAX_U_SIZE: u32 = 52;

/// Identity reserved for the importing rack controller itself.
pub const RC0_ID: &str = "rackcontroller-0";

/// Sentinel subtype meaning "no subtype recorded".
pub const SUBTYPE_NA: &str = "N_A";
