// ==========================================
// Asset Inventory - domain model layer
// ==========================================
// Entities and types only; no data access, no engine logic.
// ==========================================

pub mod asset;
pub mod types;

pub use asset::{AssetElement, AssetRow, ExtValue, PowerLink};
pub use types::{
    AssetOperation, AssetStatus, CreateMode, MAX_NAME_LENGTH, MAX_OUTLET_LENGTH, MAX_U_SIZE,
    MIN_U_SIZE, RC0_ID, SUBTYPE_NA,
};
