// ==========================================
// Asset Inventory - import source layer
// ==========================================
// Responsibility: turn external tabular data into a uniform Table of
// named string columns for the validation engine.
// ==========================================

pub mod error;
pub mod table;

pub use error::TableError;
pub use table::{ImportMeta, Table};
