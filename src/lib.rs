// ==========================================
// Asset Inventory - core library
// ==========================================
// Models datacenter infrastructure assets (datacenters, rooms, rows,
// racks, devices, groups) and imports them from tabular documents with
// full semantic validation and rack U-space placement checks.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Import source layer - tabular data
pub mod importer;

// Engine layer - validation and orchestration
pub mod engine;

// Configuration layer
pub mod config;

// Database infrastructure (connection init / unified PRAGMAs)
pub mod db;

// Logging
pub mod logging;

// API layer
pub mod api;

// ==========================================
// Re-exports
// ==========================================

// Domain types
pub use domain::types::{AssetOperation, AssetStatus, CreateMode};

// Domain entities
pub use domain::{AssetElement, AssetRow, ExtValue, PowerLink};

// Engine
pub use engine::{
    ImportError, ImportOrchestrator, ImportedRow, Licensing, NotificationSink,
    PermissiveLicensing, PlacementError, RowValidator, TypeCatalog,
};

// Repository
pub use repository::{AssetRepository, RepositoryError};

// Import source
pub use importer::{ImportMeta, Table};

// API
pub use api::{ApiError, AssetApi, ImportApi, ImportApiResponse};

// ==========================================
// Constants
// ==========================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name
pub const APP_NAME: &str = "Asset Inventory";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
