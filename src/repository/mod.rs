// ==========================================
// Asset Inventory - data repository layer
// ==========================================
// Responsibility: data access only, parameterized queries throughout.
// No import-policy logic lives here.
// ==========================================

pub mod asset_repo;
pub mod error;

pub use asset_repo::AssetRepository;
pub use error::{RepositoryError, RepositoryResult};
