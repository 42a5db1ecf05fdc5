// ==========================================
// Asset Inventory - API layer
// ==========================================
// Caller-facing operations over the engine and repository.
// ==========================================

pub mod asset_api;
pub mod error;
pub mod import_api;

pub use asset_api::AssetApi;
pub use error::ApiError;
pub use import_api::{ImportApi, ImportApiResponse, ImportRowResult};
