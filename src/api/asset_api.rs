// ==========================================
// Asset Inventory - asset read API
// ==========================================
// Read-back of persisted elements for API callers.
// ==========================================

use crate::api::error::ApiError;
use crate::domain::asset::AssetElement;
use crate::repository::AssetRepository;
use std::sync::Arc;

pub struct AssetApi {
    repo: Arc<AssetRepository>,
}

impl AssetApi {
    pub fn new(repo: Arc<AssetRepository>) -> Self {
        Self { repo }
    }

    /// Element by numeric id, with its ext attributes.
    pub fn get_asset(&self, id: u32) -> Result<AssetElement, ApiError> {
        self.repo
            .select_asset_element(id)?
            .ok_or_else(|| ApiError::NotFound(format!("asset with id={}", id)))
    }

    /// Element by internal or user-facing name.
    pub fn get_asset_by_name(&self, name: &str) -> Result<AssetElement, ApiError> {
        let id = self
            .repo
            .resolve_name(name)?
            .ok_or_else(|| ApiError::NotFound(format!("asset named '{}'", name)))?;
        self.get_asset(id)
    }
}
