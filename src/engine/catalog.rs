// ==========================================
// Asset Inventory - type catalog
// ==========================================
// Read-only reference data: element types and device subtypes, loaded
// once per import run so every row validates against the same view.
// ==========================================

use crate::domain::types::SUBTYPE_NA;
use crate::engine::error::ImportError;
use crate::repository::AssetRepository;
use std::collections::HashMap;

/// Subtype synonyms accepted on input, all mapping to the canonical
/// rack-controller / patch-panel subtype ids.
const RACK_CONTROLLER_SYNONYMS: [&str; 5] = ["rackcontroller", "rackcontroler", "rc", "RC", "RC3"];
const PATCH_PANEL_SYNONYM: &str = "patchpanel";

pub struct TypeCatalog {
    element_types: HashMap<String, u32>,
    device_types: HashMap<String, u32>,
    rack_controller_id: Option<u32>,
    na_id: u32,
}

impl TypeCatalog {
    /// Load both type tables. Either table failing to load is fatal for
    /// the whole import, because every row needs type/subtype ids.
    pub fn load(repo: &AssetRepository) -> Result<Self, ImportError> {
        let element_types = repo
            .read_element_types()
            .map_err(|e| ImportError::Internal(format!("cannot load element types: {}", e)))?;
        let device_types = repo
            .read_device_types()
            .map_err(|e| ImportError::Internal(format!("cannot load device types: {}", e)))?;

        // keys are matched against get_strip output, so normalize once
        let element_types: HashMap<String, u32> = element_types
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        let mut device_types: HashMap<String, u32> = device_types
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        let rack_controller_id = device_types.get("rack controller").copied();
        if let Some(rc_id) = rack_controller_id {
            for synonym in RACK_CONTROLLER_SYNONYMS {
                device_types.insert(synonym.to_lowercase(), rc_id);
            }
        }
        if let Some(pp_id) = device_types.get("patch panel").copied() {
            device_types.insert(PATCH_PANEL_SYNONYM.to_string(), pp_id);
        }

        let na_id = device_types
            .get(&SUBTYPE_NA.to_lowercase())
            .copied()
            .ok_or_else(|| {
                ImportError::Internal(format!("device type table has no '{}' entry", SUBTYPE_NA))
            })?;

        Ok(Self {
            element_types,
            device_types,
            rack_controller_id,
            na_id,
        })
    }

    /// Element type id for a stripped type name.
    pub fn type_id(&self, name: &str) -> Option<u32> {
        self.element_types.get(name).copied()
    }

    /// Device subtype id for a stripped subtype name (synonyms included).
    pub fn subtype_id(&self, name: &str) -> Option<u32> {
        self.device_types.get(name).copied()
    }

    pub fn is_rack_controller(&self, subtype_id: u32) -> bool {
        self.rack_controller_id == Some(subtype_id)
    }

    /// Sentinel subtype id for "no subtype".
    pub fn na_subtype_id(&self) -> u32 {
        self.na_id
    }

    /// Sorted type names, for "expected" error descriptions.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.element_types.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_in_memory_connection};
    use std::sync::{Arc, Mutex};

    fn catalog() -> TypeCatalog {
        let conn = open_in_memory_connection().unwrap();
        init_schema(&conn).unwrap();
        let repo = AssetRepository::new(Arc::new(Mutex::new(conn)));
        TypeCatalog::load(&repo).unwrap()
    }

    #[test]
    fn test_synonyms_resolve_to_canonical_ids() {
        let c = catalog();
        let rc = c.subtype_id("rack controller").unwrap();
        for synonym in ["rackcontroller", "rackcontroler", "rc", "rc3"] {
            assert_eq!(c.subtype_id(synonym), Some(rc), "synonym {}", synonym);
        }
        assert!(c.is_rack_controller(rc));

        let pp = c.subtype_id("patch panel").unwrap();
        assert_eq!(c.subtype_id("patchpanel"), Some(pp));
    }

    #[test]
    fn test_type_lookups() {
        let c = catalog();
        assert!(c.type_id("rack").is_some());
        assert!(c.type_id("device").is_some());
        assert_eq!(c.type_id("blade"), None);
        assert_eq!(c.subtype_id("n_a"), Some(c.na_subtype_id()));
    }
}
