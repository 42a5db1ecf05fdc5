// ==========================================
// Asset Inventory - configuration layer
// ==========================================
// Runtime configuration from the environment. This service carries no
// config store of its own; everything it needs fits in three knobs.
// ==========================================

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database path.
    pub db_path: String,
    /// Enforce the licensing gate and device activation on import.
    pub check_licensing: bool,
    /// Sanitize user-supplied names into identifier-safe form.
    pub sanitize_names: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "asset-inventory.db".to_string(),
            check_licensing: false,
            sanitize_names: true,
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment, falling back to the
    /// defaults above.
    ///
    /// # Environment
    /// - ASSET_INVENTORY_DB: database file path
    /// - ASSET_INVENTORY_CHECK_LICENSING: "1"/"true" enables the gate
    /// - ASSET_INVENTORY_SANITIZE_NAMES: "0"/"false" disables sanitation
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: std::env::var("ASSET_INVENTORY_DB").unwrap_or(defaults.db_path),
            check_licensing: env_flag("ASSET_INVENTORY_CHECK_LICENSING")
                .unwrap_or(defaults.check_licensing),
            sanitize_names: env_flag("ASSET_INVENTORY_SANITIZE_NAMES")
                .unwrap_or(defaults.sanitize_names),
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
