// ==========================================
// Asset Inventory - engine layer
// ==========================================
// Business rules of the import pipeline: validation, placement,
// orchestration, and the licensing/notification seams. All database
// access goes through the repository.
// ==========================================

pub mod catalog;
pub mod error;
pub mod licensing;
pub mod notification;
pub mod orchestrator;
pub mod placement;
pub mod validator;

pub use catalog::TypeCatalog;
pub use error::ImportError;
pub use licensing::{Licensing, LicensingError, PermissiveLicensing};
pub use notification::{NotificationSink, NotifyError, TracingNotificationSink};
pub use orchestrator::{ImportOrchestrator, ImportedRow, RowResults};
pub use placement::{try_place_asset, PlacementError};
pub use validator::{match_ext_attr, parse_priority, RowValidator, MANDATORY_COLUMNS};
