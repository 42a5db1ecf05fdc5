// ==========================================
// Asset Inventory - notification seam
// ==========================================
// Change events for committed rows. Publishing is best-effort: a sink
// failure never rolls back the already-committed write and is reported
// to the caller as its own error class.
// ==========================================

use crate::domain::asset::AssetElement;
use crate::domain::types::AssetOperation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification publish failed: {0}")]
    Publish(String),
}

/// Post-commit change event sink.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, element: &AssetElement, operation: AssetOperation)
        -> Result<(), NotifyError>;
}

/// Default sink: logs the event instead of publishing to a bus.
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn publish(
        &self,
        element: &AssetElement,
        operation: AssetOperation,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            asset_id = element.id,
            name = %element.name,
            operation = %operation,
            status = %element.status,
            "asset change event"
        );
        Ok(())
    }
}
