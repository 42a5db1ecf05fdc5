// ==========================================
// Asset Inventory - importer layer errors
// ==========================================

use thiserror::Error;

/// Tabular source errors
#[derive(Error, Debug)]
pub enum TableError {
    #[error("unknown column: {title}")]
    UnknownColumn { title: String },

    #[error("row out of range: {row}")]
    RowOutOfRange { row: usize },

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),
}
