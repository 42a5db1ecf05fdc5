// ==========================================
// Asset Inventory - tabular source
// ==========================================
// Responsibility: present parsed CSV (or pre-split rows) as a table of
// string cells with named columns, plus the per-import metadata the
// validator needs. No semantic validation happens here.
// ==========================================

use crate::domain::types::CreateMode;
use crate::importer::error::TableError;
use csv::ReaderBuilder;
use std::collections::HashMap;

// ==========================================
// Import metadata
// ==========================================
/// Out-of-band request context attached to one import call.
#[derive(Debug, Clone)]
pub struct ImportMeta {
    pub create_user: String,
    pub update_user: String,
    pub update_ts: String,
    pub create_mode: CreateMode,
}

impl ImportMeta {
    pub fn csv_import(user: &str) -> Self {
        Self {
            create_user: user.to_string(),
            update_user: user.to_string(),
            update_ts: chrono::Utc::now().to_rfc3339(),
            create_mode: CreateMode::Csv,
        }
    }

    pub fn one_asset(user: &str) -> Self {
        Self {
            create_mode: CreateMode::OneAsset,
            ..Self::csv_import(user)
        }
    }
}

// ==========================================
// Table
// ==========================================
/// A parsed table. Row 0 is the header; data rows are addressed
/// 1-based, matching the row numbers reported back to the caller.
/// Column titles are trimmed and lower-cased at construction, so
/// lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct Table {
    titles: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
    meta: ImportMeta,
}

impl Table {
    /// Build a table from CSV text. Completely blank data rows are
    /// skipped; short rows are padded with empty cells.
    pub fn from_csv(csv_text: &str, meta: ImportMeta) -> Result<Self, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_text.as_bytes());

        let titles: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut cells: Vec<String> =
                record.iter().map(|c| c.trim().to_string()).collect();
            if cells.iter().all(|c| c.is_empty()) {
                continue;
            }
            cells.resize(titles.len(), String::new());
            rows.push(cells);
        }

        Ok(Self::from_rows(titles, rows, meta))
    }

    /// Build a table from already-split rows (single-asset creation).
    pub fn from_rows(titles: Vec<String>, rows: Vec<Vec<String>>, meta: ImportMeta) -> Self {
        let titles: Vec<String> = titles
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .collect();
        let index = titles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self {
            titles,
            index,
            rows,
            meta,
        }
    }

    /// Number of data rows (header excluded).
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.index.contains_key(&title.trim().to_lowercase())
    }

    pub fn meta(&self) -> &ImportMeta {
        &self.meta
    }

    /// Cell at 1-based data row `row`, column `title`.
    pub fn get(&self, row: usize, title: &str) -> Result<&str, TableError> {
        let col = self
            .index
            .get(&title.trim().to_lowercase())
            .ok_or_else(|| TableError::UnknownColumn {
                title: title.to_string(),
            })?;
        let cells = self
            .rows
            .get(row.checked_sub(1).ok_or(TableError::RowOutOfRange { row })?)
            .ok_or(TableError::RowOutOfRange { row })?;
        Ok(cells.get(*col).map(String::as_str).unwrap_or(""))
    }

    /// Like `get`, additionally trimmed and lower-cased.
    pub fn get_strip(&self, row: usize, title: &str) -> Result<String, TableError> {
        Ok(self.get(row, title)?.trim().to_lowercase())
    }
}
