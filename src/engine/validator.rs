// ==========================================
// Asset Inventory - row validation engine
// ==========================================
// Responsibility: turn one raw table row into a validated, normalized
// AssetRow, or a typed error. Performs all name/id resolution against
// the repository but writes nothing.
// ==========================================

use crate::domain::asset::{AssetElement, AssetRow, ExtValue, PowerLink};
use crate::domain::types::{
    AssetOperation, AssetStatus, MAX_NAME_LENGTH, MAX_OUTLET_LENGTH, MAX_U_SIZE, MIN_U_SIZE,
    RC0_ID,
};
use crate::engine::catalog::TypeCatalog;
use crate::engine::error::ImportError;
use crate::engine::placement;
use crate::importer::Table;
use crate::repository::AssetRepository;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Columns every import document must carry.
pub const MANDATORY_COLUMNS: [&str; 6] =
    ["name", "type", "sub_type", "location", "status", "priority"];

/// Accepted date formats for warranty_end / *_date ext attributes, in
/// match order. The value is re-emitted in the first format that parses.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%d %b %Y"];

/// Ext keys stored read-only: inserted once, never replaced on update.
const READ_ONLY_EXT_KEYS: [&str; 4] = ["serial_no", "uuid", "model", "manufacturer"];

/// Hardware columns excluded for rows that claim the RC-0 identity
/// without being this machine's own rack controller.
const HW_COLUMNS: [&str; 5] = ["fqdn", "serial_no", "model", "manufacturer", "uuid"];

// ==========================================
// RowValidator
// ==========================================
pub struct RowValidator<'a> {
    repo: &'a AssetRepository,
    catalog: &'a TypeCatalog,
    sanitize_names: bool,
}

impl<'a> RowValidator<'a> {
    pub fn new(repo: &'a AssetRepository, catalog: &'a TypeCatalog, sanitize_names: bool) -> Self {
        Self {
            repo,
            catalog,
            sanitize_names,
        }
    }

    /// Validate data row `row` (1-based). `rc0` is the row index
    /// recognized as this machine's own rack controller, if any;
    /// `seen_ids` holds the numeric ids of rows already processed in
    /// this batch.
    pub fn validate_row(
        &self,
        table: &Table,
        row: usize,
        rc0: Option<usize>,
        seen_ids: &HashSet<u32>,
    ) -> Result<AssetRow, ImportError> {
        let mut consumed: HashSet<String> = HashSet::new();
        for title in ["id", "name", "type", "sub_type", "location", "status", "priority", "asset_tag"]
        {
            consumed.insert(title.to_string());
        }

        // === identity: id column, RC-0 special-casing ===
        let mut id_value = if table.has_title("id") {
            table.get(row, "id")?.trim().to_string()
        } else {
            String::new()
        };
        let mut is_rc0_self = false;
        let mut suppress_hw = false;
        if id_value == RC0_ID {
            if rc0 == Some(row) {
                is_rc0_self = true;
            } else {
                // a second claimant: treated as a plain asset
                id_value.clear();
                suppress_hw = true;
            }
        }

        let mut id: u32 = 0;
        let mut existing: Option<AssetElement> = None;
        if !id_value.is_empty() {
            match self.resolve_id(&id_value)? {
                Some(resolved) => {
                    if seen_ids.contains(&resolved) {
                        return Err(ImportError::BadRequestDocument(format!(
                            "id '{}' found twice in the document",
                            id_value
                        )));
                    }
                    id = resolved;
                    existing = self.repo.select_asset_element(id)?;
                    if existing.is_none() {
                        return Err(ImportError::not_found(id_value));
                    }
                }
                None if is_rc0_self => {
                    // first import on this machine: the self row inserts
                }
                None => return Err(ImportError::not_found(id_value)),
            }
        }
        let operation = if id != 0 {
            AssetOperation::Update
        } else {
            AssetOperation::Insert
        };

        // === name ===
        let raw_name = table.get(row, "name")?.trim().to_string();
        if raw_name.is_empty() {
            return Err(ImportError::param_required("name"));
        }
        let ext_name = raw_name.clone();
        let candidate = if self.sanitize_names {
            sanitize_name(&raw_name)
        } else {
            raw_name.clone()
        };
        if candidate.chars().count() > MAX_NAME_LENGTH {
            return Err(ImportError::bad_params(
                "name",
                &raw_name,
                format!("at most {} characters", MAX_NAME_LENGTH),
            ));
        }

        let resolved_by_name = self.repo.resolve_name(&raw_name)?;
        let name = match (&existing, resolved_by_name) {
            (Some(element), Some(resolved)) if resolved != element.id => {
                return Err(ImportError::bad_params(
                    "name",
                    &raw_name,
                    "a name not held by another asset (already existing name)",
                ));
            }
            // updating: the internal name never changes
            (Some(element), _) => element.name.clone(),
            (None, _) if is_rc0_self => RC0_ID.to_string(),
            (None, _) => candidate,
        };

        // === type / status / priority / asset tag ===
        let type_name = table.get_strip(row, "type")?;
        let type_id = self.catalog.type_id(&type_name).ok_or_else(|| {
            ImportError::bad_params(
                "type",
                &type_name,
                format!("one of [{}]", self.catalog.type_names().join(", ")),
            )
        })?;

        let status_value = table.get_strip(row, "status")?;
        let status: AssetStatus = status_value.parse().map_err(|_| {
            ImportError::bad_params(
                "status",
                &status_value,
                "one of [active, nonactive, spare, retired]",
            )
        })?;

        let priority = parse_priority(&table.get_strip(row, "priority")?);

        let asset_tag = if table.has_title("asset_tag") {
            let tag = table.get(row, "asset_tag")?.trim().to_string();
            if tag.chars().count() > MAX_NAME_LENGTH {
                return Err(ImportError::bad_params(
                    "asset_tag",
                    &tag,
                    format!("at most {} characters", MAX_NAME_LENGTH),
                ));
            }
            (!tag.is_empty()).then_some(tag)
        } else {
            None
        };

        // === subtype ===
        let subtype_name = table.get_strip(row, "sub_type")?;
        let mut is_rack_controller = false;
        let subtype_id = if type_name == "device" {
            if subtype_name.is_empty() {
                return Err(ImportError::param_required("sub_type"));
            }
            let subtype_id = self.catalog.subtype_id(&subtype_name).ok_or_else(|| {
                ImportError::bad_params("sub_type", &subtype_name, "a known device subtype")
            })?;
            is_rack_controller = self.catalog.is_rack_controller(subtype_id);
            subtype_id
        } else if type_name == "group" {
            // groups carry their kind as the ext attribute "type"
            if subtype_name.is_empty() {
                return Err(ImportError::param_required("sub_type"));
            }
            self.catalog.na_subtype_id()
        } else {
            if !subtype_name.is_empty() && subtype_name != "n_a" {
                tracing::warn!(row, sub_type = %subtype_name, r#type = %type_name,
                    "sub_type is ignored for this type");
            }
            self.catalog.na_subtype_id()
        };

        // === location -> parent id ===
        let location = table.get(row, "location")?.trim().to_string();
        let parent_id = if location.is_empty() {
            0
        } else {
            self.repo
                .resolve_name(&location)?
                .ok_or_else(|| ImportError::not_found(&location))?
        };

        // === existing type/subtype are immutable ===
        if let Some(element) = &existing {
            if element.type_id != type_id {
                return Err(ImportError::BadRequestDocument(format!(
                    "changing the type of existing asset '{}' is not allowed",
                    name
                )));
            }
            if element.subtype_id != subtype_id
                && element.subtype_id != self.catalog.na_subtype_id()
            {
                return Err(ImportError::BadRequestDocument(format!(
                    "changing the sub_type of existing asset '{}' is not allowed",
                    name
                )));
            }
        }

        // === groups ===
        let group_ids = self.collect_groups(table, row, &mut consumed)?;

        // === power links ===
        let mut power_links =
            self.collect_power_links(table, row, &ext_name, &name, &mut consumed)?;
        if !power_links.is_empty() && type_name != "device" {
            tracing::warn!(row, r#type = %type_name,
                "power links on a non-device row are dropped");
            power_links.clear();
        }

        // === ext attributes ===
        let mut ext = self.collect_ext_attributes(table, row, &consumed, suppress_hw)?;
        if type_name == "group" {
            ext.insert(
                "type".to_string(),
                ExtValue::rw(table.get_strip(row, "sub_type")?),
            );
        }
        ext.insert("name".to_string(), ExtValue::rw(ext_name.clone()));

        // === rack-space check ===
        if let (Some(u_size), Some(u_pos)) = (
            ext.get("u_size").map(|v| v.value.clone()),
            ext.get("location_u_pos").map(|v| v.value.clone()),
        ) {
            // both values passed unsigned range validation above
            let size: u32 = u_size
                .parse()
                .map_err(|_| ImportError::Internal("u_size lost its numeric form".to_string()))?;
            let pos: u32 = u_pos.parse().map_err(|_| {
                ImportError::Internal("location_u_pos lost its numeric form".to_string())
            })?;
            placement::try_place_asset(self.repo, id, parent_id, size, pos)
                .map_err(|e| ImportError::Internal(e.to_string()))?;
        }

        Ok(AssetRow {
            row,
            id,
            operation,
            name,
            ext_name,
            type_name,
            type_id,
            subtype_name,
            subtype_id,
            status,
            priority,
            asset_tag,
            parent_id,
            group_ids,
            power_links,
            ext,
            is_rc0_self,
            is_rack_controller,
        })
    }

    /// Resolve an `id` column value to an element id: internal or
    /// user-facing name first, then as a decimal element id (so a
    /// re-import can carry ids assigned by a previous call).
    fn resolve_id(&self, value: &str) -> Result<Option<u32>, ImportError> {
        if let Some(id) = self.repo.resolve_name(value)? {
            return Ok(Some(id));
        }
        if value.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(numeric) = value.parse::<u32>() {
                if self.repo.select_asset_element(numeric)?.is_some() {
                    return Ok(Some(numeric));
                }
            }
        }
        Ok(None)
    }

    /// group.1, group.2, ... until the first absent column.
    fn collect_groups(
        &self,
        table: &Table,
        row: usize,
        consumed: &mut HashSet<String>,
    ) -> Result<BTreeSet<u32>, ImportError> {
        let mut group_ids = BTreeSet::new();
        let mut n = 1;
        loop {
            let title = format!("group.{}", n);
            if !table.has_title(&title) {
                break;
            }
            consumed.insert(title.clone());
            let value = table.get(row, &title)?.trim().to_string();
            if !value.is_empty() {
                let group_id = self
                    .repo
                    .resolve_name(&value)?
                    .ok_or_else(|| ImportError::not_found(&value))?;
                group_ids.insert(group_id);
            }
            n += 1;
        }
        Ok(group_ids)
    }

    /// power_source.N / power_plug_src.N / power_input.N triples until
    /// the first absent power_source column. A source naming the row
    /// itself counts as "no source" and drops its companions.
    fn collect_power_links(
        &self,
        table: &Table,
        row: usize,
        ext_name: &str,
        internal_name: &str,
        consumed: &mut HashSet<String>,
    ) -> Result<Vec<PowerLink>, ImportError> {
        let mut links = Vec::new();
        let mut n = 1;
        loop {
            let src_title = format!("power_source.{}", n);
            if !table.has_title(&src_title) {
                break;
            }
            let plug_title = format!("power_plug_src.{}", n);
            let input_title = format!("power_input.{}", n);
            consumed.insert(src_title.clone());
            consumed.insert(plug_title.clone());
            consumed.insert(input_title.clone());

            let source = table.get(row, &src_title)?.trim().to_string();
            n += 1;
            if source.is_empty() {
                continue;
            }
            if source == ext_name || source == internal_name {
                tracing::warn!(row, source = %source,
                    "power source equals the asset itself, link dropped");
                continue;
            }

            let src_id = self
                .repo
                .resolve_name(&source)?
                .ok_or_else(|| ImportError::not_found(&source))?;
            let src_out = self.outlet_code(table, row, &plug_title)?;
            let dest_in = self.outlet_code(table, row, &input_title)?;
            links.push(PowerLink {
                src_id,
                src_out,
                dest_in,
            });
        }
        Ok(links)
    }

    fn outlet_code(
        &self,
        table: &Table,
        row: usize,
        title: &str,
    ) -> Result<Option<String>, ImportError> {
        if !table.has_title(title) {
            return Ok(None);
        }
        let value = table.get(row, title)?.trim().to_string();
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            value.chars().take(MAX_OUTLET_LENGTH).collect::<String>(),
        ))
    }

    /// Collect all columns not consumed by the structured fields as
    /// ext attributes, applying per-key sanitation.
    fn collect_ext_attributes(
        &self,
        table: &Table,
        row: usize,
        consumed: &HashSet<String>,
        suppress_hw: bool,
    ) -> Result<BTreeMap<String, ExtValue>, ImportError> {
        let mut ext = BTreeMap::new();
        for title in table.titles() {
            if consumed.contains(title) {
                continue;
            }
            if suppress_hw && is_hw_column(title) {
                continue;
            }
            let raw = table.get(row, title)?.trim().to_string();
            if raw.is_empty() {
                continue;
            }

            let value = match title.as_str() {
                key if key == "warranty_end" || key.ends_with("_date") => sanitize_date(&raw)
                    .ok_or_else(|| {
                        ImportError::bad_params(
                            key,
                            &raw,
                            format!("a date in one of the formats [{}]", DATE_FORMATS.join(", ")),
                        )
                    })?,
                "logical_asset" => self
                    .repo
                    .ext_name_to_asset_name(&raw)?
                    .or(self.repo.name_to_asset_id(&raw)?.map(|_| raw.clone()))
                    .ok_or_else(|| ImportError::not_found(&raw))?,
                "calibration_offset_t" | "calibration_offset_h" => {
                    raw.parse::<f64>().map_err(|_| {
                        ImportError::bad_params(title, &raw, "a floating point number")
                    })?;
                    raw.clone()
                }
                "max_current" | "max_power" => {
                    let number = raw.parse::<f64>().map_err(|_| {
                        ImportError::bad_params(title, &raw, "a non-negative number")
                    })?;
                    if number < 0.0 {
                        return Err(ImportError::bad_params(
                            title,
                            &raw,
                            "a non-negative number",
                        ));
                    }
                    raw.clone()
                }
                "u_size" => {
                    let Some(normalized) = match_ext_attr("u_size", &raw) else {
                        // non-matching raw form: key silently dropped
                        continue;
                    };
                    validate_u_range("u_size", &normalized)?;
                    normalized
                }
                "location_u_pos" => {
                    validate_u_range("location_u_pos", &raw)?;
                    raw.clone()
                }
                key => match match_ext_attr(key, &raw) {
                    Some(value) => value,
                    None => continue,
                },
            };

            let read_only = READ_ONLY_EXT_KEYS.contains(&title.as_str());
            ext.insert(
                title.clone(),
                ExtValue {
                    value,
                    read_only,
                },
            );
        }
        Ok(ext)
    }
}

// ==========================================
// Free helpers
// ==========================================

/// Priority encoding: "P1".."P5" or a bare digit. Strings longer than
/// two characters fall back to the default priority 5.
pub fn parse_priority(value: &str) -> u8 {
    if value.len() > 2 {
        return 5;
    }
    for c in value.chars() {
        if ('1'..='5').contains(&c) {
            return c as u8 - b'0';
        }
    }
    5
}

/// Per-key ext value normalizer. The only key with real normalization
/// is `u_size` (strip a trailing U/u, strip a single leading zero of a
/// two-digit value); everything else passes through unchanged.
pub fn match_ext_attr(key: &str, value: &str) -> Option<String> {
    if key != "u_size" {
        return Some(value.to_string());
    }
    let digits = value
        .strip_suffix('U')
        .or_else(|| value.strip_suffix('u'))
        .unwrap_or(value);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let digits = if digits.len() == 2 && digits.starts_with('0') {
        &digits[1..]
    } else {
        digits
    };
    Some(digits.to_string())
}

fn validate_u_range(key: &str, value: &str) -> Result<u32, ImportError> {
    let expected = format!("an unsigned integer in [{}, {}]", MIN_U_SIZE, MAX_U_SIZE);
    let number: u32 = value
        .parse()
        .map_err(|_| ImportError::bad_params(key, value, &expected))?;
    if !(MIN_U_SIZE..=MAX_U_SIZE).contains(&number) {
        return Err(ImportError::bad_params(key, value, &expected));
    }
    Ok(number)
}

/// Normalize a date value against the accepted formats, re-emitting in
/// the first format that parses.
fn sanitize_date(value: &str) -> Option<String> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.format(format).to_string());
        }
    }
    None
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

fn is_hw_column(title: &str) -> bool {
    if HW_COLUMNS.contains(&title) {
        return true;
    }
    for prefix in ["ip.", "ipv6."] {
        if let Some(rest) = title.strip_prefix(prefix) {
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse_priority("p1"), 1);
        assert_eq!(parse_priority("P3".to_lowercase().as_str()), 3);
        assert_eq!(parse_priority("2"), 2);
        assert_eq!(parse_priority("5"), 5);
        // no digit 1..5
        assert_eq!(parse_priority(""), 5);
        assert_eq!(parse_priority("p9"), 5);
        // longer than two characters falls back
        assert_eq!(parse_priority("p12"), 5);
    }

    #[test]
    fn test_match_ext_attr_u_size() {
        assert_eq!(match_ext_attr("u_size", "42U"), Some("42".to_string()));
        assert_eq!(match_ext_attr("u_size", "42u"), Some("42".to_string()));
        assert_eq!(match_ext_attr("u_size", "05"), Some("5".to_string()));
        assert_eq!(match_ext_attr("u_size", "0"), Some("0".to_string()));
        assert_eq!(match_ext_attr("u_size", "abc"), None);
        assert_eq!(match_ext_attr("u_size", ""), None);
        assert_eq!(match_ext_attr("u_size", "U"), None);
    }

    #[test]
    fn test_match_ext_attr_passthrough() {
        assert_eq!(
            match_ext_attr("description", "anything at all"),
            Some("anything at all".to_string())
        );
    }

    #[test]
    fn test_validate_u_range() {
        assert_eq!(validate_u_range("u_size", "1").unwrap(), 1);
        assert_eq!(validate_u_range("u_size", "52").unwrap(), 52);
        assert!(validate_u_range("u_size", "0").is_err());
        assert!(validate_u_range("u_size", "53").is_err());
        assert!(validate_u_range("location_u_pos", "abc").is_err());
    }

    #[test]
    fn test_sanitize_date_normalizes_in_first_matching_format() {
        assert_eq!(sanitize_date("2026-01-18"), Some("2026-01-18".to_string()));
        assert_eq!(sanitize_date("18.01.2026"), Some("18.01.2026".to_string()));
        assert_eq!(sanitize_date("01/18/2026"), Some("01/18/2026".to_string()));
        assert_eq!(sanitize_date("18 Jan 2026"), Some("18 Jan 2026".to_string()));
        assert_eq!(sanitize_date("tomorrow"), None);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Main Rack #1"), "Main_Rack_1");
        assert_eq!(sanitize_name("dc-praha.01"), "dc-praha.01");
    }

    #[test]
    fn test_is_hw_column() {
        assert!(is_hw_column("serial_no"));
        assert!(is_hw_column("ip.1"));
        assert!(is_hw_column("ipv6.2"));
        assert!(!is_hw_column("ip.x"));
        assert!(!is_hw_column("description"));
    }
}
