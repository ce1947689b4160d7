//! CSV input parsing and the downloadable error report
//!
//! The error report covers rows that failed file-level validation only;
//! rows rejected later because their phone already exists in the store
//! show up in the import summary but not here.

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::types::{ImportRow, OptInValue, ValidationResult};

const ERROR_CSV_HEADER: [&str; 12] = [
    "row_number",
    "errors",
    "full_name",
    "phone",
    "occupancy_type",
    "road",
    "email",
    "house_address",
    "zone",
    "date_of_birth",
    "wedding_anniversary",
    "celebrate_opt_in",
];

/// Parse uploaded CSV text into raw import rows.
///
/// A header row is required; unknown columns are ignored and empty lines
/// skipped. No validation happens here; every data row becomes an
/// `ImportRow` for the validator to judge.
pub fn parse_csv(text: &str) -> Result<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.deserialize::<HashMap<String, String>>() {
        let record = record.context("malformed CSV record")?;
        rows.push(row_from_record(&record));
    }

    Ok(rows)
}

fn row_from_record(record: &HashMap<String, String>) -> ImportRow {
    let required = |key: &str| record.get(key).cloned().unwrap_or_default();
    let optional = |key: &str| {
        record
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    ImportRow {
        full_name: required("full_name"),
        phone: required("phone"),
        occupancy_type: required("occupancy_type"),
        road: required("road"),
        email: optional("email"),
        house_address: optional("house_address"),
        zone: optional("zone"),
        date_of_birth: optional("date_of_birth"),
        wedding_anniversary: optional("wedding_anniversary"),
        celebrate_opt_in: optional("celebrate_opt_in").map(OptInValue::Text),
    }
}

fn opt_in_display(value: &Option<OptInValue>) -> String {
    match value {
        Some(OptInValue::Bool(b)) => b.to_string(),
        Some(OptInValue::Text(s)) => s.clone(),
        None => String::new(),
    }
}

/// Render invalid rows as a downloadable CSV: row number, the errors
/// joined with `; `, and every original column value.
pub fn error_csv(results: &[ValidationResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ERROR_CSV_HEADER)?;

    for result in results.iter().filter(|r| !r.is_valid) {
        let data = &result.data;
        writer.write_record([
            result.row_number.to_string(),
            result.errors.join("; "),
            data.full_name.clone(),
            data.phone.clone(),
            data.occupancy_type.clone(),
            data.road.clone(),
            data.email.clone().unwrap_or_default(),
            data.house_address.clone().unwrap_or_default(),
            data.zone.clone().unwrap_or_default(),
            data.date_of_birth.clone().unwrap_or_default(),
            data.wedding_anniversary.clone().unwrap_or_default(),
            opt_in_display(&data.celebrate_opt_in),
        ])?;
    }

    let bytes = writer.into_inner().context("error CSV writer")?;
    String::from_utf8(bytes).context("error CSV is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validation::validate_batch;

    #[test]
    fn test_parse_csv_basic() {
        let text = "full_name,phone,occupancy_type,road,email\n\
                    Ada Obi,08012345678,owner,Road 1,ada@example.com\n\
                    Bisi Ade,08022222222,tenant,Road 2,\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].full_name, "Ada Obi");
        assert_eq!(rows[0].email.as_deref(), Some("ada@example.com"));
        assert!(rows[1].email.is_none());
    }

    #[test]
    fn test_parse_csv_ignores_unknown_columns() {
        let text = "full_name,phone,occupancy_type,road,favourite_colour\n\
                    Ada,08012345678,owner,Road 1,blue\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].road, "Road 1");
    }

    #[test]
    fn test_parse_csv_missing_required_column_yields_empty_string() {
        let text = "full_name,phone\nAda,08012345678\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows[0].occupancy_type, "");
        assert_eq!(rows[0].road, "");
    }

    #[test]
    fn test_parse_csv_opt_in_column() {
        let text = "full_name,phone,occupancy_type,road,celebrate_opt_in\n\
                    Ada,08012345678,owner,Road 1,YES\n";
        let rows = parse_csv(text).unwrap();
        assert!(matches!(
            rows[0].celebrate_opt_in,
            Some(OptInValue::Text(ref s)) if s == "YES"
        ));
    }

    #[test]
    fn test_error_csv_contains_only_invalid_rows() {
        let text = "full_name,phone,occupancy_type,road\n\
                    Ada,08012345678,owner,Road 1\n\
                    ,08022222222,tenant,Road 2\n";
        let rows = parse_csv(text).unwrap();
        let results = validate_batch(&rows);
        let report = error_csv(&results).unwrap();

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2); // header + one invalid row
        assert!(lines[1].starts_with("2,"));
        assert!(lines[1].contains("full_name is required"));
        assert!(lines[1].contains("08022222222"));
    }

    #[test]
    fn test_error_csv_joins_multiple_errors() {
        let rows = vec![ImportRow::default()];
        let results = validate_batch(&rows);
        let report = error_csv(&results).unwrap();
        assert!(report.contains("full_name is required; phone is required"));
    }
}
