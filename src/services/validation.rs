//! Row and batch validation for the landlord bulk import
//!
//! Checks run in a fixed order and never stop early: a row reports every
//! failure at once. Intra-file phone duplicates are first-occurrence-wins,
//! tracked in one set shared across the whole batch so the outcome does
//! not depend on how the caller chunks the rows.

use std::collections::HashSet;

use crate::defaults;
use crate::services::normalize;
use crate::types::{
    ImportRow, NewLandlord, NormalizedRow, OccupancyType, OptInValue, ValidationResult,
};

/// Validate one row. `row_number` is the 1-based position in the file;
/// `seen_phones` carries canonical phones already claimed by earlier
/// rows of the same batch.
pub fn validate_row(
    row: &ImportRow,
    row_number: usize,
    seen_phones: &mut HashSet<String>,
) -> ValidationResult {
    let mut errors: Vec<String> = Vec::new();

    let full_name = row.full_name.trim().to_string();
    if full_name.is_empty() {
        errors.push("full_name is required".to_string());
    }

    let phone = normalize::normalize_phone(&row.phone);
    if row.phone.trim().is_empty() {
        errors.push("phone is required".to_string());
    } else if !normalize::is_valid_phone(&phone) {
        errors.push("Invalid phone number".to_string());
    } else if !seen_phones.insert(phone.clone()) {
        errors.push("Duplicate phone number in file".to_string());
    }

    let occupancy = OccupancyType::parse(&row.occupancy_type);
    if row.occupancy_type.trim().is_empty() {
        errors.push("occupancy_type is required".to_string());
    } else if occupancy.is_none() {
        errors.push("occupancy_type must be 'owner' or 'tenant'".to_string());
    }

    let road = row.road.trim().to_string();
    if road.is_empty() {
        errors.push("road is required".to_string());
    }

    let date_of_birth = check_month_day(&row.date_of_birth, "date_of_birth", &mut errors);
    let wedding_anniversary =
        check_month_day(&row.wedding_anniversary, "wedding_anniversary", &mut errors);

    let celebrate_opt_in = check_opt_in(&row.celebrate_opt_in, &mut errors);

    let email = row
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);
    if let Some(ref email) = email {
        if !normalize::is_valid_email(email) {
            errors.push("Invalid email format".to_string());
        }
    }

    // Defaults apply whether or not the row is valid, so the normalized
    // view in error exports shows what would have been stored.
    let zone = row
        .zone
        .as_deref()
        .map(str::trim)
        .filter(|z| !z.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| defaults::DEFAULT_ZONE.to_string());

    let normalized = NormalizedRow {
        full_name: full_name.clone(),
        phone: phone.clone(),
        occupancy_type: occupancy
            .map(|o| o.as_str().to_string())
            .unwrap_or_else(|| row.occupancy_type.trim().to_lowercase()),
        road: road.clone(),
        email: email.clone(),
        house_address: row.house_address.clone(),
        zone: zone.clone(),
        date_of_birth: date_of_birth.clone(),
        wedding_anniversary: wedding_anniversary.clone(),
        celebrate_opt_in,
        onboarding_status: defaults::DEFAULT_ONBOARDING_STATUS.to_string(),
        status: defaults::DEFAULT_LANDLORD_STATUS.to_string(),
    };

    let record = if errors.is_empty() {
        occupancy.map(|occupancy_type| NewLandlord {
            full_name,
            phone,
            occupancy_type,
            road,
            email,
            house_address: row.house_address.clone(),
            zone,
            date_of_birth,
            wedding_anniversary,
            celebrate_opt_in,
            onboarding_status: Default::default(),
            status: Default::default(),
        })
    } else {
        None
    };

    ValidationResult {
        row_number,
        is_valid: errors.is_empty(),
        errors,
        data: row.clone(),
        normalized,
        record,
    }
}

fn check_month_day(
    value: &Option<String>,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    let raw = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
    if normalize::is_valid_month_day(raw) {
        Some(normalize::format_month_day(raw))
    } else {
        errors.push(format!("Invalid {} (expected DD-MM or MM-DD)", field));
        Some(raw.to_string())
    }
}

fn check_opt_in(value: &Option<OptInValue>, errors: &mut Vec<String>) -> bool {
    match value {
        None => false,
        Some(v) => match normalize::parse_opt_in(v) {
            Ok(b) => b,
            Err(_) => {
                errors.push(
                    "Invalid celebrate_opt_in value (expected true/false/1/0/yes/no)".to_string(),
                );
                false
            }
        },
    }
}

/// Validate a whole batch with one shared duplicate set.
pub fn validate_batch(rows: &[ImportRow]) -> Vec<ValidationResult> {
    let mut seen_phones = HashSet::new();
    rows.iter()
        .enumerate()
        .map(|(idx, row)| validate_row(row, idx + 1, &mut seen_phones))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_row() -> ImportRow {
        ImportRow {
            full_name: "Ada Obi".to_string(),
            phone: "08012345678".to_string(),
            occupancy_type: "owner".to_string(),
            road: "Road 1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_row_produces_record() {
        let results = validate_batch(&[valid_row()]);
        let result = &results[0];
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        let record = result.record.as_ref().unwrap();
        assert_eq!(record.phone, "+2348012345678");
        assert_eq!(record.zone, "Zone D");
        assert_eq!(result.row_number, 1);
    }

    #[test]
    fn test_missing_required_fields_all_reported() {
        let results = validate_batch(&[ImportRow::default()]);
        let errors = &results[0].errors;
        assert_eq!(
            errors,
            &vec![
                "full_name is required".to_string(),
                "phone is required".to_string(),
                "occupancy_type is required".to_string(),
                "road is required".to_string(),
            ]
        );
        assert!(results[0].record.is_none());
    }

    #[test]
    fn test_validation_does_not_stop_at_first_error() {
        let row = ImportRow {
            full_name: "".to_string(),
            phone: "123".to_string(),
            occupancy_type: "squatter".to_string(),
            road: "Road 1".to_string(),
            date_of_birth: Some("99-99".to_string()),
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        let results = validate_batch(&[row]);
        let errors = &results[0].errors;
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[0], "full_name is required");
        assert_eq!(errors[1], "Invalid phone number");
        assert_eq!(errors[2], "occupancy_type must be 'owner' or 'tenant'");
        assert_eq!(errors[3], "Invalid date_of_birth (expected DD-MM or MM-DD)");
        assert_eq!(errors[4], "Invalid email format");
    }

    #[test]
    fn test_duplicate_phone_first_occurrence_wins() {
        let mut second = valid_row();
        second.full_name = "Bisi Ade".to_string();
        let results = validate_batch(&[valid_row(), second]);
        assert!(results[0].is_valid);
        assert!(!results[1].is_valid);
        assert_eq!(results[1].errors, vec!["Duplicate phone number in file"]);
    }

    #[test]
    fn test_duplicate_detected_across_formats() {
        let mut second = valid_row();
        second.phone = "+234 801 234 5678".to_string();
        let results = validate_batch(&[valid_row(), second]);
        assert!(!results[1].is_valid);
        assert_eq!(results[1].errors, vec!["Duplicate phone number in file"]);
    }

    #[test]
    fn test_invalid_phone_does_not_claim_slot() {
        let mut bad = valid_row();
        bad.phone = "123".to_string();
        // The broken row comes first; a later valid row with the full
        // number must not be treated as its duplicate.
        let results = validate_batch(&[bad, valid_row()]);
        assert!(!results[0].is_valid);
        assert!(results[1].is_valid);
    }

    #[test]
    fn test_dates_canonicalized() {
        let mut row = valid_row();
        row.date_of_birth = Some("25-12".to_string());
        row.wedding_anniversary = Some("3-4".to_string());
        let results = validate_batch(&[row]);
        let record = results[0].record.as_ref().unwrap();
        assert_eq!(record.date_of_birth.as_deref(), Some("12-25"));
        assert_eq!(record.wedding_anniversary.as_deref(), Some("03-04"));
    }

    #[test]
    fn test_opt_in_text_accepted() {
        let mut row = valid_row();
        row.celebrate_opt_in = Some(OptInValue::Text("yes".to_string()));
        let results = validate_batch(&[row]);
        assert!(results[0].record.as_ref().unwrap().celebrate_opt_in);
    }

    #[test]
    fn test_opt_in_unrecognized_rejected() {
        let mut row = valid_row();
        row.celebrate_opt_in = Some(OptInValue::Text("maybe".to_string()));
        let results = validate_batch(&[row]);
        assert_eq!(
            results[0].errors,
            vec!["Invalid celebrate_opt_in value (expected true/false/1/0/yes/no)"]
        );
    }

    #[test]
    fn test_normalized_view_present_for_invalid_rows() {
        let row = ImportRow {
            phone: "0801 234 5678".to_string(),
            ..Default::default()
        };
        let results = validate_batch(&[row]);
        let result = &results[0];
        assert!(!result.is_valid);
        // Defaults and canonical forms still applied for the export view.
        assert_eq!(result.normalized.phone, "+2348012345678");
        assert_eq!(result.normalized.zone, "Zone D");
        assert_eq!(result.normalized.onboarding_status, "pending");
        assert_eq!(result.normalized.status, "active");
    }

    #[test]
    fn test_custom_zone_preserved() {
        let mut row = valid_row();
        row.zone = Some("Zone B".to_string());
        let results = validate_batch(&[row]);
        assert_eq!(results[0].record.as_ref().unwrap().zone, "Zone B");
    }
}
