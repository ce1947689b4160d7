//! Bulk-import types for the landlord CSV pipeline

use serde::{Deserialize, Serialize};

use crate::types::landlord::NewLandlord;

/// Boolean-like value as it arrives from CSV text or JSON payloads.
/// Accepts a real boolean or one of the enumerated string spellings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptInValue {
    Bool(bool),
    Text(String),
}

/// One raw record from an uploaded file, before any validation.
/// Unknown columns are dropped by the parser; missing optional columns
/// arrive as `None`, missing required columns as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRow {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub occupancy_type: String,
    #[serde(default)]
    pub road: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub house_address: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub wedding_anniversary: Option<String>,
    #[serde(default)]
    pub celebrate_opt_in: Option<OptInValue>,
}

/// The row after defaults and canonical formats have been applied.
/// Present even for invalid rows so error exports can show what the
/// pipeline made of the input. Fields stay stringly typed here; the
/// typed insert payload lives in [`ValidationResult::record`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRow {
    pub full_name: String,
    pub phone: String,
    pub occupancy_type: String,
    pub road: String,
    pub email: Option<String>,
    pub house_address: Option<String>,
    pub zone: String,
    pub date_of_birth: Option<String>,
    pub wedding_anniversary: Option<String>,
    pub celebrate_opt_in: bool,
    pub onboarding_status: String,
    pub status: String,
}

/// Per-row validation outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// 1-based position in the uploaded file.
    pub row_number: usize,
    pub is_valid: bool,
    /// Human-readable, in check order. Empty iff valid.
    pub errors: Vec<String>,
    /// The original record as uploaded.
    pub data: ImportRow,
    #[serde(rename = "normalizedData")]
    pub normalized: NormalizedRow,
    /// Typed insert payload, present iff the row is valid.
    #[serde(skip)]
    pub record: Option<NewLandlord>,
}

/// One skipped input row with the reason it was not imported
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub row_number: usize,
    pub reason: String,
    pub data: ImportRow,
}

/// Process-wide result of one import attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub successful_rows: usize,
    pub skipped_rows: usize,
    pub skipped_details: Vec<SkippedRow>,
}

/// Payload for the validate and submit subjects. Exactly one of
/// `csv_text` or `rows` must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportLandlordBatchRequest {
    #[serde(default)]
    pub csv_text: Option<String>,
    #[serde(default)]
    pub rows: Option<Vec<ImportRow>>,
}

/// Response for the validate-only subject
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateBatchResponse {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub results: Vec<ValidationResult>,
    /// Downloadable error report covering file-level validation failures.
    /// Absent when every row validated cleanly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_csv: Option<String>,
}
