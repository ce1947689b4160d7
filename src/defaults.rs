//! Platform-wide default values

/// Zone assigned when an uploaded row leaves the column blank.
pub const DEFAULT_ZONE: &str = "Zone D";

/// Onboarding status stamped on every imported landlord.
pub const DEFAULT_ONBOARDING_STATUS: &str = "pending";

/// Record status stamped on every imported landlord.
pub const DEFAULT_LANDLORD_STATUS: &str = "active";

/// Audit action name written for each bulk-import attempt.
pub const IMPORT_AUDIT_ACTION: &str = "landlord_bulk_import";

/// Look-ahead window for upcoming-celebration queries.
pub const DEFAULT_CELEBRATION_WINDOW_DAYS: i64 = 7;
