//! Audit-trail types
//!
//! One `ActivityLog` row is created per import attempt; it owns zero or
//! more `ActivityLogDetail` rows, one per skipped input row. Both are
//! append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Audit entry for one import attempt
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    /// Admin who triggered the import, when known.
    pub admin_id: Option<Uuid>,
    pub action: String,
    pub total_rows: i32,
    pub successful_rows: i32,
    pub skipped_rows: i32,
    pub created_at: DateTime<Utc>,
}

/// Per-skipped-row audit detail
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogDetail {
    pub id: Uuid,
    pub activity_log_id: Uuid,
    pub row_number: i32,
    pub reason: String,
    /// Original raw row, as uploaded.
    pub row_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an activity log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivityLog {
    pub admin_id: Option<Uuid>,
    pub action: String,
    pub total_rows: i32,
    pub successful_rows: i32,
    pub skipped_rows: i32,
}

/// Insert payload for one audit detail row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivityLogDetail {
    pub row_number: i32,
    pub reason: String,
    pub row_data: serde_json::Value,
}

/// Log entry with its detail rows, for admin console listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogWithDetails {
    #[serde(flatten)]
    pub log: ActivityLog,
    pub details: Vec<ActivityLogDetail>,
}

/// Request for listing recent import audit entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogListRequest {
    #[serde(default)]
    pub limit: Option<i64>,
}
