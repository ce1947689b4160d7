//! Audit-trail database queries
//!
//! Activity logs are append-only: created once per import attempt, never
//! updated here. Deletion belongs to the administrative data-wipe, not
//! this module.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::activity_log::{
    ActivityLog, ActivityLogDetail, NewActivityLog, NewActivityLogDetail,
};

/// Create the audit entry for one import attempt
pub async fn create_activity_log(pool: &PgPool, log: &NewActivityLog) -> Result<Uuid> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO activity_logs (
            id, admin_id, action, total_rows, successful_rows, skipped_rows, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(log.admin_id)
    .bind(&log.action)
    .bind(log.total_rows)
    .bind(log.successful_rows)
    .bind(log.skipped_rows)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Batch-insert the per-skipped-row details for one audit entry
pub async fn create_activity_log_details(
    pool: &PgPool,
    activity_log_id: Uuid,
    details: &[NewActivityLogDetail],
) -> Result<()> {
    if details.is_empty() {
        return Ok(());
    }

    let mut row_numbers = Vec::with_capacity(details.len());
    let mut reasons = Vec::with_capacity(details.len());
    let mut row_data = Vec::with_capacity(details.len());

    for detail in details {
        row_numbers.push(detail.row_number);
        reasons.push(detail.reason.clone());
        row_data.push(detail.row_data.clone());
    }

    sqlx::query(
        r#"
        INSERT INTO activity_log_details (
            id, activity_log_id, row_number, reason, row_data, created_at
        )
        SELECT gen_random_uuid(), $1, u.row_number, u.reason, u.row_data, NOW()
        FROM UNNEST($2::int[], $3::text[], $4::jsonb[])
            AS u(row_number, reason, row_data)
        "#,
    )
    .bind(activity_log_id)
    .bind(&row_numbers)
    .bind(&reasons)
    .bind(&row_data)
    .execute(pool)
    .await?;

    Ok(())
}

/// List recent audit entries, newest first
pub async fn list_activity_logs(pool: &PgPool, limit: i64) -> Result<Vec<ActivityLog>> {
    let logs = sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT id, admin_id, action, total_rows, successful_rows, skipped_rows, created_at
        FROM activity_logs
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

/// Fetch details for a set of audit entries in one query
pub async fn list_details_for_logs(
    pool: &PgPool,
    log_ids: &[Uuid],
) -> Result<Vec<ActivityLogDetail>> {
    if log_ids.is_empty() {
        return Ok(Vec::new());
    }

    let details = sqlx::query_as::<_, ActivityLogDetail>(
        r#"
        SELECT id, activity_log_id, row_number, reason, row_data, created_at
        FROM activity_log_details
        WHERE activity_log_id = ANY($1)
        ORDER BY activity_log_id, row_number
        "#,
    )
    .bind(log_ids)
    .fetch_all(pool)
    .await?;

    Ok(details)
}
