//! Landlord bulk-import orchestration
//!
//! One import attempt moves through: validate -> dedupe against the store
//! -> bulk insert -> audit log -> summary. Validation and duplicate
//! rejections are data, never errors; infrastructure failures (the
//! existence lookup or the insert itself) abort the whole attempt with
//! nothing committed. Audit writes are best-effort and never change the
//! outcome of an import that already committed.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::db::queries;
use crate::defaults;
use crate::services::validation::validate_batch;
use crate::types::{
    ImportRow, ImportSummary, NewActivityLog, NewActivityLogDetail, NewLandlord, SkippedRow,
};

/// Skip reason for phones already present in the store.
pub const REASON_PHONE_EXISTS: &str = "Phone number already exists";

/// Fatal pipeline errors. Both variants mean zero rows were committed by
/// this attempt.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("existing-phone lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),
    #[error("bulk insert failed: {0}")]
    Insert(#[source] anyhow::Error),
}

/// Persistence seam for the import pipeline. Production uses
/// [`PgLandlordStore`]; tests substitute an in-memory store.
#[async_trait]
pub trait LandlordStore: Send + Sync {
    /// Return the subset of `phones` that already exist. Must be a single
    /// batched lookup regardless of candidate count.
    async fn find_existing_phones(&self, phones: &[String]) -> Result<Vec<String>>;

    /// Insert all rows in one statement; all-or-nothing.
    async fn insert_landlords(&self, rows: &[NewLandlord]) -> Result<u64>;

    async fn create_activity_log(&self, log: &NewActivityLog) -> Result<Uuid>;

    async fn create_activity_log_details(
        &self,
        activity_log_id: Uuid,
        details: &[NewActivityLogDetail],
    ) -> Result<()>;
}

/// PostgreSQL-backed store
pub struct PgLandlordStore {
    pool: PgPool,
}

impl PgLandlordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LandlordStore for PgLandlordStore {
    async fn find_existing_phones(&self, phones: &[String]) -> Result<Vec<String>> {
        queries::landlord::find_existing_phones(&self.pool, phones).await
    }

    async fn insert_landlords(&self, rows: &[NewLandlord]) -> Result<u64> {
        queries::landlord::insert_landlords(&self.pool, rows).await
    }

    async fn create_activity_log(&self, log: &NewActivityLog) -> Result<Uuid> {
        queries::activity_log::create_activity_log(&self.pool, log).await
    }

    async fn create_activity_log_details(
        &self,
        activity_log_id: Uuid,
        details: &[NewActivityLogDetail],
    ) -> Result<()> {
        queries::activity_log::create_activity_log_details(&self.pool, activity_log_id, details)
            .await
    }
}

/// A validated row still in the running, with enough context to report
/// it if the store rejects it later.
struct Candidate {
    row_number: usize,
    data: ImportRow,
    record: NewLandlord,
}

/// End-to-end import pipeline over a [`LandlordStore`]
pub struct ImportService {
    store: Arc<dyn LandlordStore>,
}

impl ImportService {
    pub fn new(store: Arc<dyn LandlordStore>) -> Self {
        Self { store }
    }

    /// Run one import attempt over already-parsed rows.
    pub async fn run(
        &self,
        rows: &[ImportRow],
        admin_id: Option<Uuid>,
    ) -> Result<ImportSummary, ImportError> {
        let results = validate_batch(rows);
        let total_rows = results.len();

        let mut skipped: Vec<SkippedRow> = Vec::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        for result in results {
            match result.record {
                Some(record) if result.is_valid => candidates.push(Candidate {
                    row_number: result.row_number,
                    data: result.data,
                    record,
                }),
                _ => skipped.push(SkippedRow {
                    row_number: result.row_number,
                    reason: result.errors.join("; "),
                    data: result.data,
                }),
            }
        }

        let (to_insert, store_rejected) = self.filter_existing(candidates).await?;
        skipped.extend(store_rejected);

        let successful_rows = if to_insert.is_empty() {
            0
        } else {
            let records: Vec<NewLandlord> =
                to_insert.into_iter().map(|c| c.record).collect();
            self.store
                .insert_landlords(&records)
                .await
                .map_err(ImportError::Insert)? as usize
        };

        skipped.sort_by_key(|s| s.row_number);

        info!(
            "Landlord import: {} total, {} imported, {} skipped",
            total_rows,
            successful_rows,
            skipped.len()
        );

        self.write_audit(admin_id, total_rows, successful_rows, &skipped)
            .await;

        Ok(ImportSummary {
            total_rows,
            successful_rows,
            skipped_rows: skipped.len(),
            skipped_details: skipped,
        })
    }

    /// Remove candidates whose canonical phone already exists in the
    /// store. One batched lookup; a lookup failure aborts the import
    /// before anything is inserted.
    async fn filter_existing(
        &self,
        candidates: Vec<Candidate>,
    ) -> Result<(Vec<Candidate>, Vec<SkippedRow>), ImportError> {
        if candidates.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let phones: Vec<String> = candidates.iter().map(|c| c.record.phone.clone()).collect();
        let existing: HashSet<String> = self
            .store
            .find_existing_phones(&phones)
            .await
            .map_err(ImportError::Lookup)?
            .into_iter()
            .collect();

        let mut to_insert = Vec::new();
        let mut rejected = Vec::new();
        for candidate in candidates {
            if existing.contains(&candidate.record.phone) {
                rejected.push(SkippedRow {
                    row_number: candidate.row_number,
                    reason: REASON_PHONE_EXISTS.to_string(),
                    data: candidate.data,
                });
            } else {
                to_insert.push(candidate);
            }
        }

        Ok((to_insert, rejected))
    }

    /// Write the audit entry and its per-skip details. Best-effort:
    /// failures are logged and swallowed so they cannot undo an import
    /// that already committed.
    async fn write_audit(
        &self,
        admin_id: Option<Uuid>,
        total_rows: usize,
        successful_rows: usize,
        skipped: &[SkippedRow],
    ) {
        let log = NewActivityLog {
            admin_id,
            action: defaults::IMPORT_AUDIT_ACTION.to_string(),
            total_rows: total_rows as i32,
            successful_rows: successful_rows as i32,
            skipped_rows: skipped.len() as i32,
        };

        let log_id = match self.store.create_activity_log(&log).await {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to write import activity log: {}", e);
                return;
            }
        };

        if skipped.is_empty() {
            return;
        }

        let details: Vec<NewActivityLogDetail> = skipped
            .iter()
            .map(|s| NewActivityLogDetail {
                row_number: s.row_number as i32,
                reason: s.reason.clone(),
                row_data: serde_json::to_value(&s.data).unwrap_or(serde_json::Value::Null),
            })
            .collect();

        if let Err(e) = self
            .store
            .create_activity_log_details(log_id, &details)
            .await
        {
            error!("Failed to write import activity log details: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockStore {
        existing_phones: Vec<String>,
        fail_lookup: bool,
        fail_insert: bool,
        fail_log: bool,
        lookup_calls: AtomicUsize,
        inserted: Mutex<Vec<NewLandlord>>,
        logs: Mutex<Vec<NewActivityLog>>,
        details: Mutex<Vec<NewActivityLogDetail>>,
    }

    #[async_trait]
    impl LandlordStore for MockStore {
        async fn find_existing_phones(&self, phones: &[String]) -> Result<Vec<String>> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookup {
                anyhow::bail!("connection reset");
            }
            Ok(self
                .existing_phones
                .iter()
                .filter(|p| phones.contains(p))
                .cloned()
                .collect())
        }

        async fn insert_landlords(&self, rows: &[NewLandlord]) -> Result<u64> {
            if self.fail_insert {
                anyhow::bail!("unique constraint violation");
            }
            let mut inserted = self.inserted.lock().unwrap();
            inserted.extend(rows.iter().cloned());
            Ok(rows.len() as u64)
        }

        async fn create_activity_log(&self, log: &NewActivityLog) -> Result<Uuid> {
            if self.fail_log {
                anyhow::bail!("audit table unavailable");
            }
            self.logs.lock().unwrap().push(log.clone());
            Ok(Uuid::new_v4())
        }

        async fn create_activity_log_details(
            &self,
            _activity_log_id: Uuid,
            details: &[NewActivityLogDetail],
        ) -> Result<()> {
            self.details.lock().unwrap().extend(details.iter().cloned());
            Ok(())
        }
    }

    fn row(name: &str, phone: &str, occupancy: &str, road: &str) -> ImportRow {
        ImportRow {
            full_name: name.to_string(),
            phone: phone.to_string(),
            occupancy_type: occupancy.to_string(),
            road: road.to_string(),
            ..Default::default()
        }
    }

    fn service_with(store: MockStore) -> (ImportService, Arc<MockStore>) {
        let store = Arc::new(store);
        (ImportService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_end_to_end_duplicate_in_file() {
        let (service, store) = service_with(MockStore::default());
        let rows = vec![
            row("A", "08012345678", "owner", "Road 1"),
            row("B", "08012345678", "tenant", "Road 2"),
        ];

        let summary = service.run(&rows, None).await.unwrap();
        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.successful_rows, 1);
        assert_eq!(summary.skipped_rows, 1);
        assert_eq!(summary.skipped_details[0].row_number, 2);
        assert_eq!(
            summary.skipped_details[0].reason,
            "Duplicate phone number in file"
        );

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].phone, "+2348012345678");
    }

    #[tokio::test]
    async fn test_store_duplicate_rejected() {
        let (service, store) = service_with(MockStore {
            existing_phones: vec!["+2348012345678".to_string()],
            ..Default::default()
        });
        let rows = vec![row("A", "08012345678", "owner", "Road 1")];

        let summary = service.run(&rows, None).await.unwrap();
        assert_eq!(summary.successful_rows, 0);
        assert_eq!(summary.skipped_rows, 1);
        assert_eq!(summary.skipped_details[0].reason, REASON_PHONE_EXISTS);
        assert!(store.inserted.lock().unwrap().is_empty());
        // Audit entry still written even though nothing was imported.
        assert_eq!(store.logs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_batched_existence_lookup() {
        let (service, store) = service_with(MockStore::default());
        let rows = vec![
            row("A", "08011111111", "owner", "Road 1"),
            row("B", "08022222222", "tenant", "Road 2"),
            row("C", "08033333333", "owner", "Road 3"),
        ];

        service.run(&rows, None).await.unwrap();
        assert_eq!(store.lookup_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fail_closed_on_lookup_error() {
        let (service, store) = service_with(MockStore {
            fail_lookup: true,
            ..Default::default()
        });
        let rows = vec![row("A", "08011111111", "owner", "Road 1")];

        let err = service.run(&rows, None).await.unwrap_err();
        assert!(matches!(err, ImportError::Lookup(_)));
        assert!(store.inserted.lock().unwrap().is_empty());
        assert!(store.logs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_closed_on_insert_error() {
        let (service, store) = service_with(MockStore {
            fail_insert: true,
            ..Default::default()
        });
        let rows = vec![row("A", "08011111111", "owner", "Road 1")];

        let err = service.run(&rows, None).await.unwrap_err();
        assert!(matches!(err, ImportError::Insert(_)));
        assert!(store.logs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_audit_written_when_every_row_invalid() {
        let (service, store) = service_with(MockStore::default());
        let rows = vec![ImportRow::default(), ImportRow::default()];

        let summary = service.run(&rows, None).await.unwrap();
        assert_eq!(summary.successful_rows, 0);
        assert_eq!(summary.skipped_rows, 2);
        // No valid candidates, so no existence lookup either.
        assert_eq!(store.lookup_calls.load(Ordering::SeqCst), 0);

        let logs = store.logs.lock().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].total_rows, 2);
        assert_eq!(logs[0].skipped_rows, 2);
        assert_eq!(store.details.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_import() {
        let (service, store) = service_with(MockStore {
            fail_log: true,
            ..Default::default()
        });
        let rows = vec![row("A", "08011111111", "owner", "Road 1")];

        let summary = service.run(&rows, None).await.unwrap();
        assert_eq!(summary.successful_rows, 1);
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_skipped_details_preserve_file_order() {
        let (service, _store) = service_with(MockStore {
            existing_phones: vec!["+2348022222222".to_string()],
            ..Default::default()
        });
        let rows = vec![
            row("", "08011111111", "owner", "Road 1"), // invalid: no name
            row("B", "08022222222", "tenant", "Road 2"), // store duplicate
            row("C", "08033333333", "owner", "Road 3"),
        ];

        let summary = service.run(&rows, None).await.unwrap();
        assert_eq!(summary.successful_rows, 1);
        let numbers: Vec<usize> = summary
            .skipped_details
            .iter()
            .map(|s| s.row_number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }
}
