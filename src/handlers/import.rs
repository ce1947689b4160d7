//! Landlord bulk-import message handlers
//!
//! Two subjects: validate-only for the upload preview, and submit for
//! the real import. Both accept either raw CSV text or already-parsed
//! rows; exactly one must be present.

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::services::error_report;
use crate::services::import_service::ImportService;
use crate::services::validation::validate_batch;
use crate::types::{
    ErrorResponse, ImportLandlordBatchRequest, ImportRow, Request, SuccessResponse,
    ValidateBatchResponse,
};

/// Resolve the request into rows to process, whichever transport the
/// frontend used.
fn resolve_rows(payload: ImportLandlordBatchRequest) -> Result<Vec<ImportRow>, (String, String)> {
    match (payload.rows, payload.csv_text) {
        (Some(rows), _) => Ok(rows),
        (None, Some(text)) => error_report::parse_csv(&text)
            .map_err(|e| ("INVALID_CSV".to_string(), e.to_string())),
        (None, None) => Err((
            "MISSING_ROWS".to_string(),
            "either csvText or rows must be provided".to_string(),
        )),
    }
}

/// Handle import.landlord.validate messages
pub async fn handle_validate(client: Client, mut subscriber: Subscriber) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received import.landlord.validate message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<ImportLandlordBatchRequest> =
            match serde_json::from_slice(&msg.payload) {
                Ok(req) => req,
                Err(e) => {
                    error!("Failed to parse validate request: {}", e);
                    let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                    let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                    continue;
                }
            };

        let rows = match resolve_rows(request.payload) {
            Ok(rows) => rows,
            Err((code, message)) => {
                let error = ErrorResponse::new(request.id, code, message);
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let results = validate_batch(&rows);
        let total_rows = results.len();
        let valid_rows = results.iter().filter(|r| r.is_valid).count();
        let invalid_rows = total_rows - valid_rows;

        let error_csv = if invalid_rows > 0 {
            match error_report::error_csv(&results) {
                Ok(csv) => Some(csv),
                Err(e) => {
                    error!("Failed to render error report: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let response = SuccessResponse::new(
            request.id,
            ValidateBatchResponse {
                total_rows,
                valid_rows,
                invalid_rows,
                results,
                error_csv,
            },
        );
        let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
        debug!("Validated batch: {} rows, {} invalid", total_rows, invalid_rows);
    }

    Ok(())
}

/// Handle import.landlord.submit messages
pub async fn handle_submit(
    client: Client,
    mut subscriber: Subscriber,
    service: Arc<ImportService>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received import.landlord.submit message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<ImportLandlordBatchRequest> =
            match serde_json::from_slice(&msg.payload) {
                Ok(req) => req,
                Err(e) => {
                    error!("Failed to parse submit request: {}", e);
                    let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                    let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                    continue;
                }
            };

        let rows = match resolve_rows(request.payload) {
            Ok(rows) => rows,
            Err((code, message)) => {
                let error = ErrorResponse::new(request.id, code, message);
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match service.run(&rows, request.user_id).await {
            Ok(summary) => {
                let response = SuccessResponse::new(request.id, summary);
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Landlord import failed: {}", e);
                let error = ErrorResponse::new(request.id, "IMPORT_FAILED", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rows_prefers_parsed_rows() {
        let payload = ImportLandlordBatchRequest {
            csv_text: Some("full_name,phone\nIgnored,123\n".to_string()),
            rows: Some(vec![ImportRow {
                full_name: "Ada".to_string(),
                ..Default::default()
            }]),
        };
        let rows = resolve_rows(payload).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].full_name, "Ada");
    }

    #[test]
    fn test_resolve_rows_parses_csv_text() {
        let payload = ImportLandlordBatchRequest {
            csv_text: Some(
                "full_name,phone,occupancy_type,road\nAda,08012345678,owner,Road 1\n".to_string(),
            ),
            rows: None,
        };
        let rows = resolve_rows(payload).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].phone, "08012345678");
    }

    #[test]
    fn test_resolve_rows_rejects_empty_request() {
        let payload = ImportLandlordBatchRequest {
            csv_text: None,
            rows: None,
        };
        let (code, _) = resolve_rows(payload).unwrap_err();
        assert_eq!(code, "MISSING_ROWS");
    }
}
