//! Import audit-trail message handlers

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use sqlx::PgPool;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::db::queries;
use crate::types::{
    ActivityLogDetail, ActivityLogListRequest, ActivityLogWithDetails, ErrorResponse, Request,
    SuccessResponse,
};

const DEFAULT_LOG_LIMIT: i64 = 50;

/// Handle activity.list messages
///
/// Returns recent import attempts newest first, each with its skipped-row
/// details attached.
pub async fn handle_list(client: Client, mut subscriber: Subscriber, pool: PgPool) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received activity.list message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<ActivityLogListRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let limit = request.payload.limit.unwrap_or(DEFAULT_LOG_LIMIT);
        match list_with_details(&pool, limit).await {
            Ok(logs) => {
                let response = SuccessResponse::new(request.id, logs);
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Failed to list activity logs: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Two queries total: one for the logs, one for all their details.
async fn list_with_details(pool: &PgPool, limit: i64) -> Result<Vec<ActivityLogWithDetails>> {
    let logs = queries::activity_log::list_activity_logs(pool, limit).await?;
    let ids: Vec<Uuid> = logs.iter().map(|l| l.id).collect();
    let mut details = queries::activity_log::list_details_for_logs(pool, &ids).await?;

    let mut by_log: std::collections::HashMap<Uuid, Vec<ActivityLogDetail>> =
        std::collections::HashMap::new();
    for detail in details.drain(..) {
        by_log.entry(detail.activity_log_id).or_default().push(detail);
    }

    Ok(logs
        .into_iter()
        .map(|log| {
            let details = by_log.remove(&log.id).unwrap_or_default();
            ActivityLogWithDetails { log, details }
        })
        .collect())
}
