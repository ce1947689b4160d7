//! Upcoming-celebration message handlers

use anyhow::Result;
use async_nats::{Client, Subscriber};
use chrono::Utc;
use futures::StreamExt;
use sqlx::PgPool;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::db::queries;
use crate::defaults;
use crate::services::celebrations::{self, UpcomingCelebrationsRequest};
use crate::types::{ErrorResponse, Request, SuccessResponse};

/// Handle celebration.upcoming messages
///
/// Lists birthdays and anniversaries of opted-in active landlords that
/// fall within the requested window (default one week).
pub async fn handle_upcoming(
    client: Client,
    mut subscriber: Subscriber,
    pool: PgPool,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received celebration.upcoming message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<UpcomingCelebrationsRequest> =
            match serde_json::from_slice(&msg.payload) {
                Ok(req) => req,
                Err(e) => {
                    error!("Failed to parse request: {}", e);
                    let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                    let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                    continue;
                }
            };

        let window_days = request
            .payload
            .days
            .filter(|d| *d >= 0)
            .unwrap_or(defaults::DEFAULT_CELEBRATION_WINDOW_DAYS);

        match queries::landlord::list_celebrants(&pool).await {
            Ok(landlords) => {
                let today = Utc::now().date_naive();
                let upcoming = celebrations::collect_upcoming(landlords, today, window_days);
                let response = SuccessResponse::new(request.id, upcoming);
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Failed to list celebrants: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}
