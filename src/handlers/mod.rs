//! NATS message handlers

pub mod activity_log;
pub mod celebration;
pub mod import;
pub mod landlord;
pub mod ping;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use sqlx::PgPool;
use tokio::select;
use tracing::{error, info};

use crate::services::import_service::{ImportService, PgLandlordStore};

/// Start all message handlers
pub async fn start_handlers(client: Client, pool: PgPool) -> Result<()> {
    info!("Starting message handlers...");

    // Shared import pipeline over the Postgres-backed store
    let store = Arc::new(PgLandlordStore::new(pool.clone()));
    let import_service = Arc::new(ImportService::new(store));

    // Subscribe to all subjects
    let ping_sub = client.subscribe("estate.ping").await?;
    let import_validate_sub = client.subscribe("estate.import.landlord.validate").await?;
    let import_submit_sub = client.subscribe("estate.import.landlord.submit").await?;
    let landlord_create_sub = client.subscribe("estate.landlord.create").await?;
    let landlord_list_sub = client.subscribe("estate.landlord.list").await?;
    let landlord_get_sub = client.subscribe("estate.landlord.get").await?;
    let landlord_update_sub = client.subscribe("estate.landlord.update").await?;
    let landlord_delete_sub = client.subscribe("estate.landlord.delete").await?;
    let activity_list_sub = client.subscribe("estate.activity.list").await?;
    let celebration_upcoming_sub = client.subscribe("estate.celebration.upcoming").await?;

    info!("Subscribed to NATS subjects");

    // Clone for each handler
    let client_ping = client.clone();
    let client_import_validate = client.clone();
    let client_import_submit = client.clone();
    let client_landlord_create = client.clone();
    let client_landlord_list = client.clone();
    let client_landlord_get = client.clone();
    let client_landlord_update = client.clone();
    let client_landlord_delete = client.clone();
    let client_activity_list = client.clone();
    let client_celebration = client.clone();

    let pool_landlord_create = pool.clone();
    let pool_landlord_list = pool.clone();
    let pool_landlord_get = pool.clone();
    let pool_landlord_update = pool.clone();
    let pool_landlord_delete = pool.clone();
    let pool_activity_list = pool.clone();
    let pool_celebration = pool.clone();

    let import_service_submit = Arc::clone(&import_service);

    // Spawn handlers
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let import_validate_handle = tokio::spawn(async move {
        import::handle_validate(client_import_validate, import_validate_sub).await
    });

    let import_submit_handle = tokio::spawn(async move {
        import::handle_submit(client_import_submit, import_submit_sub, import_service_submit).await
    });

    let landlord_create_handle = tokio::spawn(async move {
        landlord::handle_create(client_landlord_create, landlord_create_sub, pool_landlord_create)
            .await
    });

    let landlord_list_handle = tokio::spawn(async move {
        landlord::handle_list(client_landlord_list, landlord_list_sub, pool_landlord_list).await
    });

    let landlord_get_handle = tokio::spawn(async move {
        landlord::handle_get(client_landlord_get, landlord_get_sub, pool_landlord_get).await
    });

    let landlord_update_handle = tokio::spawn(async move {
        landlord::handle_update(client_landlord_update, landlord_update_sub, pool_landlord_update)
            .await
    });

    let landlord_delete_handle = tokio::spawn(async move {
        landlord::handle_delete(client_landlord_delete, landlord_delete_sub, pool_landlord_delete)
            .await
    });

    let activity_list_handle = tokio::spawn(async move {
        activity_log::handle_list(client_activity_list, activity_list_sub, pool_activity_list)
            .await
    });

    let celebration_handle = tokio::spawn(async move {
        celebration::handle_upcoming(client_celebration, celebration_upcoming_sub, pool_celebration)
            .await
    });

    info!("All handlers started, waiting for messages...");

    // Wait for any handler to finish (which means an error occurred)
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = import_validate_handle => {
            error!("Import validate handler finished: {:?}", result);
        }
        result = import_submit_handle => {
            error!("Import submit handler finished: {:?}", result);
        }
        result = landlord_create_handle => {
            error!("Landlord create handler finished: {:?}", result);
        }
        result = landlord_list_handle => {
            error!("Landlord list handler finished: {:?}", result);
        }
        result = landlord_get_handle => {
            error!("Landlord get handler finished: {:?}", result);
        }
        result = landlord_update_handle => {
            error!("Landlord update handler finished: {:?}", result);
        }
        result = landlord_delete_handle => {
            error!("Landlord delete handler finished: {:?}", result);
        }
        result = activity_list_handle => {
            error!("Activity list handler finished: {:?}", result);
        }
        result = celebration_handle => {
            error!("Celebration handler finished: {:?}", result);
        }
    }

    Ok(())
}
