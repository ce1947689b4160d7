//! Landlord CRUD message handlers
//!
//! Single-record operations for the admin console. Phone numbers and
//! month-day dates go through the same canonicalization as the bulk
//! import, so a landlord created here is indistinguishable from one
//! imported from CSV.

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use sqlx::PgPool;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::db::queries;
use crate::defaults;
use crate::services::normalize;
use crate::types::{
    CreateLandlordRequest, ErrorResponse, Landlord, LandlordIdRequest, ListRequest, ListResponse,
    NewLandlord, Request, SuccessResponse, UpdateLandlordRequest,
};

/// Canonicalize and validate a create request. Returns the error code
/// and message on rejection.
fn prepare_create(req: &CreateLandlordRequest) -> Result<NewLandlord, (String, String)> {
    if req.full_name.trim().is_empty() {
        return Err((
            "INVALID_REQUEST".to_string(),
            "fullName is required".to_string(),
        ));
    }
    if req.road.trim().is_empty() {
        return Err(("INVALID_REQUEST".to_string(), "road is required".to_string()));
    }

    let phone = normalize::normalize_phone(&req.phone);
    if !normalize::is_valid_phone(&phone) {
        return Err((
            "INVALID_PHONE".to_string(),
            "Invalid phone number".to_string(),
        ));
    }

    let date_of_birth = prepare_month_day(req.date_of_birth.as_deref(), "dateOfBirth")?;
    let wedding_anniversary =
        prepare_month_day(req.wedding_anniversary.as_deref(), "weddingAnniversary")?;

    if let Some(ref email) = req.email {
        if !normalize::is_valid_email(email) {
            return Err((
                "INVALID_EMAIL".to_string(),
                "Invalid email format".to_string(),
            ));
        }
    }

    Ok(NewLandlord {
        full_name: req.full_name.trim().to_string(),
        phone,
        occupancy_type: req.occupancy_type,
        road: req.road.trim().to_string(),
        email: req.email.clone(),
        house_address: req.house_address.clone(),
        zone: req
            .zone
            .clone()
            .filter(|z| !z.trim().is_empty())
            .unwrap_or_else(|| defaults::DEFAULT_ZONE.to_string()),
        date_of_birth,
        wedding_anniversary,
        celebrate_opt_in: req.celebrate_opt_in.unwrap_or(false),
        onboarding_status: Default::default(),
        status: Default::default(),
    })
}

fn prepare_month_day(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<String>, (String, String)> {
    match raw {
        None => Ok(None),
        Some(value) => {
            if !normalize::is_valid_month_day(value) {
                return Err((
                    "INVALID_DATE".to_string(),
                    format!("Invalid {} (expected DD-MM or MM-DD)", field),
                ));
            }
            Ok(Some(normalize::format_month_day(value)))
        }
    }
}

/// Handle landlord.create messages
pub async fn handle_create(client: Client, mut subscriber: Subscriber, pool: PgPool) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received landlord.create message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<CreateLandlordRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let new = match prepare_create(&request.payload) {
            Ok(new) => new,
            Err((code, message)) => {
                let error = ErrorResponse::new(request.id, code, message);
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        // Same fail-closed rule as the bulk import: a lookup error means
        // no insert.
        match queries::landlord::find_existing_phones(&pool, &[new.phone.clone()]).await {
            Ok(existing) if !existing.is_empty() => {
                let error = ErrorResponse::new(
                    request.id,
                    "DUPLICATE_PHONE",
                    "Phone number already exists",
                );
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                error!("Phone existence lookup failed: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        }

        match queries::landlord::create_landlord(&pool, &new).await {
            Ok(landlord) => {
                let response = SuccessResponse::new(request.id, landlord);
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
                debug!("Created landlord: {}", response.payload.id);
            }
            Err(e) => {
                error!("Failed to create landlord: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle landlord.list messages
pub async fn handle_list(client: Client, mut subscriber: Subscriber, pool: PgPool) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received landlord.list message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<ListRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let ListRequest { limit, offset, search } = request.payload;
        match queries::landlord::list_landlords(&pool, limit, offset, search.as_deref()).await {
            Ok((landlords, total)) => {
                let response = SuccessResponse::new(
                    request.id,
                    ListResponse::<Landlord> {
                        items: landlords,
                        total,
                        limit,
                        offset,
                    },
                );
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Failed to list landlords: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle landlord.get messages
pub async fn handle_get(client: Client, mut subscriber: Subscriber, pool: PgPool) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received landlord.get message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<LandlordIdRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match queries::landlord::get_landlord(&pool, request.payload.id).await {
            Ok(Some(landlord)) => {
                let response = SuccessResponse::new(request.id, landlord);
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Ok(None) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Landlord not found");
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
            Err(e) => {
                error!("Failed to get landlord: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle landlord.update messages
pub async fn handle_update(client: Client, mut subscriber: Subscriber, pool: PgPool) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received landlord.update message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<UpdateLandlordRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let (update, canonical_phone) = match prepare_update(request.payload) {
            Ok(prepared) => prepared,
            Err((code, message)) => {
                let error = ErrorResponse::new(request.id, code, message);
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match queries::landlord::update_landlord(&pool, &update, canonical_phone.as_deref()).await {
            Ok(Some(landlord)) => {
                let response = SuccessResponse::new(request.id, landlord);
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Ok(None) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Landlord not found");
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
            Err(e) => {
                error!("Failed to update landlord: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Canonicalize the changed fields of an update request. The canonical
/// phone travels separately so the query layer can bind it in place of
/// the raw value.
fn prepare_update(
    mut req: UpdateLandlordRequest,
) -> Result<(UpdateLandlordRequest, Option<String>), (String, String)> {
    let canonical_phone = match req.phone.take() {
        None => None,
        Some(raw) => {
            let phone = normalize::normalize_phone(&raw);
            if !normalize::is_valid_phone(&phone) {
                return Err((
                    "INVALID_PHONE".to_string(),
                    "Invalid phone number".to_string(),
                ));
            }
            Some(phone)
        }
    };

    req.date_of_birth = prepare_month_day(req.date_of_birth.as_deref(), "dateOfBirth")?;
    req.wedding_anniversary =
        prepare_month_day(req.wedding_anniversary.as_deref(), "weddingAnniversary")?;

    if let Some(ref email) = req.email {
        if !normalize::is_valid_email(email) {
            return Err((
                "INVALID_EMAIL".to_string(),
                "Invalid email format".to_string(),
            ));
        }
    }

    Ok((req, canonical_phone))
}

/// Handle landlord.delete messages
pub async fn handle_delete(client: Client, mut subscriber: Subscriber, pool: PgPool) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received landlord.delete message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<LandlordIdRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match queries::landlord::delete_landlord(&pool, request.payload.id).await {
            Ok(true) => {
                let response =
                    SuccessResponse::new(request.id, serde_json::json!({ "deleted": true }));
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Ok(false) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Landlord not found");
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
            Err(e) => {
                error!("Failed to delete landlord: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OccupancyType;

    fn create_request() -> CreateLandlordRequest {
        CreateLandlordRequest {
            full_name: "Ada Obi".to_string(),
            phone: "0801 234 5678".to_string(),
            occupancy_type: OccupancyType::Owner,
            road: "Road 1".to_string(),
            email: None,
            house_address: None,
            zone: None,
            date_of_birth: Some("25-12".to_string()),
            wedding_anniversary: None,
            celebrate_opt_in: None,
        }
    }

    #[test]
    fn test_prepare_create_canonicalizes() {
        let new = prepare_create(&create_request()).unwrap();
        assert_eq!(new.phone, "+2348012345678");
        assert_eq!(new.date_of_birth.as_deref(), Some("12-25"));
        assert_eq!(new.zone, "Zone D");
        assert!(!new.celebrate_opt_in);
    }

    #[test]
    fn test_prepare_create_rejects_bad_phone() {
        let mut req = create_request();
        req.phone = "12345".to_string();
        let (code, _) = prepare_create(&req).unwrap_err();
        assert_eq!(code, "INVALID_PHONE");
    }

    #[test]
    fn test_prepare_create_rejects_bad_date() {
        let mut req = create_request();
        req.date_of_birth = Some("99-99".to_string());
        let (code, message) = prepare_create(&req).unwrap_err();
        assert_eq!(code, "INVALID_DATE");
        assert!(message.contains("dateOfBirth"));
    }

    #[test]
    fn test_prepare_update_normalizes_phone_separately() {
        let req = UpdateLandlordRequest {
            id: Uuid::new_v4(),
            full_name: None,
            phone: Some("08012345678".to_string()),
            occupancy_type: None,
            road: None,
            email: None,
            house_address: None,
            zone: None,
            date_of_birth: None,
            wedding_anniversary: None,
            celebrate_opt_in: None,
            onboarding_status: None,
            status: None,
        };
        let (update, canonical) = prepare_update(req).unwrap();
        assert!(update.phone.is_none());
        assert_eq!(canonical.as_deref(), Some("+2348012345678"));
    }
}
