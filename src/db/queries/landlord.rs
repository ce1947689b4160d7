//! Landlord database queries

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::landlord::{
    Landlord, LandlordStatus, NewLandlord, OccupancyType, OnboardingStatus, UpdateLandlordRequest,
};

const LANDLORD_COLUMNS: &str = r#"
    id, full_name, phone, occupancy_type, road, email, house_address, zone,
    date_of_birth, wedding_anniversary, celebrate_opt_in,
    onboarding_status, status, created_at, updated_at
"#;

fn onboarding_status_to_str(status: OnboardingStatus) -> &'static str {
    match status {
        OnboardingStatus::Pending => "pending",
        OnboardingStatus::InProgress => "in_progress",
        OnboardingStatus::Completed => "completed",
    }
}

fn landlord_status_to_str(status: LandlordStatus) -> &'static str {
    match status {
        LandlordStatus::Active => "active",
        LandlordStatus::Inactive => "inactive",
    }
}

/// Fetch the subset of `phones` that already exist in the landlord table.
/// One `= ANY` lookup for the whole candidate list, never per-row queries.
pub async fn find_existing_phones(pool: &PgPool, phones: &[String]) -> Result<Vec<String>> {
    let existing = sqlx::query_scalar::<_, String>(
        r#"SELECT phone FROM landlords WHERE phone = ANY($1)"#,
    )
    .bind(phones)
    .fetch_all(pool)
    .await?;

    Ok(existing)
}

/// Bulk-insert landlords in one statement. All-or-nothing: a constraint
/// violation anywhere fails the whole batch.
pub async fn insert_landlords(pool: &PgPool, rows: &[NewLandlord]) -> Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut full_names = Vec::with_capacity(rows.len());
    let mut phones = Vec::with_capacity(rows.len());
    let mut occupancy_types = Vec::with_capacity(rows.len());
    let mut roads = Vec::with_capacity(rows.len());
    let mut emails: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut house_addresses: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut zones = Vec::with_capacity(rows.len());
    let mut birthdays: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut anniversaries: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut opt_ins = Vec::with_capacity(rows.len());
    let mut onboarding_statuses = Vec::with_capacity(rows.len());
    let mut statuses = Vec::with_capacity(rows.len());

    for row in rows {
        full_names.push(row.full_name.clone());
        phones.push(row.phone.clone());
        occupancy_types.push(row.occupancy_type.as_str().to_string());
        roads.push(row.road.clone());
        emails.push(row.email.clone());
        house_addresses.push(row.house_address.clone());
        zones.push(row.zone.clone());
        birthdays.push(row.date_of_birth.clone());
        anniversaries.push(row.wedding_anniversary.clone());
        opt_ins.push(row.celebrate_opt_in);
        onboarding_statuses.push(onboarding_status_to_str(row.onboarding_status).to_string());
        statuses.push(landlord_status_to_str(row.status).to_string());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO landlords (
            id, full_name, phone, occupancy_type, road, email, house_address, zone,
            date_of_birth, wedding_anniversary, celebrate_opt_in,
            onboarding_status, status, created_at, updated_at
        )
        SELECT
            gen_random_uuid(), u.full_name, u.phone,
            u.occupancy_type::occupancy_type, u.road, u.email, u.house_address,
            u.zone, u.date_of_birth, u.wedding_anniversary, u.celebrate_opt_in,
            u.onboarding_status::onboarding_status, u.status::landlord_status,
            NOW(), NOW()
        FROM UNNEST(
            $1::text[], $2::text[], $3::text[], $4::text[], $5::text[],
            $6::text[], $7::text[], $8::text[], $9::text[], $10::boolean[],
            $11::text[], $12::text[]
        ) AS u(
            full_name, phone, occupancy_type, road, email, house_address,
            zone, date_of_birth, wedding_anniversary, celebrate_opt_in,
            onboarding_status, status
        )
        "#,
    )
    .bind(&full_names)
    .bind(&phones)
    .bind(&occupancy_types)
    .bind(&roads)
    .bind(&emails)
    .bind(&house_addresses)
    .bind(&zones)
    .bind(&birthdays)
    .bind(&anniversaries)
    .bind(&opt_ins)
    .bind(&onboarding_statuses)
    .bind(&statuses)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Create a single landlord
pub async fn create_landlord(pool: &PgPool, new: &NewLandlord) -> Result<Landlord> {
    let landlord = sqlx::query_as::<_, Landlord>(&format!(
        r#"
        INSERT INTO landlords (
            id, full_name, phone, occupancy_type, road, email, house_address, zone,
            date_of_birth, wedding_anniversary, celebrate_opt_in,
            onboarding_status, status, created_at, updated_at
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8,
            $9, $10, $11, $12, $13, NOW(), NOW()
        )
        RETURNING {LANDLORD_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&new.full_name)
    .bind(&new.phone)
    .bind(new.occupancy_type)
    .bind(&new.road)
    .bind(&new.email)
    .bind(&new.house_address)
    .bind(&new.zone)
    .bind(&new.date_of_birth)
    .bind(&new.wedding_anniversary)
    .bind(new.celebrate_opt_in)
    .bind(new.onboarding_status)
    .bind(new.status)
    .fetch_one(pool)
    .await?;

    Ok(landlord)
}

/// Get landlord by ID
pub async fn get_landlord(pool: &PgPool, landlord_id: Uuid) -> Result<Option<Landlord>> {
    let landlord = sqlx::query_as::<_, Landlord>(&format!(
        r#"SELECT {LANDLORD_COLUMNS} FROM landlords WHERE id = $1"#
    ))
    .bind(landlord_id)
    .fetch_optional(pool)
    .await?;

    Ok(landlord)
}

/// List landlords with optional search over name, phone and road
pub async fn list_landlords(
    pool: &PgPool,
    limit: i64,
    offset: i64,
    search: Option<&str>,
) -> Result<(Vec<Landlord>, i64)> {
    let pattern = search.map(|s| format!("%{}%", s.trim()));

    let landlords = sqlx::query_as::<_, Landlord>(&format!(
        r#"
        SELECT {LANDLORD_COLUMNS}
        FROM landlords
        WHERE ($3::text IS NULL OR full_name ILIKE $3 OR phone ILIKE $3 OR road ILIKE $3)
        ORDER BY full_name ASC
        LIMIT $1 OFFSET $2
        "#
    ))
    .bind(limit)
    .bind(offset)
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM landlords
        WHERE ($1::text IS NULL OR full_name ILIKE $1 OR phone ILIKE $1 OR road ILIKE $1)
        "#,
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((landlords, total))
}

/// Update a landlord
pub async fn update_landlord(
    pool: &PgPool,
    req: &UpdateLandlordRequest,
    canonical_phone: Option<&str>,
) -> Result<Option<Landlord>> {
    let landlord = sqlx::query_as::<_, Landlord>(&format!(
        r#"
        UPDATE landlords
        SET
            full_name = COALESCE($2, full_name),
            phone = COALESCE($3, phone),
            occupancy_type = COALESCE($4, occupancy_type),
            road = COALESCE($5, road),
            email = COALESCE($6, email),
            house_address = COALESCE($7, house_address),
            zone = COALESCE($8, zone),
            date_of_birth = COALESCE($9, date_of_birth),
            wedding_anniversary = COALESCE($10, wedding_anniversary),
            celebrate_opt_in = COALESCE($11, celebrate_opt_in),
            onboarding_status = COALESCE($12, onboarding_status),
            status = COALESCE($13, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {LANDLORD_COLUMNS}
        "#
    ))
    .bind(req.id)
    .bind(&req.full_name)
    .bind(canonical_phone)
    .bind(req.occupancy_type)
    .bind(&req.road)
    .bind(&req.email)
    .bind(&req.house_address)
    .bind(&req.zone)
    .bind(&req.date_of_birth)
    .bind(&req.wedding_anniversary)
    .bind(req.celebrate_opt_in)
    .bind(req.onboarding_status)
    .bind(req.status)
    .fetch_optional(pool)
    .await?;

    Ok(landlord)
}

/// Delete a landlord
pub async fn delete_landlord(pool: &PgPool, landlord_id: Uuid) -> Result<bool> {
    let result = sqlx::query(r#"DELETE FROM landlords WHERE id = $1"#)
        .bind(landlord_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch active landlords who opted into celebrations and have at least
/// one month-day date on record.
pub async fn list_celebrants(pool: &PgPool) -> Result<Vec<Landlord>> {
    let landlords = sqlx::query_as::<_, Landlord>(&format!(
        r#"
        SELECT {LANDLORD_COLUMNS}
        FROM landlords
        WHERE celebrate_opt_in
          AND status = 'active'
          AND (date_of_birth IS NOT NULL OR wedding_anniversary IS NOT NULL)
        ORDER BY full_name ASC
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(landlords)
}
