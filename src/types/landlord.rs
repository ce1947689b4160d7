//! Landlord types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Occupancy type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "occupancy_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OccupancyType {
    Owner,
    Tenant,
}

impl OccupancyType {
    /// Parse from free text, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Some(OccupancyType::Owner),
            "tenant" => Some(OccupancyType::Tenant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OccupancyType::Owner => "owner",
            OccupancyType::Tenant => "tenant",
        }
    }
}

/// Onboarding status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "onboarding_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    Pending,
    InProgress,
    Completed,
}

impl Default for OnboardingStatus {
    fn default() -> Self {
        OnboardingStatus::Pending
    }
}

/// Landlord record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "landlord_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LandlordStatus {
    Active,
    Inactive,
}

impl Default for LandlordStatus {
    fn default() -> Self {
        LandlordStatus::Active
    }
}

/// Landlord entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Landlord {
    pub id: Uuid,
    pub full_name: String,
    /// Canonical form: `+234` followed by exactly 10 digits.
    pub phone: String,
    pub occupancy_type: OccupancyType,
    pub road: String,
    pub email: Option<String>,
    pub house_address: Option<String>,
    pub zone: String,
    /// Canonical `MM-DD`, zero-padded. Year is never stored.
    pub date_of_birth: Option<String>,
    /// Canonical `MM-DD`, zero-padded.
    pub wedding_anniversary: Option<String>,
    pub celebrate_opt_in: bool,
    pub onboarding_status: OnboardingStatus,
    pub status: LandlordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully validated insert payload. Produced only for rows that passed
/// row-level validation; all fields are already canonical.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLandlord {
    pub full_name: String,
    pub phone: String,
    pub occupancy_type: OccupancyType,
    pub road: String,
    pub email: Option<String>,
    pub house_address: Option<String>,
    pub zone: String,
    pub date_of_birth: Option<String>,
    pub wedding_anniversary: Option<String>,
    pub celebrate_opt_in: bool,
    pub onboarding_status: OnboardingStatus,
    pub status: LandlordStatus,
}

/// Request to create a single landlord
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLandlordRequest {
    pub full_name: String,
    pub phone: String,
    pub occupancy_type: OccupancyType,
    pub road: String,
    pub email: Option<String>,
    pub house_address: Option<String>,
    pub zone: Option<String>,
    pub date_of_birth: Option<String>,
    pub wedding_anniversary: Option<String>,
    pub celebrate_opt_in: Option<bool>,
}

/// Request to update a landlord
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLandlordRequest {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub occupancy_type: Option<OccupancyType>,
    pub road: Option<String>,
    pub email: Option<String>,
    pub house_address: Option<String>,
    pub zone: Option<String>,
    pub date_of_birth: Option<String>,
    pub wedding_anniversary: Option<String>,
    pub celebrate_opt_in: Option<bool>,
    pub onboarding_status: Option<OnboardingStatus>,
    pub status: Option<LandlordStatus>,
}

/// Request to fetch or delete a landlord by id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlordIdRequest {
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupancy_type_parse_case_insensitive() {
        assert_eq!(OccupancyType::parse("Owner"), Some(OccupancyType::Owner));
        assert_eq!(OccupancyType::parse("TENANT"), Some(OccupancyType::Tenant));
        assert_eq!(OccupancyType::parse("  tenant "), Some(OccupancyType::Tenant));
        assert_eq!(OccupancyType::parse("landlord"), None);
        assert_eq!(OccupancyType::parse(""), None);
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(OnboardingStatus::default(), OnboardingStatus::Pending);
        assert_eq!(LandlordStatus::default(), LandlordStatus::Active);
    }
}
