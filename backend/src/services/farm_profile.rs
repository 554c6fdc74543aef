//! Farm profile service
//!
//! Each farmer keeps a single profile describing where the farm is and what
//! grows on it. The advisory reads crop, soil and location from here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{validate_farm_size, validate_latitude, validate_longitude, validate_required};

/// Farm profile service
#[derive(Clone)]
pub struct FarmProfileService {
    db: PgPool,
}

/// Farm profile record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FarmProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub farm_name: Option<String>,
    pub location: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub crop_type: String,
    pub soil_type: String,
    pub farm_size: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a farm profile
#[derive(Debug, Deserialize)]
pub struct SaveFarmProfileInput {
    pub farm_name: Option<String>,
    #[serde(default)]
    pub location: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    #[serde(default)]
    pub crop_type: String,
    #[serde(default)]
    pub soil_type: String,
    pub farm_size: Option<Decimal>,
}

impl SaveFarmProfileInput {
    pub fn validate(&self) -> AppResult<()> {
        if validate_required(&self.location).is_err()
            || validate_required(&self.crop_type).is_err()
            || validate_required(&self.soil_type).is_err()
        {
            return Err(AppError::validation(
                "location",
                "Location, crop type, and soil type are required",
                "Eneo, aina ya zao na aina ya udongo vinahitajika",
            ));
        }
        if let Some(lat) = self.latitude {
            validate_latitude(lat).map_err(|msg| {
                AppError::validation("latitude", msg, "Latitudo lazima iwe kati ya -90 na 90")
            })?;
        }
        if let Some(lon) = self.longitude {
            validate_longitude(lon).map_err(|msg| {
                AppError::validation("longitude", msg, "Longitudo lazima iwe kati ya -180 na 180")
            })?;
        }
        if let Some(size) = self.farm_size {
            validate_farm_size(size).map_err(|msg| {
                AppError::validation("farm_size", msg, "Ukubwa wa shamba lazima uwe zaidi ya sifuri")
            })?;
        }
        Ok(())
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl FarmProfileService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the user's profile or replace the existing one
    pub async fn save(&self, user_id: Uuid, input: SaveFarmProfileInput) -> AppResult<FarmProfile> {
        input.validate()?;

        let profile = sqlx::query_as::<_, FarmProfile>(
            r#"
            INSERT INTO farm_profiles
                (user_id, farm_name, location, latitude, longitude, crop_type, soil_type, farm_size)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                farm_name = EXCLUDED.farm_name,
                location = EXCLUDED.location,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                crop_type = EXCLUDED.crop_type,
                soil_type = EXCLUDED.soil_type,
                farm_size = EXCLUDED.farm_size,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(trimmed(&input.farm_name))
        .bind(input.location.trim())
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.crop_type.trim().to_lowercase())
        .bind(input.soil_type.trim().to_lowercase())
        .bind(input.farm_size)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user_id, profile_id = %profile.id, "Saved farm profile");

        Ok(profile)
    }

    /// Get the user's profile
    pub async fn get(&self, user_id: Uuid) -> AppResult<FarmProfile> {
        self.find_for_user(user_id)
            .await?
            .ok_or(AppError::NoFarmProfile)
    }

    /// Look up the user's profile, if one has been set up
    pub async fn find_for_user(&self, user_id: Uuid) -> AppResult<Option<FarmProfile>> {
        let profile = sqlx::query_as::<_, FarmProfile>(
            "SELECT * FROM farm_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }
}
