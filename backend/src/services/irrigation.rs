//! Irrigation advisory service
//!
//! Wraps the shared advisory calculation with the farm profile lookup,
//! the weather provider and the irrigation log.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::weather::{LocationQuery, WeatherClient};
use crate::services::farm_profile::{FarmProfile, FarmProfileService};
use shared::models::{AdvisoryInput, CurrentConditions, IrrigationResult};
use shared::validation::clamp_history_limit;

/// Irrigation advisory service
#[derive(Clone)]
pub struct IrrigationService {
    db: PgPool,
    zone: FixedOffset,
}

/// Stored advisory
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IrrigationLog {
    pub id: Uuid,
    pub farm_profile_id: Uuid,
    pub irrigation_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub water_amount: Decimal,
    pub frequency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub temperature: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub humidity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rainfall: Decimal,
    pub recommendation: String,
    pub created_at: DateTime<Utc>,
}

/// Weather inputs an advisory was computed from, after defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedWeather {
    pub temperature: Decimal,
    pub humidity: Decimal,
    pub rainfall: Decimal,
}

impl From<&AdvisoryInput> for AppliedWeather {
    fn from(input: &AdvisoryInput) -> Self {
        Self {
            temperature: input.temperature_or_default(),
            humidity: input.humidity_or_default(),
            rainfall: input.rainfall_or_default(),
        }
    }
}

/// Advisory for a farm under its current weather
#[derive(Debug, Clone, Serialize)]
pub struct CurrentAdvisory {
    pub farm_profile_id: Uuid,
    pub weather: CurrentConditions,
    pub advisory: IrrigationResult,
}

impl IrrigationService {
    /// `zone` decides which calendar day a log entry is filed under
    pub fn new(db: PgPool, zone: FixedOffset) -> Self {
        Self { db, zone }
    }

    /// Compute an advisory and, when the user has a farm profile, log it
    pub async fn calculate(&self, user_id: Uuid, input: AdvisoryInput) -> AppResult<IrrigationResult> {
        let result = input.compute();

        tracing::info!(
            user_id = %user_id,
            crop = %input.crop_type,
            soil = %input.soil_type,
            water_amount = %result.water_amount,
            "Computed irrigation advisory"
        );

        let profiles = FarmProfileService::new(self.db.clone());
        match profiles.find_for_user(user_id).await? {
            Some(profile) => {
                self.persist_log(&profile, AppliedWeather::from(&input), &result)
                    .await?;
            }
            None => {
                tracing::debug!(user_id = %user_id, "No farm profile, advisory not logged");
            }
        }

        Ok(result)
    }

    /// Advisory for the user's farm using live conditions at its location
    pub async fn calculate_for_current_weather(
        &self,
        user_id: Uuid,
        weather_client: &WeatherClient,
    ) -> AppResult<CurrentAdvisory> {
        let profile = FarmProfileService::new(self.db.clone()).get(user_id).await?;

        let query = LocationQuery::resolve(
            Some(profile.location.as_str()),
            profile.latitude,
            profile.longitude,
        )?;
        let weather = weather_client.get_current_conditions(&query).await?;

        let input = weather.advisory_input(&profile.crop_type, &profile.soil_type);
        let advisory = input.compute();

        tracing::info!(
            user_id = %user_id,
            location = %weather.location_name,
            water_amount = %advisory.water_amount,
            "Computed irrigation advisory from current weather"
        );

        self.persist_log(&profile, AppliedWeather::from(&input), &advisory)
            .await?;

        Ok(CurrentAdvisory {
            farm_profile_id: profile.id,
            weather,
            advisory,
        })
    }

    /// Append an advisory to the farm's log, dated today in the reference zone
    pub async fn persist_log(
        &self,
        profile: &FarmProfile,
        weather: AppliedWeather,
        result: &IrrigationResult,
    ) -> AppResult<IrrigationLog> {
        let today = Utc::now().with_timezone(&self.zone).date_naive();

        let log = sqlx::query_as::<_, IrrigationLog>(
            r#"
            INSERT INTO irrigation_logs
                (user_id, farm_profile_id, irrigation_date, water_amount, frequency,
                 temperature, humidity, rainfall, recommendation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, farm_profile_id, irrigation_date, water_amount, frequency,
                      temperature, humidity, rainfall, recommendation, created_at
            "#,
        )
        .bind(profile.user_id)
        .bind(profile.id)
        .bind(today)
        .bind(result.water_amount)
        .bind(result.frequency.as_str())
        .bind(weather.temperature)
        .bind(weather.humidity)
        .bind(weather.rainfall)
        .bind(&result.recommendation)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(log_id = %log.id, farm_profile_id = %profile.id, "Logged irrigation advisory");

        Ok(log)
    }

    /// Most recent log entries for a farm, newest first
    pub async fn read_log_history(
        &self,
        farm_profile_id: Uuid,
        limit: Option<i64>,
    ) -> AppResult<Vec<IrrigationLog>> {
        let logs = sqlx::query_as::<_, IrrigationLog>(
            r#"
            SELECT id, farm_profile_id, irrigation_date, water_amount, frequency,
                   temperature, humidity, rainfall, recommendation, created_at
            FROM irrigation_logs
            WHERE farm_profile_id = $1
            ORDER BY irrigation_date DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(farm_profile_id)
        .bind(clamp_history_limit(limit))
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }

    /// Log history for the user's farm; empty when no profile exists
    pub async fn history_for_user(&self, user_id: Uuid, limit: Option<i64>) -> AppResult<Vec<IrrigationLog>> {
        match FarmProfileService::new(self.db.clone())
            .find_for_user(user_id)
            .await?
        {
            Some(profile) => self.read_log_history(profile.id, limit).await,
            None => Ok(Vec::new()),
        }
    }
}
