//! Weather data models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::AdvisoryInput;
use crate::types::GpsCoordinates;

/// One provider reading at its native granularity (3-hour slots)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSample {
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    /// Rain that fell within the slot
    #[serde(default)]
    pub rainfall_mm: Decimal,
    pub description: String,
    pub icon: String,
}

/// Current conditions at a location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub coordinates: GpsCoordinates,
    #[serde(with = "rust_decimal::serde::float")]
    pub temperature_celsius: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub feels_like_celsius: Decimal,
    pub humidity_percent: i32,
    pub pressure_hpa: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub wind_speed_mps: Decimal,
    pub cloud_coverage_percent: i32,
    /// Rain over the last hour, zero when the provider reports none
    #[serde(with = "rust_decimal::serde::float")]
    pub rainfall_mm: Decimal,
    pub description: String,
    pub icon: String,
}

impl CurrentConditions {
    /// Advisory input for a farm's crop and soil under these conditions
    pub fn advisory_input(&self, crop_type: &str, soil_type: &str) -> AdvisoryInput {
        AdvisoryInput {
            crop_type: crop_type.to_string(),
            soil_type: soil_type.to_string(),
            temperature: Some(self.temperature_celsius),
            humidity: Some(Decimal::from(self.humidity_percent)),
            rainfall: Some(self.rainfall_mm),
        }
    }
}
