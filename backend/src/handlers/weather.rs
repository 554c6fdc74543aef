//! HTTP handlers for weather endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppResult;
use crate::external::LocationQuery;
use crate::middleware::CurrentUser;
use crate::services::weather::ForecastSummary;
use crate::services::WeatherService;
use crate::AppState;
use shared::models::CurrentConditions;
use shared::types::Language;

/// Query parameters identifying a location
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub location: Option<String>,
    pub lat: Option<Decimal>,
    pub lon: Option<Decimal>,
    pub lang: Option<String>,
}

impl WeatherQuery {
    fn location_query(&self) -> AppResult<LocationQuery> {
        LocationQuery::resolve(self.location.as_deref(), self.lat, self.lon)
    }

    fn language(&self) -> Language {
        self.lang.as_deref().map(Language::from_code).unwrap_or_default()
    }
}

fn weather_service(state: &AppState) -> WeatherService {
    WeatherService::new(
        state.weather_client.clone(),
        state.config.forecast.zone(),
    )
}

/// Fetch current weather from the provider
pub async fn get_current_weather(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<WeatherQuery>,
) -> AppResult<Json<CurrentConditions>> {
    let location = query.location_query()?;
    let current = weather_service(&state).current(&location).await?;
    Ok(Json(current))
}

/// Daily forecast with an irrigation tip
pub async fn get_weather_forecast(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<WeatherQuery>,
) -> AppResult<Json<ForecastSummary>> {
    let location = query.location_query()?;
    let summary = weather_service(&state)
        .forecast(&location, query.language())
        .await?;
    Ok(Json(summary))
}
