//! Weather service for current conditions and daily forecasts

use chrono::FixedOffset;
use serde::Serialize;

use crate::error::AppResult;
use crate::external::weather::{LocationQuery, ProviderForecast, WeatherClient};
use shared::models::{aggregate_forecast, forecast_tip, CurrentConditions, DailyForecast, ForecastTip};
use shared::types::Language;

/// Weather service backed by the provider client
#[derive(Clone)]
pub struct WeatherService {
    client: WeatherClient,
    zone: FixedOffset,
}

/// Daily forecast with an irrigation tip
#[derive(Debug, Clone, Serialize)]
pub struct ForecastSummary {
    pub location: String,
    pub forecast: Vec<DailyForecast>,
    pub tip: ForecastTip,
    pub tip_message: String,
    pub language: Language,
}

impl WeatherService {
    pub fn new(client: WeatherClient, zone: FixedOffset) -> Self {
        Self { client, zone }
    }

    /// Current conditions at a location
    pub async fn current(&self, query: &LocationQuery) -> AppResult<CurrentConditions> {
        self.client.get_current_conditions(query).await
    }

    /// Up to seven daily summaries for a location
    pub async fn forecast(&self, query: &LocationQuery, language: Language) -> AppResult<ForecastSummary> {
        let provider = self.client.get_forecast(query).await?;
        let summary = summarize(provider, &self.zone, language);

        tracing::debug!(
            location = %summary.location,
            days = summary.forecast.len(),
            tip = ?summary.tip,
            "Aggregated forecast"
        );

        Ok(summary)
    }
}

/// Reduce provider samples to daily summaries and pick the tip
pub fn summarize(provider: ProviderForecast, zone: &FixedOffset, language: Language) -> ForecastSummary {
    let forecast = aggregate_forecast(&provider.samples, zone);
    let tip = forecast_tip(&forecast);

    ForecastSummary {
        location: provider.location_name,
        forecast,
        tip,
        tip_message: tip.message(language).to_string(),
        language,
    }
}
