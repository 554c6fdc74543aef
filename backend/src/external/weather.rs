//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap API for current conditions and the
//! 5 day / 3 hour forecast

use axum::http::StatusCode;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use shared::models::{CurrentConditions, WeatherSample};
use shared::types::GpsCoordinates;

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Ways a provider call can fail
#[derive(Error, Debug)]
pub enum WeatherProviderError {
    #[error("invalid API key")]
    InvalidApiKey,

    #[error("location not found")]
    LocationNotFound,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("cannot connect: {0}")]
    Unreachable(String),

    #[error("provider returned HTTP {0}")]
    Http(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl WeatherProviderError {
    /// Classify a non-success provider status code
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => WeatherProviderError::InvalidApiKey,
            404 => WeatherProviderError::LocationNotFound,
            429 => WeatherProviderError::RateLimited,
            other => WeatherProviderError::Http(other),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WeatherProviderError::Unreachable(_) | WeatherProviderError::RateLimited => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message_en(&self) -> String {
        match self {
            WeatherProviderError::InvalidApiKey => "Invalid weather API key".to_string(),
            WeatherProviderError::LocationNotFound => "Location not found".to_string(),
            WeatherProviderError::RateLimited => {
                "Weather API rate limit exceeded. Please try again later.".to_string()
            }
            WeatherProviderError::Unreachable(_) => {
                "Cannot connect to the weather service".to_string()
            }
            WeatherProviderError::Http(code) => {
                format!("Failed to fetch weather data (HTTP {})", code)
            }
            WeatherProviderError::InvalidResponse(_) => {
                "Invalid response from the weather service".to_string()
            }
        }
    }

    pub fn message_sw(&self) -> String {
        match self {
            WeatherProviderError::InvalidApiKey => {
                "Ufunguo wa API ya hali ya hewa si sahihi".to_string()
            }
            WeatherProviderError::LocationNotFound => "Eneo halikupatikana".to_string(),
            WeatherProviderError::RateLimited => {
                "Kikomo cha maombi kimezidi. Tafadhali jaribu tena baadaye.".to_string()
            }
            WeatherProviderError::Unreachable(_) => {
                "Imeshindwa kuunganisha na huduma ya hali ya hewa".to_string()
            }
            WeatherProviderError::Http(code) => {
                format!("Imeshindwa kupata data ya hali ya hewa (HTTP {})", code)
            }
            WeatherProviderError::InvalidResponse(_) => {
                "Jibu batili kutoka kwa huduma ya hali ya hewa".to_string()
            }
        }
    }
}

/// Where to look up weather for
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(GpsCoordinates),
    Name(String),
}

impl LocationQuery {
    /// Coordinates win when both are present, otherwise the place name is used
    pub fn resolve(
        location: Option<&str>,
        latitude: Option<Decimal>,
        longitude: Option<Decimal>,
    ) -> AppResult<Self> {
        if let (Some(lat), Some(lon)) = (latitude, longitude) {
            return Ok(LocationQuery::Coordinates(GpsCoordinates::new(lat, lon)));
        }

        match location.map(str::trim) {
            Some(name) if !name.is_empty() => Ok(LocationQuery::Name(name.to_string())),
            _ => Err(AppError::validation(
                "location",
                "Location or coordinates required",
                "Eneo au viwianishi vinahitajika",
            )),
        }
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Coordinates(coords) => vec![
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
            LocationQuery::Name(name) => vec![("q", name.clone())],
        }
    }
}

/// Raw forecast samples for a location
#[derive(Debug, Clone)]
pub struct ProviderForecast {
    pub location_name: String,
    pub samples: Vec<WeatherSample>,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    coord: OWMCoord,
    weather: Vec<OWMWeather>,
    main: OWMMain,
    wind: OWMWind,
    clouds: OWMClouds,
    rain: Option<OWMRain>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OWMCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    pressure: i32,
    humidity: i32,
}

#[derive(Debug, Default, Deserialize)]
struct OWMWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OWMClouds {
    all: i32,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    city: OWMCity,
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    weather: Vec<OWMWeather>,
    rain: Option<OWMRain>,
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

impl WeatherClient {
    /// Create a new WeatherClient from configuration
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Configuration(format!("Weather HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Fails with a configuration error when no API key is set, so a missing
    /// key never reaches the provider as a 401
    pub fn ensure_configured(&self) -> AppResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "Weather API key not configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Fetch current weather conditions
    pub async fn get_current_conditions(&self, query: &LocationQuery) -> AppResult<CurrentConditions> {
        self.ensure_configured()?;
        let data: OWMCurrentResponse = self.fetch("weather", query).await?;
        Ok(convert_current_response(data))
    }

    /// Fetch the 3-hourly forecast samples
    pub async fn get_forecast(&self, query: &LocationQuery) -> AppResult<ProviderForecast> {
        self.ensure_configured()?;
        let data: OWMForecastResponse = self.fetch("forecast", query).await?;
        Ok(convert_forecast_response(data))
    }

    async fn fetch<T>(&self, endpoint: &str, query: &LocationQuery) -> Result<T, WeatherProviderError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(&query.query_params())
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(endpoint, error = %e, "Weather provider unreachable");
                WeatherProviderError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = WeatherProviderError::from_status(status.as_u16());
            tracing::warn!(endpoint, status = status.as_u16(), "Weather provider error: {}", error);
            return Err(error);
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!(endpoint, error = %e, "Failed to parse weather response");
            WeatherProviderError::InvalidResponse(e.to_string())
        })
    }
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(data: OWMCurrentResponse) -> CurrentConditions {
    let weather = data.weather.first();
    let rainfall = data
        .rain
        .and_then(|r| r.one_hour)
        .map(to_decimal)
        .unwrap_or_default();

    CurrentConditions {
        location_name: data.name,
        coordinates: GpsCoordinates::new(to_decimal(data.coord.lat), to_decimal(data.coord.lon)),
        temperature_celsius: to_decimal(data.main.temp),
        feels_like_celsius: to_decimal(data.main.feels_like.unwrap_or(data.main.temp)),
        humidity_percent: data.main.humidity,
        pressure_hpa: data.main.pressure,
        wind_speed_mps: to_decimal(data.wind.speed),
        cloud_coverage_percent: data.clouds.all,
        rainfall_mm: rainfall,
        description: weather.map(|w| w.description.clone()).unwrap_or_default(),
        icon: weather.map(|w| w.icon.clone()).unwrap_or_default(),
    }
}

/// Convert OpenWeatherMap forecast response to our format
fn convert_forecast_response(data: OWMForecastResponse) -> ProviderForecast {
    let samples = data
        .list
        .into_iter()
        .map(|item| {
            let weather = item.weather.first();
            WeatherSample {
                timestamp: item.dt,
                temperature_celsius: to_decimal(item.main.temp),
                humidity_percent: item.main.humidity,
                rainfall_mm: item
                    .rain
                    .and_then(|r| r.three_hour)
                    .map(to_decimal)
                    .unwrap_or_default(),
                description: weather.map(|w| w.description.clone()).unwrap_or_default(),
                icon: weather.map(|w| w.icon.clone()).unwrap_or_default(),
            }
        })
        .collect();

    ProviderForecast {
        location_name: data.city.name,
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured_client() -> WeatherClient {
        let mut config = crate::config::test_config().weather;
        config.api_key = "  ".to_string();
        WeatherClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_missing_api_key_is_a_configuration_error() {
        let client = unconfigured_client();
        let query = LocationQuery::resolve(Some("Nairobi"), None, None).unwrap();

        let current = client.get_current_conditions(&query).await;
        assert!(matches!(current, Err(AppError::Configuration(_))));

        let forecast = client.get_forecast(&query).await;
        assert!(matches!(forecast, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_configured_client_passes_guard() {
        let client = WeatherClient::new(&crate::config::test_config().weather).unwrap();
        assert!(client.ensure_configured().is_ok());
        assert!(unconfigured_client().ensure_configured().is_err());
    }

    #[test]
    fn test_coordinates_preferred_over_name() {
        let query = LocationQuery::resolve(
            Some("Nairobi"),
            Some(Decimal::new(-1286, 3)),
            Some(Decimal::new(36817, 3)),
        )
        .unwrap();
        assert!(matches!(query, LocationQuery::Coordinates(_)));
        assert_eq!(
            query.query_params(),
            vec![("lat", "-1.286".to_string()), ("lon", "36.817".to_string())]
        );
    }

    #[test]
    fn test_partial_coordinates_fall_back_to_name() {
        let query = LocationQuery::resolve(Some(" Eldoret "), Some(Decimal::ONE), None).unwrap();
        assert_eq!(query, LocationQuery::Name("Eldoret".to_string()));
        assert_eq!(query.query_params(), vec![("q", "Eldoret".to_string())]);
    }

    #[test]
    fn test_missing_location_is_rejected() {
        assert!(LocationQuery::resolve(None, None, None).is_err());
        assert!(LocationQuery::resolve(Some("  "), None, Some(Decimal::ONE)).is_err());
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            WeatherProviderError::from_status(401),
            WeatherProviderError::InvalidApiKey
        ));
        assert!(matches!(
            WeatherProviderError::from_status(404),
            WeatherProviderError::LocationNotFound
        ));
        assert!(matches!(
            WeatherProviderError::from_status(429),
            WeatherProviderError::RateLimited
        ));

        let other = WeatherProviderError::from_status(500);
        assert!(matches!(other, WeatherProviderError::Http(500)));
        assert_eq!(other.message_en(), "Failed to fetch weather data (HTTP 500)");
    }

    #[test]
    fn test_reqwest_status_classification() {
        // reqwest carries its own StatusCode type, distinct from axum's
        let status = reqwest::StatusCode::TOO_MANY_REQUESTS;
        let error = WeatherProviderError::from_status(status.as_u16());
        assert!(matches!(error, WeatherProviderError::RateLimited));
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let error = WeatherProviderError::from_status(reqwest::StatusCode::BAD_GATEWAY.as_u16());
        assert!(matches!(error, WeatherProviderError::Http(502)));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_convert_current_response() {
        let data: OWMCurrentResponse = serde_json::from_str(
            r#"{
                "coord": {"lon": 36.5, "lat": -0.25},
                "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
                "main": {"temp": 24.5, "feels_like": 24.25, "pressure": 1015, "humidity": 61},
                "wind": {"speed": 3.5, "deg": 90},
                "clouds": {"all": 40},
                "rain": {"1h": 0.75},
                "dt": 1709550000,
                "name": "Nakuru"
            }"#,
        )
        .unwrap();

        let current = convert_current_response(data);
        assert_eq!(current.location_name, "Nakuru");
        assert_eq!(current.temperature_celsius, Decimal::new(245, 1));
        assert_eq!(current.humidity_percent, 61);
        assert_eq!(current.rainfall_mm, Decimal::new(75, 2));
        assert_eq!(current.description, "light rain");
        assert_eq!(current.coordinates.latitude, Decimal::new(-25, 2));
    }

    #[test]
    fn test_current_without_rain_reports_zero() {
        let data: OWMCurrentResponse = serde_json::from_str(
            r#"{
                "coord": {"lon": 36.5, "lat": -0.25},
                "weather": [],
                "main": {"temp": 30, "pressure": 1010, "humidity": 20},
                "wind": {"speed": 1},
                "clouds": {"all": 0},
                "name": "Garissa"
            }"#,
        )
        .unwrap();

        let current = convert_current_response(data);
        assert_eq!(current.rainfall_mm, Decimal::ZERO);
        assert_eq!(current.feels_like_celsius, Decimal::from(30));
        assert_eq!(current.icon, "");
    }

    #[test]
    fn test_convert_forecast_response() {
        let data: OWMForecastResponse = serde_json::from_str(
            r#"{
                "city": {"name": "Kisumu", "coord": {"lat": -0.1, "lon": 34.75}},
                "list": [
                    {
                        "dt": 1709553600,
                        "main": {"temp": 27.5, "pressure": 1012, "humidity": 70},
                        "weather": [{"description": "moderate rain", "icon": "10d"}],
                        "rain": {"3h": 2.5}
                    },
                    {
                        "dt": 1709564400,
                        "main": {"temp": 22, "pressure": 1013, "humidity": 80},
                        "weather": [{"description": "few clouds", "icon": "02n"}]
                    }
                ]
            }"#,
        )
        .unwrap();

        let forecast = convert_forecast_response(data);
        assert_eq!(forecast.location_name, "Kisumu");
        assert_eq!(forecast.samples.len(), 2);
        assert_eq!(forecast.samples[0].rainfall_mm, Decimal::new(25, 1));
        assert_eq!(forecast.samples[1].rainfall_mm, Decimal::ZERO);
        assert_eq!(forecast.samples[1].timestamp, 1_709_564_400);
    }
}
