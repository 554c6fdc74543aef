//! WebAssembly module for the Farm Weather Advisory Platform
//!
//! Provides client-side computation for:
//! - Irrigation advisories while offline
//! - Daily forecast summaries from cached provider samples
//! - Forecast irrigation tips

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// NaN reads as zero; magnitudes beyond the decimal range saturate
fn decimal(value: f64) -> Decimal {
    if value.is_nan() {
        return Decimal::ZERO;
    }
    Decimal::try_from(value).unwrap_or(if value > 0.0 {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

/// Compute an advisory from a JSON request `{crop_type, soil_type, temperature?, humidity?, rainfall?}`
#[wasm_bindgen]
pub fn compute_irrigation_advisory(request_json: &str) -> Result<String, JsValue> {
    advisory_json(request_json).map_err(|e| JsValue::from_str(&e))
}

fn advisory_json(request_json: &str) -> Result<String, String> {
    let input: AdvisoryInput = serde_json::from_str(request_json)
        .map_err(|e| format!("Invalid advisory request JSON: {}", e))?;

    serde_json::to_string(&input.compute()).map_err(|e| e.to_string())
}

/// Recommended water in L/m² for the given conditions
#[wasm_bindgen]
pub fn estimate_water_amount(
    crop_type: &str,
    soil_type: &str,
    temperature: f64,
    humidity: f64,
    rainfall: f64,
) -> f64 {
    let result = compute_advisory(
        crop_type,
        soil_type,
        decimal(temperature),
        decimal(humidity),
        decimal(rainfall).max(Decimal::ZERO),
    );
    result.water_amount.to_f64().unwrap_or(0.0)
}

/// Irrigation frequency label for a water amount
#[wasm_bindgen]
pub fn irrigation_frequency(water_amount: f64) -> String {
    IrrigationFrequency::classify(decimal(water_amount)).to_string()
}

/// Crops with a known base water need, as a JSON array
#[wasm_bindgen]
pub fn supported_crops() -> String {
    let names: Vec<&str> = CropType::ALL.iter().map(|c| c.as_str()).collect();
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}

/// Summarize cached provider samples (JSON array) into daily forecasts
#[wasm_bindgen]
pub fn aggregate_forecast_json(samples_json: &str, utc_offset_seconds: i32) -> Result<String, JsValue> {
    daily_forecast_json(samples_json, utc_offset_seconds).map_err(|e| JsValue::from_str(&e))
}

fn daily_forecast_json(samples_json: &str, utc_offset_seconds: i32) -> Result<String, String> {
    let samples: Vec<WeatherSample> = serde_json::from_str(samples_json)
        .map_err(|e| format!("Invalid samples JSON: {}", e))?;

    let days = aggregate_forecast(&samples, &reference_zone(utc_offset_seconds));
    serde_json::to_string(&days).map_err(|e| e.to_string())
}

/// Irrigation tip for daily forecasts as produced by `aggregate_forecast_json`
#[wasm_bindgen]
pub fn forecast_tip_message(days_json: &str, language: &str) -> Result<String, JsValue> {
    tip_message(days_json, language).map_err(|e| JsValue::from_str(&e))
}

fn tip_message(days_json: &str, language: &str) -> Result<String, String> {
    let days: Vec<DailyForecast> = serde_json::from_str(days_json)
        .map_err(|e| format!("Invalid forecast JSON: {}", e))?;

    let tip = forecast_tip(&days);
    Ok(tip.message(Language::from_code(language)).to_string())
}
