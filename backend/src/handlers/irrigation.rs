//! HTTP handlers for irrigation advisories

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::irrigation::{CurrentAdvisory, IrrigationLog};
use crate::services::IrrigationService;
use crate::AppState;
use shared::models::{AdvisoryInput, IrrigationResult};

fn irrigation_service(state: &AppState) -> IrrigationService {
    IrrigationService::new(state.db.clone(), state.config.forecast.zone())
}

/// Read an advisory request body.
///
/// Parsed straight from the bytes so weather numbers of any magnitude reach
/// the lenient decimal fields instead of failing as out of range.
pub fn parse_advisory_body(body: &[u8]) -> AppResult<AdvisoryInput> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected advisory request body");
        AppError::validation(
            "body",
            "Request body must be a JSON object",
            "Ombi lazima liwe kitu cha JSON",
        )
    })
}

/// Compute an advisory from supplied crop, soil and weather
pub async fn calculate_irrigation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    body: Bytes,
) -> AppResult<Json<IrrigationResult>> {
    let input = parse_advisory_body(&body)?;
    let result = irrigation_service(&state)
        .calculate(current_user.0.user_id, input)
        .await?;
    Ok(Json(result))
}

/// Compute an advisory for the user's farm from live weather
pub async fn calculate_for_current_weather(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<CurrentAdvisory>> {
    let advisory = irrigation_service(&state)
        .calculate_for_current_weather(current_user.0.user_id, &state.weather_client)
        .await?;
    Ok(Json(advisory))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Recent advisories for the user's farm
pub async fn get_irrigation_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<IrrigationLog>>> {
    let logs = irrigation_service(&state)
        .history_for_user(current_user.0.user_id, query.limit)
        .await?;
    Ok(Json(logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::TemperatureBand;

    #[test]
    fn test_huge_temperatures_count_as_hot() {
        let input = parse_advisory_body(br#"{"crop_type": "maize", "temperature": 1e30}"#).unwrap();
        assert_eq!(input.temperature, Some(Decimal::MAX));
        assert_eq!(input.compute().details.temp_factor, Decimal::new(130, 2));

        let input = parse_advisory_body(br#"{"crop_type": "maize", "temperature": 1e400}"#).unwrap();
        assert_eq!(
            TemperatureBand::classify(input.temperature_or_default()),
            TemperatureBand::Hot
        );
    }

    #[test]
    fn test_body_must_be_an_object() {
        assert!(parse_advisory_body(b"not json").is_err());
        assert!(parse_advisory_body(b"[1, 2]").is_err());
        assert!(parse_advisory_body(b"{}").is_ok());
    }
}
