//! Account handlers: registration, login and refresh-token rotation

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::auth::{AuthTokens, RegisterInput, RegisteredUser};
use crate::services::AuthService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenBody {
    #[serde(default)]
    pub refresh_token: String,
}

impl RefreshTokenBody {
    fn token(&self) -> AppResult<&str> {
        let token = self.refresh_token.trim();
        if token.is_empty() {
            return Err(AppError::validation(
                "refresh_token",
                "Refresh token is required",
                "Tokeni ya kuonyesha upya inahitajika",
            ));
        }
        Ok(token)
    }
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message_en: &'static str,
    pub message_sw: &'static str,
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.db.clone(), &state.config)
}

/// Create a farmer account; the caller logs in separately
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<RegisteredUser>)> {
    let user = auth_service(&state).register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<AuthTokens>> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::validation(
            "email",
            "Email and password are required",
            "Barua pepe na nenosiri vinahitajika",
        ));
    }

    let tokens = auth_service(&state)
        .login(&credentials.email, &credentials.password)
        .await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new pair; the old token stops working
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenBody>,
) -> AppResult<Json<AuthTokens>> {
    let tokens = auth_service(&state).refresh_token(body.token()?).await?;
    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenBody>,
) -> AppResult<Json<LogoutResponse>> {
    auth_service(&state).logout(body.token()?).await?;

    Ok(Json(LogoutResponse {
        message_en: "Logged out successfully",
        message_sw: "Umetoka kwa mafanikio",
    }))
}
