//! Route definitions for the Farm Weather Advisory Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - farm profile
        .nest("/farm-profile", farm_profile_routes(state.clone()))
        // Protected routes - weather
        .nest("/weather", weather_routes(state.clone()))
        // Protected routes - irrigation advisory
        .nest("/irrigation", irrigation_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
}

/// Farm profile routes (protected)
fn farm_profile_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_farm_profile).put(handlers::save_farm_profile),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Weather routes (protected)
fn weather_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/current", get(handlers::get_current_weather))
        .route("/forecast", get(handlers::get_weather_forecast))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Irrigation advisory routes (protected)
fn irrigation_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/calculate", post(handlers::calculate_irrigation))
        .route("/current", post(handlers::calculate_for_current_weather))
        .route("/history", get(handlers::get_irrigation_history))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
