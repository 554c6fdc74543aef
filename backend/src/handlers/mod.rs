//! HTTP request handlers

pub mod auth;
pub mod farm_profile;
pub mod health;
pub mod irrigation;
pub mod weather;

pub use auth::{login, logout, refresh, register};
pub use farm_profile::{get_farm_profile, save_farm_profile};
pub use health::health_check;
pub use irrigation::{calculate_for_current_weather, calculate_irrigation, get_irrigation_history};
pub use weather::{get_current_weather, get_weather_forecast};
