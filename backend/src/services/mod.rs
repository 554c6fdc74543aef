//! Business logic services for the Farm Weather Advisory Platform

pub mod auth;
pub mod farm_profile;
pub mod irrigation;
pub mod weather;

pub use auth::AuthService;
pub use farm_profile::FarmProfileService;
pub use irrigation::IrrigationService;
pub use weather::WeatherService;
