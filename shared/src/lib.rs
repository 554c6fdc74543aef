//! Shared types and models for the Farm Weather Advisory platform
//!
//! This crate holds the irrigation advisory calculation and the forecast
//! aggregation, together with the types shared between the backend and the
//! browser (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
