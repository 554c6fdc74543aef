//! Domain models for the Farm Weather Advisory platform

mod forecast;
mod irrigation;
mod weather;

pub use forecast::*;
pub use irrigation::*;
pub use weather::*;
