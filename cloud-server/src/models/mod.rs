//! Data models

pub mod coerce;
pub mod sensor;

pub use sensor::*;
