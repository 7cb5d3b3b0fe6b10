//! Shared types for the PVWatch module emulator.
//!
//! This crate defines the plain data structures exchanged between the numeric
//! core and whatever drives it:
//! - Datasheet and environment inputs for a single computation
//! - Environment sweep requests and their phases
//! - Real-time telemetry samples
//! - Emulator settings and configuration

mod params;
mod sample;
mod settings;
mod sweep;

pub use params::*;
pub use sample::*;
pub use settings::*;
pub use sweep::*;

/// Reference irradiance of the datasheet values (W/m²)
pub const IRRADIANCE_REFERENCE: f64 = 1000.0;

/// Reference cell temperature of the datasheet values (°C)
pub const TEMPERATURE_REFERENCE: f64 = 25.0;
