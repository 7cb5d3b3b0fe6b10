//! Physical constants and model defaults

/// Boltzmann constant (J/K)
pub const BOLTZMANN: f64 = 1.380_648_52e-23;

/// Elementary charge (C)
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Offset added to the cell temperature (°C) in the thermal voltage
pub const THERMAL_OFFSET: f64 = 274.15;

/// Open-circuit voltage of a single reference cell (V)
pub const UNIT_CELL_VOC: f64 = 0.7;

/// Short-circuit current of a single reference cell (A)
pub const UNIT_CELL_ISC: f64 = 8.5;

/// Diode ideality factor of one cell
pub const IDEALITY_FACTOR: f64 = 1.0;

/// Series resistance seed for the fixed-point iteration (Ω)
pub const SERIES_RESISTANCE_SEED: f64 = 1.0;

/// Irradiance the datasheet is rated at (W/m²)
pub const IRRADIANCE_REFERENCE: f64 = pvwatch_types::IRRADIANCE_REFERENCE;
