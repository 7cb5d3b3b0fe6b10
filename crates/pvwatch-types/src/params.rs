//! Module input parameters.

use serde::{Deserialize, Serialize};

use crate::{IRRADIANCE_REFERENCE, TEMPERATURE_REFERENCE};

/// Datasheet and environmental inputs for one curve computation.
///
/// The datasheet points are expected to satisfy `0 < i_mp < i_sc` and
/// `0 < v_mp < v_oc`. Nothing here enforces that: inconsistent values are
/// carried through to the solver, which produces a degenerate curve rather
/// than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleParameters {
    /// Open-circuit voltage (V)
    pub v_oc: f64,

    /// Short-circuit current (A)
    pub i_sc: f64,

    /// Voltage at the maximum power point (V)
    pub v_mp: f64,

    /// Current at the maximum power point (A)
    pub i_mp: f64,

    /// Irradiance (W/m²)
    pub irradiance: f64,

    /// Cell temperature (°C)
    pub temperature: f64,

    /// Number of samples along the I-V curve
    pub steps: usize,

    /// Fixed-point iteration count, used both for the series resistance and
    /// for every current sample
    pub iterations: usize,
}

impl Default for ModuleParameters {
    fn default() -> Self {
        Self {
            v_oc: 35.0,
            i_sc: 9.0,
            v_mp: 30.0,
            i_mp: 8.5,
            irradiance: IRRADIANCE_REFERENCE,
            temperature: TEMPERATURE_REFERENCE,
            // Empty until the first plot
            steps: 0,
            iterations: 50,
        }
    }
}

impl ModuleParameters {
    /// Create parameters from the four datasheet points at the reference
    /// environment.
    pub fn from_datasheet(v_oc: f64, i_sc: f64, v_mp: f64, i_mp: f64) -> Self {
        Self {
            v_oc,
            i_sc,
            v_mp,
            i_mp,
            ..Self::default()
        }
    }

    /// Same datasheet, different operating point.
    pub fn with_environment(mut self, irradiance: f64, temperature: f64) -> Self {
        self.irradiance = irradiance;
        self.temperature = temperature;
        self
    }

    /// Same datasheet, different curve resolution.
    pub fn with_resolution(mut self, steps: usize, iterations: usize) -> Self {
        self.steps = steps;
        self.iterations = iterations;
        self
    }

    /// Nameplate power `v_mp * i_mp` (W)
    pub fn nameplate_power(&self) -> f64 {
        self.v_mp * self.i_mp
    }
}
