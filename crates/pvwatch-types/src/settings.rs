//! Emulator settings types.

use serde::{Deserialize, Serialize};

use crate::{ModuleParameters, SweepRequest, IRRADIANCE_REFERENCE, TEMPERATURE_REFERENCE};

/// Real-time sampler configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    /// Tick period (ms)
    pub period_ms: u64,

    /// Upper end of the swept voltage range (V), exclusive
    pub voltage_span: f64,

    /// Voltage increment per tick (V)
    pub voltage_step: f64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            period_ms: 20,
            voltage_span: 35.0,
            voltage_step: 0.25,
        }
    }
}

impl SamplerSettings {
    /// Number of ticks in one pass over the voltage range.
    pub fn ticks_per_pass(&self) -> usize {
        if self.voltage_step > 0.0 && self.voltage_span > 0.0 {
            ((self.voltage_span / self.voltage_step).round() as usize).max(1)
        } else {
            1
        }
    }
}

/// Fixed operating point of the nominal reference curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NominalSettings {
    pub irradiance: f64,
    pub temperature: f64,
    pub steps: usize,
    pub iterations: usize,
}

impl Default for NominalSettings {
    fn default() -> Self {
        Self {
            irradiance: IRRADIANCE_REFERENCE,
            temperature: TEMPERATURE_REFERENCE,
            steps: 200,
            iterations: 50,
        }
    }
}

impl NominalSettings {
    /// Reference parameters for the datasheet in `params`.
    pub fn apply(&self, params: &ModuleParameters) -> ModuleParameters {
        params
            .with_environment(self.irradiance, self.temperature)
            .with_resolution(self.steps, self.iterations)
    }
}

/// Emulator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorSettings {
    /// Initial parameters of the interactive module
    pub module: ModuleParameters,

    /// Default environment sweep
    pub sweep: SweepRequest,

    /// Real-time sampler
    pub sampler: SamplerSettings,

    /// Nominal reference curve
    pub nominal: NominalSettings,
}
