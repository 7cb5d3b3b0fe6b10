//! Real-time telemetry sample.

use serde::{Deserialize, Serialize};

/// One (voltage, current, power) reading published by the real-time sampler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimeSample {
    /// Terminal voltage (V)
    pub voltage: f64,
    /// Module current at that voltage (A)
    pub current: f64,
    /// `voltage * current` (W)
    pub power: f64,
}

impl RealtimeSample {
    pub fn new(voltage: f64, current: f64) -> Self {
        Self {
            voltage,
            current,
            power: voltage * current,
        }
    }
}
