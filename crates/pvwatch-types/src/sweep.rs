//! Environment sweep request and phase types.

use serde::{Deserialize, Serialize};

/// Linear irradiance/temperature ramp applied to a module over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepRequest {
    /// Irradiance at the first step (W/m²)
    pub irradiance_start: f64,

    /// Irradiance the sweep lands on (W/m²)
    pub irradiance_stop: f64,

    /// Temperature at the first step (°C)
    pub temperature_start: f64,

    /// Temperature the sweep lands on (°C)
    pub temperature_stop: f64,

    /// Total wall-clock duration (s)
    pub duration_seconds: f64,

    /// Number of regeneration steps
    pub step_count: usize,
}

impl Default for SweepRequest {
    fn default() -> Self {
        Self {
            irradiance_start: 800.0,
            irradiance_stop: 1000.0,
            temperature_start: 25.0,
            temperature_stop: 40.0,
            duration_seconds: 10.0,
            step_count: 70,
        }
    }
}

impl SweepRequest {
    /// Irradiance and temperature at `fraction` of the way from start to stop.
    pub fn environment_at(&self, fraction: f64) -> (f64, f64) {
        let g = self.irradiance_start + (self.irradiance_stop - self.irradiance_start) * fraction;
        let t = self.temperature_start + (self.temperature_stop - self.temperature_start) * fraction;
        (g, t)
    }
}

/// Lifecycle of the environment sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum SweepPhase {
    /// No sweep has run yet
    #[default]
    Idle = 0,
    /// A sweep is stepping through the environment ramp
    Running = 1,
    /// The last sweep ran to its stop values
    Completed = 2,
    /// The last sweep was cancelled before finishing
    Cancelled = 3,
}

impl SweepPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepPhase::Idle => "Idle",
            SweepPhase::Running => "Running",
            SweepPhase::Completed => "Completed",
            SweepPhase::Cancelled => "Cancelled",
        }
    }
}

impl From<u8> for SweepPhase {
    fn from(value: u8) -> Self {
        match value {
            1 => SweepPhase::Running,
            2 => SweepPhase::Completed,
            3 => SweepPhase::Cancelled,
            _ => SweepPhase::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_at_endpoints() {
        let req = SweepRequest::default();
        assert_eq!(req.environment_at(0.0), (800.0, 25.0));
        assert_eq!(req.environment_at(1.0), (1000.0, 40.0));

        let (g, t) = req.environment_at(0.5);
        assert!((g - 900.0).abs() < 1e-12);
        assert!((t - 32.5).abs() < 1e-12);
    }

    #[test]
    fn test_phase_u8_roundtrip() {
        for phase in [
            SweepPhase::Idle,
            SweepPhase::Running,
            SweepPhase::Completed,
            SweepPhase::Cancelled,
        ] {
            assert_eq!(SweepPhase::from(phase as u8), phase);
        }
        assert_eq!(SweepPhase::from(200), SweepPhase::Idle);
        assert_eq!(SweepPhase::Cancelled.as_str(), "Cancelled");
    }
}
