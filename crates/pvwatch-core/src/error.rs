//! Error types for the emulator core.
//!
//! The numeric pipeline itself never fails: degenerate inputs flow through as
//! non-finite samples. These variants describe the guards around it, so a
//! caller can tell a refused request from a curve that simply came out empty.

use thiserror::Error;

/// Errors surfaced by the emulator core
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("An environment sweep is already running")]
    SweepAlreadyRunning,

    #[error("Sweep step count must be at least 1")]
    ZeroStepSweep,

    #[error("Sweep duration must be finite and non-negative, got {0} s")]
    InvalidSweepDuration(f64),

    #[error("Solver produced non-finite circuit parameters (Rs={rs}, Rsh={rsh}, I0={i0}, Ipv={ipv})")]
    NumericDegeneracy { rs: f64, rsh: f64, i0: f64, ipv: f64 },

    #[error("Failed to spawn {name} thread: {source}")]
    ThreadSpawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EmulatorError>;
