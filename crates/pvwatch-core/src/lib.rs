//! PVWatch - photovoltaic module emulator core
//!
//! Emulates the electrical behavior of a PV module from its datasheet using
//! the single-diode equivalent circuit.
//!
//! # Architecture
//!
//! - [`solver`]: extracts Rs, Rsh, I0 and Ipv from the four datasheet points
//! - [`curve`]: samples the I-V-P characteristic from a solved circuit
//! - [`lookup`]: interpolated current at an arbitrary voltage
//! - [`module`]: shared module state, published as immutable snapshots
//! - [`sweep`]: background irradiance/temperature ramp with cancellation
//! - [`sampler`]: periodic real-time telemetry feed
//! - [`session`]: the host-facing surface tying the pieces together
//!
//! # Example
//!
//! ```rust
//! use pvwatch_core::prelude::*;
//!
//! let params = ModuleParameters::from_datasheet(35.0, 9.0, 30.0, 8.5).with_resolution(200, 50);
//! let circuit = SingleDiodeSolver::default().solve(&params);
//! let curve = CurveGenerator::generate(&params, &circuit);
//!
//! let (_, _, p_max) = curve.maximum_power_point().unwrap();
//! assert!((p_max - 255.0).abs() < 255.0 * 0.03);
//! assert!(curve.current_at(15.0) > 8.5);
//! ```

pub mod curve;
pub mod error;
pub mod lookup;
pub mod module;
pub mod sampler;
pub mod session;
pub mod solver;
pub mod sweep;
pub mod utils;

pub use curve::{Curve, CurveGenerator};
pub use error::{EmulatorError, Result};
pub use module::{ModuleSnapshot, PvModule};
pub use sampler::RealTimeSampler;
pub use session::{EmulatorSession, ModuleTarget};
pub use solver::{CircuitState, SingleDiodeSolver, VocReference};
pub use sweep::{EnvironmentSweep, SweepOutcome};

pub use pvwatch_types as types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::curve::{Curve, CurveGenerator};
    pub use crate::error::{EmulatorError, Result};
    pub use crate::module::{ModuleSnapshot, PvModule};
    pub use crate::sampler::RealTimeSampler;
    pub use crate::session::{EmulatorSession, ModuleTarget};
    pub use crate::solver::{CircuitState, SingleDiodeSolver, VocReference};
    pub use crate::sweep::{EnvironmentSweep, SweepOutcome};
    pub use pvwatch_types::{
        EmulatorSettings, ModuleParameters, NominalSettings, RealtimeSample, SamplerSettings, SweepPhase,
        SweepRequest,
    };
}
