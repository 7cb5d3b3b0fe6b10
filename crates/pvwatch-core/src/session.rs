//! Emulator session - the surface a host shell drives.
//!
//! Owns the interactively edited module, the nominal reference module, the
//! environment sweep and the real-time sampler. A host calls these methods
//! from its UI thread:
//!
//! | Host action             | Method                                   |
//! |-------------------------|------------------------------------------|
//! | "Plot"                  | [`EmulatorSession::plot`]                |
//! | "Clear"                 | [`EmulatorSession::clear_curve`]         |
//! | "Show nominal curves"   | [`EmulatorSession::plot_nominal`]        |
//! | sweep "Start" / "Stop"  | [`EmulatorSession::start_sweep`] / [`EmulatorSession::cancel_sweep`] |
//! | progress bar            | [`EmulatorSession::progress`]            |
//! | live point overlay      | [`EmulatorSession::latest_sample`]       |

use std::sync::Arc;

use pvwatch_types::{EmulatorSettings, ModuleParameters, RealtimeSample, SweepPhase, SweepRequest};

use crate::error::Result;
use crate::module::{ModuleSnapshot, PvModule};
use crate::sampler::RealTimeSampler;
use crate::solver::SingleDiodeSolver;
use crate::sweep::{EnvironmentSweep, SweepOutcome};

/// Which of the session's modules an operation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleTarget {
    /// The interactively edited module
    Current,
    /// The fixed nominal reference
    Nominal,
}

/// Emulator session state
pub struct EmulatorSession {
    settings: EmulatorSettings,
    current: Arc<PvModule>,
    nominal: Arc<PvModule>,
    sweep: EnvironmentSweep,
    sampler: Option<RealTimeSampler>,
}

impl EmulatorSession {
    pub fn new(settings: EmulatorSettings) -> Self {
        let current = Arc::new(PvModule::new("current", settings.module));
        let nominal = Arc::new(PvModule::new("nominal", settings.nominal.apply(&settings.module)));
        let sweep = EnvironmentSweep::new(current.clone());

        Self {
            settings,
            current,
            nominal,
            sweep,
            sampler: None,
        }
    }

    pub fn settings(&self) -> &EmulatorSettings {
        &self.settings
    }

    pub fn module(&self, target: ModuleTarget) -> &Arc<PvModule> {
        match target {
            ModuleTarget::Current => &self.current,
            ModuleTarget::Nominal => &self.nominal,
        }
    }

    /// Latest published state of `target`.
    pub fn snapshot(&self, target: ModuleTarget) -> Arc<ModuleSnapshot> {
        self.module(target).snapshot()
    }

    /// Start the real-time sampler on the current module. Does nothing if it
    /// is already running.
    pub fn start_sampler(&mut self) -> Result<()> {
        if self.sampler.as_ref().map(RealTimeSampler::is_running).unwrap_or(false) {
            return Ok(());
        }
        self.sampler = Some(RealTimeSampler::start(self.current.clone(), self.settings.sampler)?);
        Ok(())
    }

    pub fn stop_sampler(&mut self) {
        if let Some(mut sampler) = self.sampler.take() {
            sampler.stop();
        }
    }

    /// Solve and generate the current module for `params`.
    pub fn plot(&self, params: &ModuleParameters) -> Arc<ModuleSnapshot> {
        let snapshot = self.current.plot(params, &SingleDiodeSolver::default());
        if snapshot.is_degenerate() {
            log::warn!("plot produced a degenerate curve, check the datasheet values");
        }
        snapshot
    }

    /// Generate the nominal reference curve for the current module's datasheet.
    pub fn plot_nominal(&self) -> Arc<ModuleSnapshot> {
        let params = self.settings.nominal.apply(&self.current.params());
        self.nominal.plot(&params, &SingleDiodeSolver::default())
    }

    /// Replace the curve of `target` with a zero-length curve.
    pub fn clear_curve(&self, target: ModuleTarget) {
        self.module(target).clear();
    }

    /// Start an environment sweep on the current module.
    ///
    /// Fails if a sweep is already active or the request has zero steps.
    pub fn start_sweep(&self, request: SweepRequest) -> Result<()> {
        self.sweep.start(request)
    }

    /// Start the sweep configured in the settings.
    pub fn start_default_sweep(&self) -> Result<()> {
        self.sweep.start(self.settings.sweep)
    }

    pub fn cancel_sweep(&self) {
        self.sweep.cancel();
    }

    /// Sweep progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.sweep.progress()
    }

    pub fn sweep_phase(&self) -> SweepPhase {
        self.sweep.phase()
    }

    pub fn sweep_active(&self) -> bool {
        self.sweep.is_active()
    }

    /// Block until the running sweep exits.
    pub fn wait_for_sweep(&self) -> Option<SweepOutcome> {
        self.sweep.wait()
    }

    /// Last real-time reading, or a zero sample if the sampler never ran.
    pub fn latest_sample(&self) -> RealtimeSample {
        self.sampler.as_ref().map(RealTimeSampler::latest).unwrap_or_default()
    }

    /// Current of the current module at `voltage`.
    pub fn current_at(&self, voltage: f64) -> f64 {
        self.current.current_at(voltage)
    }
}

impl Drop for EmulatorSession {
    fn drop(&mut self) {
        self.sweep.cancel();
        self.stop_sampler();
    }
}
