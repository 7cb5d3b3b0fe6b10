//! Environment sweep simulator
//!
//! Ramps irradiance and temperature linearly from the request's start values
//! to its stop values over `duration_seconds`, regenerating the module curve
//! once per step on a background thread. At most one sweep runs at a time.
//!
//! ```text
//! Idle -> Running -> Completed
//!                 \-> Cancelled
//! ```
//!
//! Cancellation is cooperative: [`EnvironmentSweep::cancel`] clears the
//! `running` flag, which the worker polls once per step boundary. A cancelled
//! sweep leaves the module at whatever step it reached and resets progress to
//! zero. A completed sweep always ends with one regeneration at exactly the
//! stop values.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pvwatch_types::{ModuleParameters, SweepPhase, SweepRequest};

use crate::error::{EmulatorError, Result};
use crate::module::PvModule;
use crate::solver::SingleDiodeSolver;

/// How a sweep thread finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// All steps ran and the module landed on the stop values
    Completed { steps: usize },
    /// Cancelled after `steps_completed` regenerations
    Cancelled { steps_completed: usize },
}

/// State shared between the sweep handle and its worker thread
#[derive(Debug, Default)]
struct SweepShared {
    running: AtomicBool,
    active: AtomicBool,
    /// `f32` bit pattern
    progress: AtomicU32,
    phase: AtomicU8,
    steps_completed: AtomicUsize,
    base: Mutex<Option<ModuleParameters>>,
}

impl SweepShared {
    fn set_progress(&self, value: f32) {
        self.progress.store(value.to_bits(), Ordering::SeqCst);
    }

    fn progress(&self) -> f32 {
        f32::from_bits(self.progress.load(Ordering::SeqCst))
    }

    fn set_phase(&self, phase: SweepPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    fn phase(&self) -> SweepPhase {
        SweepPhase::from(self.phase.load(Ordering::SeqCst))
    }

    fn finish_cancelled(&self, steps_completed: usize) -> SweepOutcome {
        self.set_progress(0.0);
        self.set_phase(SweepPhase::Cancelled);
        self.active.store(false, Ordering::SeqCst);
        SweepOutcome::Cancelled { steps_completed }
    }
}

/// Handle to the environment sweep of one module.
pub struct EnvironmentSweep {
    module: Arc<PvModule>,
    shared: Arc<SweepShared>,
    handle: Mutex<Option<JoinHandle<SweepOutcome>>>,
}

impl EnvironmentSweep {
    pub fn new(module: Arc<PvModule>) -> Self {
        Self {
            module,
            shared: Arc::new(SweepShared::default()),
            handle: Mutex::new(None),
        }
    }

    /// Start a sweep on a background thread.
    ///
    /// The module's current parameters are recorded as the base operating
    /// point; only irradiance and temperature change during the sweep.
    ///
    /// # Errors
    ///
    /// - [`EmulatorError::ZeroStepSweep`] if `request.step_count == 0`
    /// - [`EmulatorError::InvalidSweepDuration`] for a negative, non-finite or
    ///   unrepresentably long duration
    /// - [`EmulatorError::SweepAlreadyRunning`] if a sweep is active; the
    ///   running sweep is left untouched
    /// - [`EmulatorError::ThreadSpawn`] if the worker could not be started
    pub fn start(&self, request: SweepRequest) -> Result<()> {
        if request.step_count == 0 {
            log::warn!("refusing sweep with zero steps");
            return Err(EmulatorError::ZeroStepSweep);
        }
        let cadence = step_cadence(&request)?;

        // Held until the worker is running so `cancel` sees a fully started sweep
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if self
            .shared
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("sweep already running, ignoring start request");
            return Err(EmulatorError::SweepAlreadyRunning);
        }

        // The previous worker has already cleared `active`, reap it
        if let Some(previous) = handle.take() {
            let _ = previous.join();
        }

        let base = self.module.params();
        *self.shared.base.lock().unwrap_or_else(PoisonError::into_inner) = Some(base);
        self.shared.steps_completed.store(0, Ordering::SeqCst);
        self.shared.set_progress(0.0);
        self.shared.set_phase(SweepPhase::Running);
        self.shared.running.store(true, Ordering::SeqCst);

        let module = self.module.clone();
        let shared = self.shared.clone();
        let spawned = thread::Builder::new()
            .name("pv-sweep".to_string())
            .spawn(move || run_sweep(&module, &shared, &request, base, cadence));

        match spawned {
            Ok(h) => {
                *handle = Some(h);
                Ok(())
            }
            Err(source) => {
                self.shared.running.store(false, Ordering::SeqCst);
                self.shared.set_phase(SweepPhase::Idle);
                self.shared.active.store(false, Ordering::SeqCst);
                Err(EmulatorError::ThreadSpawn { name: "sweep", source })
            }
        }
    }

    /// Ask the running sweep to stop at its next step boundary.
    pub fn cancel(&self) {
        let _starting = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if self.shared.running.swap(false, Ordering::SeqCst) {
            log::info!("sweep cancellation requested");
        }
    }

    /// Fraction of the sweep done, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.shared.progress()
    }

    pub fn phase(&self) -> SweepPhase {
        self.shared.phase()
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Regenerations done by the current (or last) sweep, excluding the final
    /// landing step.
    pub fn steps_completed(&self) -> usize {
        self.shared.steps_completed.load(Ordering::SeqCst)
    }

    /// Operating point recorded when the last sweep started.
    pub fn base_operating_point(&self) -> Option<ModuleParameters> {
        *self.shared.base.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the current sweep thread exits.
    ///
    /// Returns `None` if no sweep was started since the last wait, or if the
    /// worker panicked.
    pub fn wait(&self) -> Option<SweepOutcome> {
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner).take()?;
        match handle.join() {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                log::error!("sweep thread panicked");
                self.shared.active.store(false, Ordering::SeqCst);
                None
            }
        }
    }
}

impl Drop for EnvironmentSweep {
    fn drop(&mut self) {
        self.cancel();
        let _ = self.wait();
    }
}

/// Sleep between two steps of `request`.
///
/// Rejects negative, non-finite and unrepresentable durations.
fn step_cadence(request: &SweepRequest) -> Result<Duration> {
    let duration = request.duration_seconds;
    if !duration.is_finite() || duration < 0.0 {
        log::warn!("refusing sweep with duration {} s", duration);
        return Err(EmulatorError::InvalidSweepDuration(duration));
    }
    Duration::try_from_secs_f64(duration / request.step_count as f64).map_err(|_| {
        log::warn!("refusing sweep with duration {} s", duration);
        EmulatorError::InvalidSweepDuration(duration)
    })
}

fn run_sweep(
    module: &PvModule,
    shared: &SweepShared,
    request: &SweepRequest,
    base: ModuleParameters,
    cadence: Duration,
) -> SweepOutcome {
    let steps = request.step_count;
    let solver = SingleDiodeSolver::for_sweep();

    log::info!(
        "sweep started on {}: G {} -> {} W/m2, T {} -> {} C, {} steps over {} s",
        module.name(),
        request.irradiance_start,
        request.irradiance_stop,
        request.temperature_start,
        request.temperature_stop,
        steps,
        request.duration_seconds
    );

    for step in 0..steps {
        if !shared.running.load(Ordering::SeqCst) {
            log::info!("sweep cancelled after {} of {} steps", step, steps);
            return shared.finish_cancelled(step);
        }

        let (g, t) = request.environment_at(step as f64 / steps as f64);
        module.plot(&base.with_environment(g, t), &solver);

        shared.steps_completed.store(step + 1, Ordering::SeqCst);
        shared.set_progress((step + 1) as f32 / steps as f32);
        log::debug!("sweep step {}/{}: G={:.1} T={:.2}", step + 1, steps, g, t);

        thread::sleep(cadence);
    }

    // A cancel that arrived during the last sleep still counts
    if !shared.running.load(Ordering::SeqCst) {
        log::info!("sweep cancelled after {} of {} steps", steps, steps);
        return shared.finish_cancelled(steps);
    }

    module.plot(
        &base.with_environment(request.irradiance_stop, request.temperature_stop),
        &solver,
    );

    shared.set_progress(1.0);
    shared.set_phase(SweepPhase::Completed);
    shared.running.store(false, Ordering::SeqCst);
    shared.active.store(false, Ordering::SeqCst);
    log::info!("sweep completed on {} after {} steps", module.name(), steps);

    SweepOutcome::Completed { steps }
}
