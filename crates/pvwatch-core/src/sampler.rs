//! Real-time telemetry sampler
//!
//! Emulates a live voltage/current/power sensor feed: every tick the sampler
//! advances a voltage across `0..voltage_span` in `voltage_step` increments
//! (wrapping back to zero), looks up the module current at that voltage on
//! the latest published curve and stores the triple in a latest-sample slot.
//!
//! The sampler runs until it is stopped or dropped. It never fails on bad
//! curve data: an empty curve reads back the datasheet short-circuit current.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pvwatch_types::{RealtimeSample, SamplerSettings};

use crate::error::{EmulatorError, Result};
use crate::module::PvModule;

#[derive(Debug, Default)]
struct SamplerShared {
    stop: AtomicBool,
    latest: Mutex<RealtimeSample>,
    published: AtomicU64,
}

/// Sampler handle - manages the background thread
pub struct RealTimeSampler {
    shared: Arc<SamplerShared>,
    handle: Option<JoinHandle<()>>,
}

impl RealTimeSampler {
    /// Start sampling `module` on a background thread.
    pub fn start(module: Arc<PvModule>, settings: SamplerSettings) -> Result<Self> {
        let shared = Arc::new(SamplerShared::default());
        let worker = shared.clone();

        let handle = thread::Builder::new()
            .name("pv-sampler".to_string())
            .spawn(move || sampler_thread(&module, &settings, &worker))
            .map_err(|source| EmulatorError::ThreadSpawn { name: "sampler", source })?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Sample published on the last tick.
    pub fn latest(&self) -> RealtimeSample {
        *self.shared.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total ticks since start
    pub fn samples_published(&self) -> u64 {
        self.shared.published.load(Ordering::Relaxed)
    }

    /// Stop the sampler thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            log::info!("real-time sampler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.shared.stop.load(Ordering::Relaxed)
    }
}

impl Drop for RealTimeSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Reading for tick `tick` of a pass over the voltage range.
pub fn sample_at_tick(module: &PvModule, settings: &SamplerSettings, tick: usize) -> RealtimeSample {
    let voltage = (tick % settings.ticks_per_pass()) as f64 * settings.voltage_step.max(0.0);
    RealtimeSample::new(voltage, module.current_at(voltage))
}

fn sampler_thread(module: &PvModule, settings: &SamplerSettings, shared: &SamplerShared) {
    let period = Duration::from_millis(settings.period_ms);
    let ticks = settings.ticks_per_pass();

    log::info!(
        "real-time sampler started on {}: {} ms period, 0..{} V in {} V steps",
        module.name(),
        settings.period_ms,
        settings.voltage_span,
        settings.voltage_step
    );

    let mut tick = 0;
    while !shared.stop.load(Ordering::Relaxed) {
        let sample = sample_at_tick(module, settings, tick);
        *shared.latest.lock().unwrap_or_else(PoisonError::into_inner) = sample;
        shared.published.fetch_add(1, Ordering::Relaxed);

        tick = (tick + 1) % ticks;
        thread::sleep(period);
    }
}
