//! PVWatch - headless emulator driver
//!
//! Plots the configured module and its nominal reference, starts the live
//! sampler and runs one environment sweep, polling progress and the latest
//! sample the way a render loop would.

mod config;

use std::thread;
use std::time::Duration;

use anyhow::Result;
use pvwatch_core::prelude::*;

/// Poll interval of the driver loop
const FRAME: Duration = Duration::from_millis(100);

/// Resolution used for the interactive plot when the settings leave it unset
const DEFAULT_PLOT_STEPS: usize = 200;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = config::load()?;
    let mut session = EmulatorSession::new(settings);

    let mut params = session.settings().module;
    if params.steps == 0 {
        params.steps = DEFAULT_PLOT_STEPS;
    }

    let snapshot = session.plot(&params);
    report("current", &snapshot);

    let nominal = session.plot_nominal();
    report("nominal", &nominal);

    session.start_sampler()?;
    session.start_default_sweep()?;

    while session.sweep_active() {
        let sample = session.latest_sample();
        log::info!(
            "progress {:5.1}% | V={:6.2} V  I={:5.2} A  P={:7.2} W",
            session.progress() * 100.0,
            sample.voltage,
            sample.current,
            sample.power
        );
        thread::sleep(FRAME);
    }

    match session.wait_for_sweep() {
        Some(SweepOutcome::Completed { steps }) => log::info!("sweep finished after {} steps", steps),
        Some(SweepOutcome::Cancelled { steps_completed }) => {
            log::warn!("sweep cancelled after {} steps", steps_completed)
        }
        None => log::warn!("sweep thread did not report an outcome"),
    }
    log::info!("sweep phase: {}", session.sweep_phase().as_str());
    report("current", &session.snapshot(ModuleTarget::Current));

    session.stop_sampler();
    Ok(())
}

fn report(label: &str, snapshot: &ModuleSnapshot) {
    let params = &snapshot.params;
    match snapshot.curve.maximum_power_point() {
        Some((v, i, p)) => log::info!(
            "{} module at G={} W/m2 T={} C: P_max={:.2} W at {:.2} V / {:.2} A ({} samples)",
            label,
            params.irradiance,
            params.temperature,
            p,
            v,
            i,
            snapshot.curve.len()
        ),
        None => log::warn!("{} module has no usable curve", label),
    }
}
