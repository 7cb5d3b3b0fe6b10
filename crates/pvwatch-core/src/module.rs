//! Shared module state published as immutable snapshots.
//!
//! A [`PvModule`] is read by the real-time sampler and the host at any moment
//! while a sweep or a plot may be regenerating it. Every regeneration builds a
//! complete [`ModuleSnapshot`] off to the side and then swaps the `Arc` held by
//! the module in one step. Readers clone that `Arc` and keep a self-consistent
//! view (parameters, circuit and all three sample arrays) for as long as they
//! need it, regardless of later swaps.

use std::sync::{Arc, PoisonError, RwLock};

use pvwatch_types::ModuleParameters;

use crate::curve::{Curve, CurveGenerator};
use crate::lookup;
use crate::solver::{CircuitState, SingleDiodeSolver};

/// One complete, immutable generation of a module's state.
#[derive(Debug, Clone)]
pub struct ModuleSnapshot {
    /// Inputs the curve was generated from
    pub params: ModuleParameters,

    /// Solved circuit, `None` until the first solve
    pub circuit: Option<CircuitState>,

    /// Sampled characteristic
    pub curve: Curve,

    /// Publication counter, increases by one with every swap
    pub generation: u64,
}

impl ModuleSnapshot {
    fn initial(params: ModuleParameters) -> Self {
        Self {
            params,
            circuit: None,
            curve: Curve::empty(params.i_sc),
            generation: 0,
        }
    }

    /// True when the last solve produced non-finite circuit parameters.
    pub fn is_degenerate(&self) -> bool {
        self.circuit.map(|c| !c.is_finite()).unwrap_or(false)
    }

    /// Current at `voltage` on this generation's curve.
    pub fn current_at(&self, voltage: f64) -> f64 {
        lookup::current_at(&self.curve, voltage)
    }
}

/// A PV module whose curve can be regenerated while others read it.
#[derive(Debug)]
pub struct PvModule {
    name: String,
    slot: RwLock<Arc<ModuleSnapshot>>,
}

impl PvModule {
    /// Module holding `params` with an empty curve.
    pub fn new(name: impl Into<String>, params: ModuleParameters) -> Self {
        Self {
            name: name.into(),
            slot: RwLock::new(Arc::new(ModuleSnapshot::initial(params))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest published generation.
    pub fn snapshot(&self) -> Arc<ModuleSnapshot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Parameters of the latest published generation.
    pub fn params(&self) -> ModuleParameters {
        self.snapshot().params
    }

    /// Solve and generate for `params`, then publish the result.
    pub fn plot(&self, params: &ModuleParameters, solver: &SingleDiodeSolver) -> Arc<ModuleSnapshot> {
        let circuit = solver.solve(params);
        let curve = CurveGenerator::generate(params, &circuit);
        log::debug!(
            "{}: generated {} samples at G={} T={} (Voc reference {:?})",
            self.name,
            curve.len(),
            params.irradiance,
            params.temperature,
            solver.voc_reference()
        );
        self.publish(*params, Some(circuit), curve)
    }

    /// Replace the curve with a zero-length one, keeping the parameters.
    pub fn clear(&self) -> Arc<ModuleSnapshot> {
        let current = self.snapshot();
        self.publish(current.params, current.circuit, current.curve.cleared())
    }

    /// Current at `voltage` on the latest generation.
    pub fn current_at(&self, voltage: f64) -> f64 {
        self.snapshot().current_at(voltage)
    }

    fn publish(&self, params: ModuleParameters, circuit: Option<CircuitState>, curve: Curve) -> Arc<ModuleSnapshot> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(ModuleSnapshot {
            params,
            circuit,
            curve,
            generation: slot.generation + 1,
        });
        *slot = next.clone();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(steps: usize) -> ModuleParameters {
        ModuleParameters::from_datasheet(35.0, 9.0, 30.0, 8.5).with_resolution(steps, 50)
    }

    #[test]
    fn test_new_module_is_empty() {
        let module = PvModule::new("pv", params(0));
        let snap = module.snapshot();
        assert_eq!(module.name(), "pv");
        assert!(snap.curve.is_empty());
        assert!(snap.circuit.is_none());
        assert!(!snap.is_degenerate());
        assert_eq!(snap.generation, 0);
        assert_eq!(module.current_at(20.0), 9.0);
    }

    #[test]
    fn test_plot_publishes_new_generation() {
        let module = PvModule::new("pv", params(0));
        let before = module.snapshot();
        let after = module.plot(&params(100), &SingleDiodeSolver::default());

        assert_eq!(after.generation, 1);
        assert_eq!(after.curve.len(), 100);
        assert_eq!(module.params().steps, 100);

        // Old readers keep their own generation
        assert!(before.curve.is_empty());
        assert_eq!(before.generation, 0);
    }

    #[test]
    fn test_clear_keeps_params() {
        let module = PvModule::new("pv", params(0));
        module.plot(&params(50), &SingleDiodeSolver::default());
        let cleared = module.clear();

        assert!(cleared.curve.is_empty());
        assert_eq!(cleared.params.steps, 50);
        assert_eq!(cleared.generation, 2);
        assert_eq!(module.current_at(10.0), 9.0);
    }

    #[test]
    fn test_degenerate_plot_is_flagged() {
        let module = PvModule::new("pv", params(0));
        let bad = ModuleParameters::from_datasheet(35.0, 9.0, 30.0, 4.0).with_resolution(10, 10);
        let snap = module.plot(&bad, &SingleDiodeSolver::default());
        assert!(snap.is_degenerate());
    }
}
