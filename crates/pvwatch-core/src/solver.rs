//! Single-diode parameter extraction
//!
//! Derives the equivalent circuit of a PV module (current source, diode,
//! series and shunt resistance) from the four datasheet points, following the
//! analytical method of Villalva et al.:
//!
//! 1. Thermal voltage `Vt = k (T + 274.15) / q`
//! 2. Cell counts `Ns = round(Voc / 0.7)`, `Np = round(Isc / 8.5)` and the
//!    effective ideality factor `a = Ns / Np`
//! 3. Fixed-point update of the series resistance `Rs`
//! 4. Closed-form shunt resistance `Rsh` and saturation current `I0`
//! 5. Photocurrent `Ipv`, scaled with irradiance
//!
//! The solver is a pure function of its inputs. It never fails: inconsistent
//! datasheet values (e.g. `i_mp < i_sc / 2`) produce NaN or infinite parameters
//! which then flow into the generated curve.

use pvwatch_types::ModuleParameters;

use crate::error::{EmulatorError, Result};
use crate::utils::constants::{
    BOLTZMANN, ELEMENTARY_CHARGE, IDEALITY_FACTOR, IRRADIANCE_REFERENCE, SERIES_RESISTANCE_SEED,
    THERMAL_OFFSET, UNIT_CELL_ISC, UNIT_CELL_VOC,
};

/// Which open-circuit voltage enters the resistance and saturation current
/// equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VocReference {
    /// Datasheet `v_oc`, used for interactive plots
    #[default]
    Datasheet,
    /// Irradiance-adjusted open-circuit voltage, used inside a sweep
    OperatingPoint,
}

/// Derived equivalent-circuit parameters of one module at one operating point.
///
/// Values are not clamped and may be negative, zero, infinite or NaN when the
/// datasheet inputs are inconsistent. Use [`CircuitState::check_finite`] to
/// detect that case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitState {
    /// `k (T + 274.15) / q` (V)
    pub thermal_voltage: f64,

    /// Cells in series. Integral valued, kept as `f64` so degenerate
    /// datasheets propagate instead of saturating.
    pub series_cells: f64,

    /// Cells in parallel, integral valued
    pub parallel_cells: f64,

    /// `(Ns / Np) * ideality factor`
    pub ideality_factor_effective: f64,

    /// Rs (Ω)
    pub series_resistance: f64,

    /// Rsh (Ω)
    pub shunt_resistance: f64,

    /// I0 (A)
    pub saturation_current: f64,

    /// Ipv (A)
    pub photocurrent: f64,

    /// `v_oc + Vt ln(G / 1000)` (V)
    pub voc_at_operating_point: f64,
}

impl CircuitState {
    /// Product `a * Vt` that scales the diode exponent.
    #[inline]
    pub fn diode_voltage(&self) -> f64 {
        self.ideality_factor_effective * self.thermal_voltage
    }

    /// Whether the four solved parameters are all finite.
    pub fn is_finite(&self) -> bool {
        self.series_resistance.is_finite()
            && self.shunt_resistance.is_finite()
            && self.saturation_current.is_finite()
            && self.photocurrent.is_finite()
    }

    /// Report non-finite solved parameters as [`EmulatorError::NumericDegeneracy`].
    pub fn check_finite(&self) -> Result<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(EmulatorError::NumericDegeneracy {
                rs: self.series_resistance,
                rsh: self.shunt_resistance,
                i0: self.saturation_current,
                ipv: self.photocurrent,
            })
        }
    }
}

/// Single-diode model solver
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleDiodeSolver {
    voc_reference: VocReference,
}

impl SingleDiodeSolver {
    pub fn new(voc_reference: VocReference) -> Self {
        Self { voc_reference }
    }

    /// Solver configured the way an environment sweep uses it.
    pub fn for_sweep() -> Self {
        Self::new(VocReference::OperatingPoint)
    }

    pub fn voc_reference(&self) -> VocReference {
        self.voc_reference
    }

    /// Derive the circuit parameters for `params`.
    pub fn solve(&self, params: &ModuleParameters) -> CircuitState {
        let vt = thermal_voltage(params.temperature);

        let ns = round_half_up(params.v_oc / UNIT_CELL_VOC);
        let np = round_half_up(params.i_sc / UNIT_CELL_ISC);
        let a = ns / np * IDEALITY_FACTOR;
        let avt = a * vt;

        let voc_op = voc_at_irradiance(params.v_oc, vt, params.irradiance);
        let voc = match self.voc_reference {
            VocReference::Datasheet => params.v_oc,
            VocReference::OperatingPoint => voc_op,
        };

        let (isc, vmp, imp) = (params.i_sc, params.v_mp, params.i_mp);

        let mut rs = SERIES_RESISTANCE_SEED;
        for _ in 0..params.iterations {
            let num = avt * vmp * (2.0 * imp - isc);
            let den = (vmp * isc + voc * (imp - isc)) * (vmp - imp * rs) - avt * (vmp * isc - voc * imp);
            rs = (avt * (num / den).ln() + voc - vmp) / imp;
        }

        let rsh_num = (vmp * imp * rs) * (vmp - rs * (isc - imp) - avt);
        let rsh_den = (vmp - imp * rs) * (isc - imp) - avt * imp;
        let rsh = rsh_num / rsh_den;

        let i0 = ((rsh + rs) * isc - voc) / (rsh * (voc / avt).exp());

        let ipv = (rsh + rs) / rsh * isc * (params.irradiance / IRRADIANCE_REFERENCE);

        let circuit = CircuitState {
            thermal_voltage: vt,
            series_cells: ns,
            parallel_cells: np,
            ideality_factor_effective: a,
            series_resistance: rs,
            shunt_resistance: rsh,
            saturation_current: i0,
            photocurrent: ipv,
            voc_at_operating_point: voc_op,
        };

        if circuit.is_finite() {
            log::debug!(
                "solved module: Rs={:.6} Rsh={:.3} I0={:.3e} Ipv={:.4} (Ns={}, Np={}, G={}, T={})",
                rs,
                rsh,
                i0,
                ipv,
                ns,
                np,
                params.irradiance,
                params.temperature
            );
        } else {
            log::warn!(
                "non-finite circuit parameters for Voc={} Isc={} Vmp={} Imp={}: Rs={} Rsh={} I0={} Ipv={}",
                params.v_oc,
                params.i_sc,
                params.v_mp,
                params.i_mp,
                rs,
                rsh,
                i0,
                ipv
            );
        }

        circuit
    }
}

/// Thermal voltage `k (T + 274.15) / q` for a cell temperature in °C.
pub fn thermal_voltage(temperature: f64) -> f64 {
    BOLTZMANN * (temperature + THERMAL_OFFSET) / ELEMENTARY_CHARGE
}

/// Open-circuit voltage shifted for irradiance away from 1000 W/m².
pub fn voc_at_irradiance(voc_nominal: f64, thermal_voltage: f64, irradiance: f64) -> f64 {
    voc_nominal + thermal_voltage * (irradiance / IRRADIANCE_REFERENCE).ln()
}

fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_module() -> ModuleParameters {
        ModuleParameters::from_datasheet(35.0, 9.0, 30.0, 8.5).with_resolution(200, 50)
    }

    #[test]
    fn test_thermal_voltage_at_25c() {
        assert_relative_eq!(thermal_voltage(25.0), 0.025_778_74, epsilon = 1e-8);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(49.4), 49.0);
        assert_eq!(round_half_up(49.5), 50.0);
        assert_eq!(round_half_up(1.0588), 1.0);
        assert_eq!(round_half_up(0.39), 0.0);
    }

    #[test]
    fn test_cell_counts() {
        let c = SingleDiodeSolver::default().solve(&reference_module());
        assert_eq!(c.series_cells, 50.0);
        assert_eq!(c.parallel_cells, 1.0);
        assert_eq!(c.ideality_factor_effective, 50.0);
    }

    #[test]
    fn test_reference_module_parameters() {
        let c = SingleDiodeSolver::default().solve(&reference_module());
        assert!(c.is_finite());
        assert_relative_eq!(c.series_resistance, 0.107_216_5, epsilon = 1e-6);
        assert_relative_eq!(c.shunt_resistance, 218.344_9, epsilon = 1e-3);
        assert_relative_eq!(c.photocurrent, 9.004_419, epsilon = 1e-5);
        assert!(c.saturation_current > 0.0 && c.saturation_current < 1e-9);
        assert_eq!(c.voc_at_operating_point, 35.0);
    }

    #[test]
    fn test_zero_iterations_keeps_seed() {
        let params = reference_module().with_resolution(200, 0);
        let c = SingleDiodeSolver::default().solve(&params);
        assert_eq!(c.series_resistance, SERIES_RESISTANCE_SEED);
    }

    #[test]
    fn test_photocurrent_scales_with_irradiance() {
        let solver = SingleDiodeSolver::default();
        let full = solver.solve(&reference_module());
        let half = solver.solve(&reference_module().with_environment(500.0, 25.0));
        assert_relative_eq!(half.photocurrent, full.photocurrent / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_voc_drops_at_low_irradiance() {
        let c = SingleDiodeSolver::default().solve(&reference_module().with_environment(200.0, 25.0));
        assert!(c.voc_at_operating_point < 35.0);
        assert_relative_eq!(c.voc_at_operating_point, 35.0 + c.thermal_voltage * 0.2f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_voc_reference_equal_at_reference_irradiance() {
        let params = reference_module().with_environment(1000.0, 40.0);
        let a = SingleDiodeSolver::new(VocReference::Datasheet).solve(&params);
        let sweep_solver = SingleDiodeSolver::for_sweep();
        assert_eq!(sweep_solver.voc_reference(), VocReference::OperatingPoint);
        let b = sweep_solver.solve(&params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_datasheet_is_reported_not_raised() {
        // Imp below Isc / 2 puts a negative value under the logarithm
        let params = ModuleParameters::from_datasheet(35.0, 9.0, 30.0, 4.0).with_resolution(10, 50);
        let c = SingleDiodeSolver::default().solve(&params);
        assert!(!c.is_finite());
        assert!(matches!(c.check_finite(), Err(EmulatorError::NumericDegeneracy { .. })));
    }

    #[test]
    fn test_imp_equal_isc_gives_negative_shunt() {
        use crate::curve::CurveGenerator;

        // Imp == Isc stays finite here but leaves no room for the shunt branch
        let params = ModuleParameters::from_datasheet(35.0, 9.0, 30.0, 9.0).with_resolution(50, 50);
        let c = SingleDiodeSolver::default().solve(&params);
        assert!(c.is_finite());
        assert!(c.shunt_resistance < 0.0);

        let curve = CurveGenerator::generate(&params, &c);
        assert_eq!(curve.len(), 50);
        assert!(curve.current().iter().all(|i| i.is_finite() && *i >= 0.0));
        for v in [-1.0, 0.0, 12.5, 30.0, 35.0, 80.0] {
            let i = curve.current_at(v);
            assert!(i.is_finite() && i >= 0.0);
        }
    }

    #[test]
    fn test_small_isc_gives_infinite_ideality() {
        // Isc / 8.5 rounds to zero parallel cells
        let params = ModuleParameters::from_datasheet(21.7, 3.35, 17.4, 3.05).with_resolution(10, 10);
        let c = SingleDiodeSolver::default().solve(&params);
        assert_eq!(c.parallel_cells, 0.0);
        assert!(c.ideality_factor_effective.is_infinite());
    }
}
