//! Current-from-voltage lookup with linear interpolation

use crate::curve::Curve;

impl Curve {
    /// Module current at `voltage`, interpolated between the two neighbouring
    /// samples.
    ///
    /// - Curves with fewer than two samples return the datasheet short-circuit
    ///   current.
    /// - Voltages above the open-circuit voltage are treated as Voc, voltages
    ///   below zero as 0 V.
    /// - An exact hit on a sample returns that sample unchanged.
    pub fn current_at(&self, voltage: f64) -> f64 {
        let n = self.len();
        if n <= 1 {
            return self.short_circuit_current();
        }

        let voc = self.open_circuit_voltage();
        let v = voltage.min(voc).max(0.0);

        let spacing = voc / (n - 1) as f64;
        let idx = v / spacing;

        // Saturating casts: NaN maps to 0, +inf to usize::MAX
        let last = n - 1;
        let lo = (idx.floor() as usize).min(last);
        let hi = (idx.ceil() as usize).min(last);

        let current = self.current();
        if lo == hi {
            return current[lo];
        }

        let samples = self.voltage();
        let (v0, v1) = (samples[lo], samples[hi]);
        if v1 == v0 {
            return current[lo];
        }

        let t = (v - v0) / (v1 - v0);
        current[lo] + t * (current[hi] - current[lo])
    }
}

/// Free-function form of [`Curve::current_at`].
pub fn current_at(curve: &Curve, voltage: f64) -> f64 {
    curve.current_at(voltage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveGenerator;
    use crate::solver::SingleDiodeSolver;
    use approx::assert_relative_eq;
    use pvwatch_types::ModuleParameters;

    fn curve(steps: usize) -> Curve {
        let params = ModuleParameters::from_datasheet(35.0, 9.0, 30.0, 8.5).with_resolution(steps, 50);
        let circuit = SingleDiodeSolver::default().solve(&params);
        CurveGenerator::generate(&params, &circuit)
    }

    #[test]
    fn test_empty_curve_falls_back_to_isc() {
        let c = curve(0);
        for v in [-5.0, 0.0, 12.3, 35.0, 1e6, f64::NAN] {
            assert_eq!(c.current_at(v), 9.0);
        }
    }

    #[test]
    fn test_single_point_falls_back_to_isc() {
        let c = curve(1);
        assert_eq!(c.current_at(10.0), 9.0);
    }

    #[test]
    fn test_exact_sample_hits() {
        let c = curve(200);
        for (i, &v) in c.voltage().iter().enumerate() {
            assert_relative_eq!(c.current_at(v), c.current()[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_above_voc_clamps() {
        let c = curve(50);
        let last = *c.current().last().unwrap();
        assert_relative_eq!(c.current_at(35.0), last, epsilon = 1e-9);
        assert_eq!(c.current_at(100.0), c.current_at(35.0));
    }

    #[test]
    fn test_below_zero_clamps() {
        let c = curve(50);
        assert_eq!(c.current_at(-3.0), c.current()[0]);
    }

    #[test]
    fn test_midpoint_is_linear() {
        let c = curve(11);
        let (v0, v1) = (c.voltage()[4], c.voltage()[5]);
        let (i0, i1) = (c.current()[4], c.current()[5]);
        assert_relative_eq!(c.current_at(0.5 * (v0 + v1)), 0.5 * (i0 + i1), epsilon = 1e-9);
    }

    #[test]
    fn test_free_function_matches_method() {
        let c = curve(30);
        assert_eq!(current_at(&c, 17.2), c.current_at(17.2));
    }

    #[test]
    fn test_two_point_curve_interpolates() {
        let c = curve(2);
        let (i0, i1) = (c.current()[0], c.current()[1]);
        assert_relative_eq!(c.current_at(17.5), 0.5 * (i0 + i1), epsilon = 1e-9);
    }
}
