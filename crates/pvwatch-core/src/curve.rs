//! I-V-P curve generation
//!
//! A [`Curve`] holds three parallel sample arrays (voltage, current, power)
//! that always have the same length. Curves are built whole by
//! [`CurveGenerator::generate`] and never modified afterwards; a new operating
//! point means a new curve.

use pvwatch_types::ModuleParameters;

use crate::solver::CircuitState;

/// Sampled current-voltage-power characteristic of a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    voltage: Vec<f64>,
    current: Vec<f64>,
    power: Vec<f64>,
    /// Upper end of the voltage axis (V)
    open_circuit_voltage: f64,
    /// Datasheet short-circuit current, returned by lookups on curves too
    /// short to interpolate (A)
    short_circuit_current: f64,
}

impl Curve {
    /// Zero-length curve. Lookups against it return `short_circuit_current`.
    pub fn empty(short_circuit_current: f64) -> Self {
        Self {
            voltage: Vec::new(),
            current: Vec::new(),
            power: Vec::new(),
            open_circuit_voltage: 0.0,
            short_circuit_current,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }

    pub fn voltage(&self) -> &[f64] {
        &self.voltage
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn power(&self) -> &[f64] {
        &self.power
    }

    pub fn open_circuit_voltage(&self) -> f64 {
        self.open_circuit_voltage
    }

    pub fn short_circuit_current(&self) -> f64 {
        self.short_circuit_current
    }

    /// Same curve with its samples dropped.
    pub fn cleared(&self) -> Self {
        Self::empty(self.short_circuit_current)
    }

    /// Sample with the largest power, as `(voltage, current, power)`.
    ///
    /// Returns `None` for an empty curve or one with no finite power sample.
    pub fn maximum_power_point(&self) -> Option<(f64, f64, f64)> {
        self.power
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, &p)| (self.voltage[i], self.current[i], p))
    }
}

/// Fills a [`Curve`] from solved circuit parameters.
pub struct CurveGenerator;

impl CurveGenerator {
    /// Sample the module over `0..=Voc` at `params.steps` evenly spaced
    /// voltages.
    ///
    /// Each current sample is its own fixed-point solve of the diode equation
    ///
    /// `I = Ipv - I0 (exp((V + I Rs) / (a Vt)) - 1) - (V + I Rs) / Rsh`
    ///
    /// seeded at zero and run for `params.iterations` rounds, then clamped to
    /// be non-negative. Non-finite circuit parameters give non-finite samples.
    pub fn generate(params: &ModuleParameters, circuit: &CircuitState) -> Curve {
        let steps = params.steps;
        let voc = circuit.voc_at_operating_point;

        if steps == 0 {
            return Curve::empty(params.i_sc);
        }

        let spacing = if steps > 1 { voc / (steps - 1) as f64 } else { 0.0 };

        let ipv = circuit.photocurrent;
        let i0 = circuit.saturation_current;
        let rs = circuit.series_resistance;
        let rsh = circuit.shunt_resistance;
        let avt = circuit.diode_voltage();

        let mut voltage = Vec::with_capacity(steps);
        let mut current = Vec::with_capacity(steps);
        let mut power = Vec::with_capacity(steps);

        for i in 0..steps {
            let v = i as f64 * spacing;

            let mut amps = 0.0;
            for _ in 0..params.iterations {
                let vd = v + amps * rs;
                amps = ipv - i0 * ((vd / avt).exp() - 1.0) - vd / rsh;
            }
            // NaN stays NaN here, only negative currents are clamped
            if amps < 0.0 {
                amps = 0.0;
            }

            voltage.push(v);
            current.push(amps);
            power.push(v * amps);
        }

        Curve {
            voltage,
            current,
            power,
            open_circuit_voltage: voc,
            short_circuit_current: params.i_sc,
        }
    }
}
