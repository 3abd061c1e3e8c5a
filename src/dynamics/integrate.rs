//! Adaptive Dormand-Prince 5(4) integration over a closed interval.
//!
//! The driver advances a fixed-size state from `t0` to `t1`, starting from a
//! caller-provided step hint and adapting the step to a mixed absolute/relative
//! error tolerance. The final step is clipped so the result lands exactly on `t1`.

use crate::foundation::error::{SimError, SimResult};

/// An ODE system `dy/dt = f(t, y)` with `N` state variables.
pub trait OdeSystem<const N: usize> {
    /// Derivative of `y` at `t`.
    fn rhs(&self, t: f64, y: &[f64; N]) -> SimResult<[f64; N]>;
}

/// Per-component error tolerances.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerances {
    /// Absolute tolerance.
    pub abs: f64,
    /// Relative tolerance.
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-6,
            rel: 1e-6,
        }
    }
}

/// Outcome of [`integrate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integration<const N: usize> {
    /// State at `t1`.
    pub state: [f64; N],
    /// Accepted steps.
    pub steps: usize,
}

const SAFETY: f64 = 0.9;
const MAX_GROW: f64 = 5.0;
const MIN_SHRINK: f64 = 0.2;
const MIN_REL_STEP: f64 = 1e-12;
const DEFAULT_MAX_STEPS: usize = 100_000;

// Butcher tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also the FSAL stage row).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between 5th- and embedded 4th-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

fn combine<const N: usize>(y: &[f64; N], h: f64, terms: &[(f64, &[f64; N])]) -> [f64; N] {
    std::array::from_fn(|i| y[i] + h * terms.iter().map(|(c, k)| c * k[i]).sum::<f64>())
}

/// Controlled Dormand-Prince 5(4) stepper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dopri5 {
    tol: Tolerances,
    max_steps: usize,
}

impl Default for Dopri5 {
    fn default() -> Self {
        Self {
            tol: Tolerances::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl Dopri5 {
    /// Stepper with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stepper with custom tolerances.
    pub fn with_tolerances(tol: Tolerances) -> Self {
        Self {
            tol,
            ..Self::default()
        }
    }

    /// Cap on attempted (accepted + rejected) steps per call.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Configured tolerances.
    pub fn tolerances(&self) -> Tolerances {
        self.tol
    }

    /// Advance `state` from `t0` to `t1` (`t1 >= t0`).
    pub fn integrate<S, const N: usize>(
        &self,
        system: &S,
        state: [f64; N],
        t0: f64,
        t1: f64,
        step_hint: f64,
    ) -> SimResult<Integration<N>>
    where
        S: OdeSystem<N> + ?Sized,
    {
        if !(t0.is_finite() && t1.is_finite()) {
            return Err(SimError::validation(format!(
                "integration bounds must be finite, got [{t0}, {t1}]"
            )));
        }
        if t1 < t0 {
            return Err(SimError::validation(format!(
                "integration must run forward, got [{t0}, {t1}]"
            )));
        }
        if t1 == t0 {
            return Ok(Integration { state, steps: 0 });
        }
        if !(self.tol.abs > 0.0 && self.tol.rel >= 0.0) {
            return Err(SimError::validation("integration tolerances must be positive"));
        }

        let span = t1 - t0;
        let mut h = if step_hint.is_finite() && step_hint > 0.0 {
            step_hint.min(span)
        } else {
            span
        };

        let mut t = t0;
        let mut y = state;
        let mut k1 = system.rhs(t, &y)?;
        let mut steps = 0usize;
        let mut attempts = 0usize;

        loop {
            attempts += 1;
            if attempts > self.max_steps {
                return Err(SimError::non_convergence(format!(
                    "exceeded {} steps before reaching t={t1} (stopped at t={t})",
                    self.max_steps
                )));
            }

            // Absorb slivers so the interval never ends in a vanishing step.
            let last = t1 - (t + h) <= span * 1e-10;
            if last {
                h = t1 - t;
            }

            let (y_new, k7, err) = self.trial(system, t, &y, &k1, h)?;

            if err <= 1.0 {
                t = if last { t1 } else { t + h };
                y = y_new;
                k1 = k7;
                steps += 1;
                if last {
                    break;
                }
                let grow = if err == 0.0 {
                    MAX_GROW
                } else {
                    (SAFETY * err.powf(-0.2)).min(MAX_GROW)
                };
                h *= grow;
            } else {
                let shrink = if err.is_finite() {
                    (SAFETY * err.powf(-0.25)).max(MIN_SHRINK)
                } else {
                    MIN_SHRINK
                };
                h *= shrink;
                if h < MIN_REL_STEP * t.abs().max(1.0) {
                    return Err(SimError::non_convergence(format!(
                        "step size underflow at t={t} (h={h:e})"
                    )));
                }
            }
        }

        Ok(Integration { state: y, steps })
    }

    // One trial step: (candidate state, derivative at the candidate, scaled error).
    fn trial<S, const N: usize>(
        &self,
        system: &S,
        t: f64,
        y: &[f64; N],
        k1: &[f64; N],
        h: f64,
    ) -> SimResult<([f64; N], [f64; N], f64)>
    where
        S: OdeSystem<N> + ?Sized,
    {
        let k2 = system.rhs(t + C2 * h, &combine(y, h, &[(A21, k1)]))?;
        let k3 = system.rhs(t + C3 * h, &combine(y, h, &[(A31, k1), (A32, &k2)]))?;
        let k4 = system.rhs(
            t + C4 * h,
            &combine(y, h, &[(A41, k1), (A42, &k2), (A43, &k3)]),
        )?;
        let k5 = system.rhs(
            t + C5 * h,
            &combine(y, h, &[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        )?;
        let k6 = system.rhs(
            t + h,
            &combine(
                y,
                h,
                &[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
            ),
        )?;
        let y_new = combine(
            y,
            h,
            &[(B1, k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
        );
        let k7 = system.rhs(t + h, &y_new)?;

        let zero = [0.0; N];
        let y_err = combine(
            &zero,
            h,
            &[
                (E1, k1),
                (E3, &k3),
                (E4, &k4),
                (E5, &k5),
                (E6, &k6),
                (E7, &k7),
            ],
        );

        let mut err = 0.0f64;
        for i in 0..N {
            let scale = self.tol.abs + self.tol.rel * y[i].abs().max(y_new[i].abs());
            let e = y_err[i].abs() / scale;
            if e.is_nan() {
                return Ok((y_new, k7, f64::INFINITY));
            }
            err = err.max(e);
        }
        Ok((y_new, k7, err))
    }
}

/// Integrate with default tolerances; see [`Dopri5::integrate`].
pub fn integrate<S, const N: usize>(
    system: &S,
    state: [f64; N],
    t0: f64,
    t1: f64,
    step_hint: f64,
) -> SimResult<Integration<N>>
where
    S: OdeSystem<N> + ?Sized,
{
    Dopri5::default().integrate(system, state, t0, t1, step_hint)
}

#[cfg(test)]
#[path = "../../tests/unit/dynamics/integrate.rs"]
mod tests;
