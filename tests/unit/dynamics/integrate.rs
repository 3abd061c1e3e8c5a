use super::*;

struct Harmonic {
    omega: f64,
}

impl OdeSystem<2> for Harmonic {
    fn rhs(&self, _t: f64, y: &[f64; 2]) -> SimResult<[f64; 2]> {
        Ok([y[1], -self.omega * self.omega * y[0]])
    }
}

struct Decay;

impl OdeSystem<1> for Decay {
    fn rhs(&self, _t: f64, y: &[f64; 1]) -> SimResult<[f64; 1]> {
        Ok([-y[0]])
    }
}

struct FailsAfter(f64);

impl OdeSystem<1> for FailsAfter {
    fn rhs(&self, t: f64, _y: &[f64; 1]) -> SimResult<[f64; 1]> {
        if t > self.0 {
            return Err(SimError::computation("boom"));
        }
        Ok([1.0])
    }
}

#[test]
fn harmonic_oscillator_returns_after_one_period() {
    let omega = 2.0;
    let period = std::f64::consts::TAU / omega;
    let solver = Dopri5::with_tolerances(Tolerances {
        abs: 1e-10,
        rel: 1e-10,
    });
    let out = solver
        .integrate(&Harmonic { omega }, [1.0, 0.0], 0.0, period, period / 4.0)
        .unwrap();
    assert!((out.state[0] - 1.0).abs() < 1e-7, "{:?}", out.state);
    assert!(out.state[1].abs() < 1e-6, "{:?}", out.state);
    assert!(out.steps >= 4);
}

#[test]
fn default_tolerance_tracks_exponential_decay() {
    let out = integrate(&Decay, [1.0], 0.0, 2.0, 0.5).unwrap();
    assert!((out.state[0] - (-2.0f64).exp()).abs() < 1e-5);
}

#[test]
fn lands_exactly_on_the_end_time() {
    // y' = 1 integrates exactly, so the final state equals the covered span.
    let out = integrate(&FailsAfter(f64::INFINITY), [0.0], 0.3, 1.7, 0.35).unwrap();
    assert!((out.state[0] - 1.4).abs() < 1e-12, "{:?}", out.state);
}

#[test]
fn empty_interval_is_identity() {
    let out = integrate(&Decay, [0.42], 3.0, 3.0, 0.0).unwrap();
    assert_eq!(out.state, [0.42]);
    assert_eq!(out.steps, 0);
}

#[test]
fn backward_or_non_finite_intervals_are_rejected() {
    assert!(matches!(
        integrate(&Decay, [1.0], 1.0, 0.5, -0.125),
        Err(SimError::Validation(_))
    ));
    assert!(matches!(
        integrate(&Decay, [1.0], 0.0, f64::NAN, 0.1),
        Err(SimError::Validation(_))
    ));
}

#[test]
fn identical_inputs_reproduce_identical_states() {
    let sys = Harmonic { omega: 3.0 };
    let a = integrate(&sys, [0.5, -1.0], 0.0, 4.0, 1.0).unwrap();
    let b = integrate(&sys, [0.5, -1.0], 0.0, 4.0, 1.0).unwrap();
    assert_eq!(a, b);
}

#[test]
fn system_errors_propagate() {
    let err = integrate(&FailsAfter(0.5), [0.0], 0.0, 1.0, 0.25).unwrap_err();
    assert!(matches!(err, SimError::Computation(_)));
}

#[test]
fn step_budget_exhaustion_is_non_convergence() {
    let solver = Dopri5::new().with_max_steps(10);
    let err = solver
        .integrate(&Harmonic { omega: 50.0 }, [1.0, 0.0], 0.0, 10.0, 2.5)
        .unwrap_err();
    assert!(matches!(err, SimError::NonConvergence(_)));
}

#[test]
fn non_positive_hint_falls_back_to_the_whole_span() {
    let out = integrate(&Decay, [1.0], 0.0, 1.0, 0.0).unwrap();
    assert!((out.state[0] - (-1.0f64).exp()).abs() < 1e-5);
}
