use super::*;

#[test]
fn rng_is_deterministic() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..10 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn noise_is_bounded_and_deterministic() {
    let proc = Procedural::<f64>::new(ProceduralKind::Scalar(ProcScalar::Noise1D {
        amp: 2.0,
        freq_hz: 1.0,
        offset: 0.5,
        seed: 7,
    }));
    let v0 = proc.sample(Time(0.0)).unwrap();
    let v1 = proc.sample(Time(1.0)).unwrap();
    assert_ne!(v0, v1);
    for t in [-2.5, -0.1, 0.0, 0.3, 1.0, 4.75] {
        let v = proc.sample(Time(t)).unwrap();
        assert!(v >= -1.5, "{v} at {t}");
        assert!(v <= 2.5, "{v} at {t}");
    }
    assert_eq!(v0, proc.sample(Time(0.0)).unwrap());
}

#[test]
fn noise_is_continuous_between_lattice_points() {
    let proc = Procedural::<f64>::new(ProceduralKind::Scalar(ProcScalar::Noise1D {
        amp: 1.0,
        freq_hz: 2.0,
        offset: 0.0,
        seed: 3,
    }));
    let left = proc.sample(Time(0.5 - 1e-9)).unwrap();
    let right = proc.sample(Time(0.5)).unwrap();
    assert!((left - right).abs() < 1e-6);
}

#[test]
fn envelope_basic_boundaries() {
    let proc = Procedural::<f64>::new(ProceduralKind::Scalar(ProcScalar::Envelope {
        attack: 1.0,
        decay: 1.0,
        sustain: 0.25,
        release: 1.0,
    }));
    assert_eq!(proc.sample(Time(-1.0)).unwrap(), 0.0);
    assert_eq!(proc.sample(Time(0.0)).unwrap(), 0.0);
    assert!((proc.sample(Time(0.5)).unwrap() - 0.5).abs() < 1e-12);
    assert!((proc.sample(Time(1.0)).unwrap() - 1.0).abs() < 1e-12);
    assert!((proc.sample(Time(2.0)).unwrap() - 0.25).abs() < 1e-12);
    assert_eq!(proc.sample(Time(3.0)).unwrap(), 0.0);
}

#[test]
fn sine_vector_channels_are_independent() {
    let proc = Procedural::<Vec2>::new(ProceduralKind::Vec2 {
        x: ProcScalar::Sine {
            amp: 1.0,
            freq_hz: 1.0,
            phase: 0.0,
            offset: 0.0,
        },
        y: ProcScalar::Sine {
            amp: 2.0,
            freq_hz: 1.0,
            phase: std::f64::consts::FRAC_PI_2,
            offset: 1.0,
        },
    });
    let v = proc.sample(Time(0.25)).unwrap();
    assert!((v.x - 1.0).abs() < 1e-12);
    assert!((v.y - 1.0).abs() < 1e-12);
}

#[test]
fn kind_mismatch_is_an_animation_error() {
    let scalar = ProceduralKind::Scalar(ProcScalar::Sine {
        amp: 1.0,
        freq_hz: 1.0,
        phase: 0.0,
        offset: 0.0,
    });
    let err = <Vec2 as ProcValue>::from_procedural(&scalar, Time(0.0)).unwrap_err();
    assert!(matches!(err, SimError::Animation(_)));
}
