use crate::foundation::{
    core::{Time, Vec2},
    error::{SimError, SimResult},
};

/// Closed-form animation source evaluated directly from time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Procedural<T> {
    /// Generator and its parameters.
    pub kind: ProceduralKind,
    #[serde(skip)]
    _marker: std::marker::PhantomData<T>,
}

impl<T> Procedural<T> {
    /// Wrap a generator.
    pub fn new(kind: ProceduralKind) -> Self {
        Self {
            kind,
            _marker: std::marker::PhantomData,
        }
    }
}

/// Value types that can be produced by a [`ProceduralKind`].
pub trait ProcValue: Sized {
    /// Sample `kind` at `t`.
    fn from_procedural(kind: &ProceduralKind, t: Time) -> SimResult<Self>;
}

impl<T> Procedural<T>
where
    T: ProcValue,
{
    /// Sample at `t`.
    pub fn sample(&self, t: Time) -> SimResult<T> {
        T::from_procedural(&self.kind, t)
    }
}

/// Scalar generator or one generator per vector axis.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "params")]
pub enum ProceduralKind {
    /// Single scalar channel.
    Scalar(ProcScalar),
    /// Independent x and y channels.
    Vec2 {
        /// Channel driving `x`.
        x: ProcScalar,
        /// Channel driving `y`.
        y: ProcScalar,
    },
}

/// Scalar generators. Durations and frequencies are in seconds and hertz.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ProcScalar {
    /// `offset + amp * sin(2π freq t + phase)`.
    Sine {
        /// Amplitude.
        amp: f64,
        /// Frequency in hertz.
        freq_hz: f64,
        /// Phase in radians.
        phase: f64,
        /// Constant added to the wave.
        offset: f64,
    },
    /// Linearly interpolated value noise in `offset ± amp`.
    Noise1D {
        /// Amplitude.
        amp: f64,
        /// Lattice points per second.
        freq_hz: f64,
        /// Center value.
        offset: f64,
        /// Noise seed.
        #[serde(default)]
        seed: u64,
    },
    /// Attack/decay/sustain/release envelope peaking at 1.
    Envelope {
        /// Rise time to 1.
        attack: f64,
        /// Fall time to `sustain`.
        decay: f64,
        /// Level reached after decay.
        sustain: f64,
        /// Fall time from `sustain` to 0.
        release: f64,
    },
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub(crate) fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

fn noise01(seed: u64, x: i64) -> f64 {
    let mut rng = Rng64::new(seed ^ (x as u64).wrapping_mul(0xD6E8_FEB8_6659_FD93));
    rng.next_f64_01()
}

fn sample_scalar(s: &ProcScalar, secs: f64) -> f64 {
    match *s {
        ProcScalar::Sine {
            amp,
            freq_hz,
            phase,
            offset,
        } => offset + amp * (std::f64::consts::TAU * freq_hz * secs + phase).sin(),
        ProcScalar::Noise1D {
            amp,
            freq_hz,
            offset,
            seed,
        } => {
            let x = secs * freq_hz;
            let i0 = x.floor();
            let t = x - i0;
            let i0 = i0 as i64;

            let a = noise01(seed, i0) * 2.0 - 1.0;
            let b = noise01(seed, i0.wrapping_add(1)) * 2.0 - 1.0;
            offset + amp * (a + (b - a) * t)
        }
        ProcScalar::Envelope {
            attack,
            decay,
            sustain,
            release,
        } => {
            let t = secs;
            if t < 0.0 {
                0.0
            } else if attack > 0.0 && t < attack {
                t / attack
            } else if decay > 0.0 && t < attack + decay {
                let u = (t - attack) / decay;
                1.0 + (sustain - 1.0) * u
            } else if release > 0.0 && t < attack + decay + release {
                let u = (t - attack - decay) / release;
                sustain * (1.0 - u)
            } else {
                0.0
            }
        }
    }
}

impl ProcValue for f64 {
    fn from_procedural(kind: &ProceduralKind, t: Time) -> SimResult<Self> {
        match kind {
            ProceduralKind::Scalar(s) => Ok(sample_scalar(s, t.0)),
            ProceduralKind::Vec2 { .. } => Err(SimError::animation(
                "procedural kind Vec2 cannot be sampled as a real",
            )),
        }
    }
}

impl ProcValue for Vec2 {
    fn from_procedural(kind: &ProceduralKind, t: Time) -> SimResult<Self> {
        match kind {
            ProceduralKind::Scalar(_) => Err(SimError::animation(
                "procedural kind Scalar cannot be sampled as a vector",
            )),
            ProceduralKind::Vec2 { x, y } => {
                Ok(Vec2::new(sample_scalar(x, t.0), sample_scalar(y, t.0)))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/proc.rs"]
mod tests;
