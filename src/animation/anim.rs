use crate::{
    animation::{
        ease::Ease,
        proc::{ProcValue, Procedural},
    },
    foundation::{
        core::{Time, Vec2},
        error::{SimError, SimResult},
    },
};

/// Linear interpolation between two values.
pub trait Lerp: Sized {
    /// Blend `a` toward `b` by `t` (0 → `a`, 1 → `b`).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// A value animated over continuous time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Anim<T> {
    /// Piecewise curve through authored keys.
    Keyframes(Keyframes<T>),
    /// Closed-form generator.
    Procedural(Procedural<T>),
    /// Time remap or blend of other curves.
    Expr(Expr<T>),
}

impl<T> Anim<T>
where
    T: Lerp + Clone + ProcValue,
{
    /// Curve holding `value` forever.
    pub fn constant(value: T) -> Self {
        Self::Keyframes(Keyframes {
            keys: vec![Keyframe {
                time: Time::ZERO,
                value,
                ease: Ease::Linear,
            }],
            mode: InterpMode::Hold,
            default: None,
        })
    }

    /// Linear keyframes through `(time, value)` pairs.
    pub fn linear(points: impl IntoIterator<Item = (f64, T)>) -> Self {
        Self::Keyframes(Keyframes {
            keys: points
                .into_iter()
                .map(|(time, value)| Keyframe {
                    time: Time(time),
                    value,
                    ease: Ease::Linear,
                })
                .collect(),
            mode: InterpMode::Linear,
            default: None,
        })
    }

    /// Sample at `t`; any real `t` is accepted.
    pub fn sample(&self, t: Time) -> SimResult<T> {
        match self {
            Self::Keyframes(kf) => kf.sample(t),
            Self::Procedural(proc) => proc.sample(t),
            Self::Expr(expr) => expr.sample(t),
        }
    }

    /// Check structural invariants without sampling.
    pub fn validate(&self) -> SimResult<()> {
        match self {
            Self::Keyframes(kf) => kf.validate(),
            Self::Procedural(_proc) => Ok(()),
            Self::Expr(expr) => expr.validate(),
        }
    }
}

/// Keyed curve; keys must be sorted by time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframes<T> {
    /// Keys sorted by time.
    pub keys: Vec<Keyframe<T>>,
    /// Interpolation between keys.
    pub mode: InterpMode,
    /// Value used when no keys exist.
    pub default: Option<T>,
}

impl<T> Keyframes<T>
where
    T: Lerp + Clone,
{
    /// Check sorting, finiteness and emptiness rules.
    pub fn validate(&self) -> SimResult<()> {
        if self.keys.is_empty() && self.default.is_none() {
            return Err(SimError::animation(
                "Keyframes must have at least one key or a default value",
            ));
        }
        if !self.keys.iter().all(|k| k.time.is_finite()) {
            return Err(SimError::animation("Keyframes key times must be finite"));
        }
        if !self.keys.windows(2).all(|w| w[0].time.0 <= w[1].time.0) {
            return Err(SimError::animation("Keyframes keys must be sorted by time"));
        }
        Ok(())
    }

    /// Sample at `t`, holding the first/last key outside the keyed range.
    pub fn sample(&self, t: Time) -> SimResult<T> {
        if self.keys.is_empty() {
            return self
                .default
                .clone()
                .ok_or_else(|| SimError::animation("Keyframes has no keys and no default"));
        }

        let idx = self.keys.partition_point(|k| k.time.0 <= t.0);

        if idx == 0 {
            return Ok(self.keys[0].value.clone());
        }
        if idx >= self.keys.len() {
            return Ok(self.keys[self.keys.len() - 1].value.clone());
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let span = b.time.0 - a.time.0;
        if span <= 0.0 {
            return Ok(a.value.clone());
        }

        let u = (t.0 - a.time.0) / span;
        let ue = a.ease.apply(u);
        match self.mode {
            InterpMode::Hold => Ok(a.value.clone()),
            InterpMode::Linear => Ok(T::lerp(&a.value, &b.value, ue)),
        }
    }
}

/// One authored key.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    /// Key time.
    pub time: Time,
    /// Key value.
    pub value: T,
    /// Ease applied toward the next key.
    #[serde(default)]
    pub ease: Ease,
}

/// How values between keys are produced.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum InterpMode {
    /// Step: keep the previous key's value.
    Hold,
    /// Eased linear blend.
    Linear,
}

/// Time remaps and blends over nested curves. Durations are in seconds.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Expr<T> {
    /// Start `inner` `by` seconds later, holding its time-0 value before that.
    Delay {
        /// Inner curve.
        inner: Box<Anim<T>>,
        /// Delay in seconds.
        by: f64,
    },
    /// Play `inner` `factor` times faster.
    Speed {
        /// Inner curve.
        inner: Box<Anim<T>>,
        /// Rate multiplier, > 0.
        factor: f64,
    },
    /// Play the first `duration` seconds of `inner` backwards.
    Reverse {
        /// Inner curve.
        inner: Box<Anim<T>>,
        /// Mirrored span, > 0.
        duration: f64,
    },
    /// Repeat the first `period` seconds of `inner`.
    Loop {
        /// Inner curve.
        inner: Box<Anim<T>>,
        /// Loop length, > 0.
        period: f64,
        /// Wrap behavior.
        mode: LoopMode,
    },
    /// Blend `a` toward `b` by `t` (clamped to `[0, 1]`).
    Mix {
        /// Curve at blend 0.
        a: Box<Anim<T>>,
        /// Curve at blend 1.
        b: Box<Anim<T>>,
        /// Blend factor curve.
        t: Box<Anim<f64>>,
    },
}

/// Wrap behavior of [`Expr::Loop`].
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum LoopMode {
    /// Jump back to the start.
    Repeat,
    /// Alternate forward and backward.
    PingPong,
}

fn positive(value: f64, what: &str) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::animation(format!("{what} must be > 0")))
    }
}

impl<T> Expr<T>
where
    T: Lerp + Clone + ProcValue,
{
    /// Check parameters of this node and all nested curves.
    pub fn validate(&self) -> SimResult<()> {
        match self {
            Self::Delay { inner, by } => {
                if !by.is_finite() {
                    return Err(SimError::animation("Delay must be finite"));
                }
                inner.validate()
            }
            Self::Speed { inner, factor } => {
                positive(*factor, "Speed factor")?;
                inner.validate()
            }
            Self::Reverse { inner, duration } => {
                positive(*duration, "Reverse duration")?;
                inner.validate()
            }
            Self::Loop {
                inner,
                period,
                mode: _,
            } => {
                positive(*period, "Loop period")?;
                inner.validate()
            }
            Self::Mix { a, b, t } => {
                a.validate()?;
                b.validate()?;
                t.validate()
            }
        }
    }

    /// Sample at `t`.
    pub fn sample(&self, t: Time) -> SimResult<T> {
        match self {
            Self::Delay { inner, by } => inner.sample(Time((t.0 - by).max(0.0))),
            Self::Speed { inner, factor } => {
                positive(*factor, "Speed factor")?;
                inner.sample(Time(t.0 * factor))
            }
            Self::Reverse { inner, duration } => {
                positive(*duration, "Reverse duration")?;
                inner.sample(Time(duration - t.0.clamp(0.0, *duration)))
            }
            Self::Loop {
                inner,
                period,
                mode,
            } => {
                positive(*period, "Loop period")?;
                let mapped = match mode {
                    LoopMode::Repeat => t.0.rem_euclid(*period),
                    LoopMode::PingPong => {
                        let pos = t.0.rem_euclid(2.0 * period);
                        if pos < *period { pos } else { 2.0 * period - pos }
                    }
                };
                inner.sample(Time(mapped))
            }
            Self::Mix { a, b, t: blend } => {
                let tt = blend.sample(t)?.clamp(0.0, 1.0);
                let av = a.sample(t)?;
                let bv = b.sample(t)?;
                Ok(T::lerp(&av, &bv, tt))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
