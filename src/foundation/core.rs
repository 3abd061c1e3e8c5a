use std::fmt;

use crate::foundation::error::{SimError, SimResult};

pub use kurbo::Vec2;

/// Animation time in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Time(pub f64);

impl Time {
    /// Start of the animation.
    pub const ZERO: Self = Self(0.0);

    /// Build a time from seconds.
    pub fn secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Seconds as a plain float.
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// `true` unless the time is NaN or infinite.
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Shift by `delta` seconds.
    pub fn offset(self, delta: f64) -> Self {
        Self(self.0 + delta)
    }
}

impl From<f64> for Time {
    fn from(secs: f64) -> Self {
        Self(secs)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Type tag of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Scalar real number.
    Real,
    /// 2D vector.
    Vector,
    /// Angle in radians.
    Angle,
    /// Integer.
    Integer,
    /// Boolean flag.
    Bool,
}

impl ValueType {
    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Vector => "vector",
            Self::Angle => "angle",
            Self::Integer => "integer",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed value flowing through the node graph.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Scalar real number.
    Real(f64),
    /// 2D vector.
    Vector(Vec2),
    /// Angle in radians.
    Angle(f64),
    /// Integer.
    Integer(i64),
    /// Boolean flag.
    Bool(bool),
}

impl Value {
    /// Type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Real(_) => ValueType::Real,
            Self::Vector(_) => ValueType::Vector,
            Self::Angle(_) => ValueType::Angle,
            Self::Integer(_) => ValueType::Integer,
            Self::Bool(_) => ValueType::Bool,
        }
    }

    /// Zero value of a type, used to seed freshly created nodes.
    pub fn zero(ty: ValueType) -> Self {
        match ty {
            ValueType::Real => Self::Real(0.0),
            ValueType::Vector => Self::Vector(Vec2::ZERO),
            ValueType::Angle => Self::Angle(0.0),
            ValueType::Integer => Self::Integer(0),
            ValueType::Bool => Self::Bool(false),
        }
    }

    /// Extract a real, reporting `context` on mismatch.
    pub fn as_real(&self, context: &str) -> SimResult<f64> {
        match *self {
            Self::Real(v) => Ok(v),
            other => Err(SimError::type_mismatch(
                context,
                ValueType::Real,
                other.value_type(),
            )),
        }
    }

    /// Extract a vector, reporting `context` on mismatch.
    pub fn as_vector(&self, context: &str) -> SimResult<Vec2> {
        match *self {
            Self::Vector(v) => Ok(v),
            other => Err(SimError::type_mismatch(
                context,
                ValueType::Vector,
                other.value_type(),
            )),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Self::Vector(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
