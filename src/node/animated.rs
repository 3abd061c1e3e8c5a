use std::rc::Rc;

use crate::{
    animation::anim::Anim,
    foundation::{
        core::{Time, Value, ValueType, Vec2},
        error::SimResult,
    },
    node::value::{NodeHandle, ValueNode},
};

/// A node backed by an animation curve.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimatedNode {
    /// Real-valued curve.
    Real(Anim<f64>),
    /// Vector-valued curve.
    Vector(Anim<Vec2>),
}

impl AnimatedNode {
    /// Validated real-valued node.
    pub fn real(anim: Anim<f64>) -> SimResult<Self> {
        anim.validate()?;
        Ok(Self::Real(anim))
    }

    /// Validated vector-valued node.
    pub fn vector(anim: Anim<Vec2>) -> SimResult<Self> {
        anim.validate()?;
        Ok(Self::Vector(anim))
    }

    /// Wrap in a shared handle.
    pub fn into_handle(self) -> NodeHandle {
        Rc::new(self)
    }
}

impl ValueNode for AnimatedNode {
    fn value_type(&self) -> ValueType {
        match self {
            Self::Real(_) => ValueType::Real,
            Self::Vector(_) => ValueType::Vector,
        }
    }

    fn value_at(&self, t: Time) -> SimResult<Value> {
        match self {
            Self::Real(anim) => anim.sample(t).map(Value::Real),
            Self::Vector(anim) => anim.sample(t).map(Value::Vector),
        }
    }

    fn name(&self) -> &'static str {
        "animated"
    }

    fn local_name(&self) -> &'static str {
        "Animated"
    }
}
