//! springtip simulates a "dynamic" tip: a point hanging off an animated origin on a
//! damped radial spring and a torsion spring, evaluated lazily over time.
//!
//! The crate is organised as a small value-node graph:
//!
//! - [`ValueNode`] is anything that yields a [`Value`] at a [`Time`]
//!   ([`ConstNode`], [`AnimatedNode`], [`DerivativeNode`], [`DynamicNode`]).
//! - [`LinkableNode`] nodes expose named, typed parameter links.
//! - [`DynamicNode`] integrates the oscillator with an adaptive Dormand-Prince
//!   stepper ([`Dopri5`]) and caches its state between queries.
//! - [`Scene`] loads a node description from JSON.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod dynamics;
mod foundation;
mod node;
mod scene;

pub use crate::animation::anim::{
    Anim, Expr, InterpMode, Keyframe, Keyframes, Lerp, LoopMode,
};
pub use crate::animation::ease::Ease;
pub use crate::animation::ops::{delay, loop_, mix, reverse, speed};
pub use crate::animation::proc::{ProcScalar, ProcValue, Procedural, ProceduralKind};
pub use crate::dynamics::dynamic::DynamicNode;
pub use crate::dynamics::integrate::{Dopri5, Integration, OdeSystem, Tolerances, integrate};
pub use crate::dynamics::oscillator::OscillatorParams;
pub use crate::foundation::core::{Time, Value, ValueType, Vec2};
pub use crate::foundation::diagnostics::{
    DiagnosticSink, EvalBranch, EvalEvent, EvalOutcome, MemorySink, TracingSink,
};
pub use crate::foundation::error::{SimError, SimResult};
pub use crate::node::animated::AnimatedNode;
pub use crate::node::constant::ConstNode;
pub use crate::node::derivative::{Accuracy, DerivativeNode, Order};
pub use crate::node::linkable::{LinkableNode, ParamDesc};
pub use crate::node::value::{NodeHandle, ValueNode};
pub use crate::scene::model::{Param, Sampling, Scene, SceneParams};
