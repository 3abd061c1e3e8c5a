use std::{fmt, rc::Rc};

use crate::foundation::{
    core::{Time, Value, ValueType, Vec2},
    error::SimResult,
};

/// A node producing a typed value as a function of time.
///
/// Implementations must accept arbitrary, non-monotonic query times and must not
/// change what later queries observe, with the exception of nodes that carry
/// explicit simulation memory (see [`crate::DynamicNode`]).
pub trait ValueNode: fmt::Debug {
    /// Type of every value this node produces.
    fn value_type(&self) -> ValueType;

    /// Value at time `t`.
    fn value_at(&self, t: Time) -> SimResult<Value>;

    /// Stable machine name of the node kind.
    fn name(&self) -> &'static str;

    /// Human-readable name of the node kind.
    fn local_name(&self) -> &'static str;
}

/// Shared handle to a node in the graph.
pub type NodeHandle = Rc<dyn ValueNode>;

pub(crate) fn real_at(node: &dyn ValueNode, t: Time, context: &str) -> SimResult<f64> {
    node.value_at(t)?.as_real(context)
}

pub(crate) fn vector_at(node: &dyn ValueNode, t: Time, context: &str) -> SimResult<Vec2> {
    node.value_at(t)?.as_vector(context)
}
