//! Numerical time derivative of another node.
//!
//! Central finite differences of increasing width; wider stencils are exact for
//! higher polynomial degrees at the cost of more samples of the target.

use crate::{
    foundation::{
        core::{Time, Value, ValueType, Vec2},
        error::{SimError, SimResult},
    },
    node::{
        constant::ConstNode,
        linkable::{LinkableNode, ParamDesc, bad_index, check_link_type},
        value::{NodeHandle, ValueNode, real_at},
    },
};

const DEFAULT_INTERVAL: f64 = 0.01;

static VOCAB: [ParamDesc; 2] = [
    ParamDesc::new("link", "Link", "Value to differentiate"),
    ParamDesc::new(
        "interval",
        "Interval",
        "Time spacing between samples of the differentiated value",
    ),
];

/// Stencil width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    /// Two samples.
    Rough,
    /// Four samples.
    #[default]
    Normal,
    /// Six samples.
    Fine,
    /// Eight samples.
    Extreme,
}

/// Which derivative to take.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Rate of change.
    #[default]
    First,
    /// Rate of change of the rate of change.
    Second,
}

// Weights for offsets -n..=n and the common denominator.
fn stencil(accuracy: Accuracy, order: Order) -> (&'static [f64], f64) {
    match (order, accuracy) {
        (Order::First, Accuracy::Rough) => (&[-1.0, 0.0, 1.0], 2.0),
        (Order::First, Accuracy::Normal) => (&[1.0, -8.0, 0.0, 8.0, -1.0], 12.0),
        (Order::First, Accuracy::Fine) => (&[-1.0, 9.0, -45.0, 0.0, 45.0, -9.0, 1.0], 60.0),
        (Order::First, Accuracy::Extreme) => (
            &[3.0, -32.0, 168.0, -672.0, 0.0, 672.0, -168.0, 32.0, -3.0],
            840.0,
        ),
        (Order::Second, Accuracy::Rough) => (&[1.0, -2.0, 1.0], 1.0),
        (Order::Second, Accuracy::Normal) => (&[-1.0, 16.0, -30.0, 16.0, -1.0], 12.0),
        (Order::Second, Accuracy::Fine) => {
            (&[2.0, -27.0, 270.0, -490.0, 270.0, -27.0, 2.0], 180.0)
        }
        (Order::Second, Accuracy::Extreme) => (
            &[
                -9.0, 128.0, -1008.0, 8064.0, -14350.0, 8064.0, -1008.0, 128.0, -9.0,
            ],
            5040.0,
        ),
    }
}

/// Finite-difference derivative of the node bound to `link`.
#[derive(Clone, Debug)]
pub struct DerivativeNode {
    ty: ValueType,
    link: NodeHandle,
    interval: NodeHandle,
    accuracy: Accuracy,
    order: Order,
}

impl DerivativeNode {
    /// Derivative of a constant seeded from `value` (real or vector).
    pub fn new(value: &Value) -> SimResult<Self> {
        let ty = value.value_type();
        if !Self::check_type(ty) {
            return Err(SimError::validation(format!(
                "derivative node accepts real or vector values, found {ty}"
            )));
        }
        Ok(Self {
            ty,
            link: ConstNode::handle(*value),
            interval: ConstNode::handle(DEFAULT_INTERVAL),
            accuracy: Accuracy::default(),
            order: Order::default(),
        })
    }

    /// Output types this node supports.
    pub fn check_type(ty: ValueType) -> bool {
        matches!(ty, ValueType::Real | ValueType::Vector)
    }

    /// Builder-style [`Self::set_accuracy`].
    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Builder-style [`Self::set_order`].
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Stencil width.
    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Derivative order produced by [`ValueNode::value_at`].
    pub fn order(&self) -> Order {
        self.order
    }

    /// Change the stencil width.
    pub fn set_accuracy(&mut self, accuracy: Accuracy) {
        self.accuracy = accuracy;
    }

    /// Change the derivative order produced by [`ValueNode::value_at`].
    pub fn set_order(&mut self, order: Order) {
        self.order = order;
    }

    /// Derivative of the requested `order` at `t`, independent of [`Self::order`].
    pub fn derivative_at(&self, t: Time, order: Order) -> SimResult<Value> {
        let h = real_at(self.interval.as_ref(), t, "derivative link 'interval'")?;
        if !(h.is_finite() && h > 0.0) {
            return Err(SimError::computation(format!(
                "derivative interval must be positive and finite, got {h}"
            )));
        }

        let (weights, denom) = stencil(self.accuracy, order);
        let n = (weights.len() / 2) as f64;
        let scale = denom * h.powi(if order == Order::First { 1 } else { 2 });

        match self.ty {
            ValueType::Real => {
                let mut acc = 0.0;
                for (i, &w) in weights.iter().enumerate() {
                    if w == 0.0 {
                        continue;
                    }
                    let at = t.offset((i as f64 - n) * h);
                    acc += w * real_at(self.link.as_ref(), at, "derivative link 'link'")?;
                }
                Ok(Value::Real(acc / scale))
            }
            _ => {
                let mut acc = Vec2::ZERO;
                for (i, &w) in weights.iter().enumerate() {
                    if w == 0.0 {
                        continue;
                    }
                    let at = t.offset((i as f64 - n) * h);
                    acc += w * self.link.value_at(at)?.as_vector("derivative link 'link'")?;
                }
                Ok(Value::Vector(acc / scale))
            }
        }
    }
}

impl ValueNode for DerivativeNode {
    fn value_type(&self) -> ValueType {
        self.ty
    }

    fn value_at(&self, t: Time) -> SimResult<Value> {
        self.derivative_at(t, self.order)
    }

    fn name(&self) -> &'static str {
        "derivative"
    }

    fn local_name(&self) -> &'static str {
        "Derivative"
    }
}

impl LinkableNode for DerivativeNode {
    fn vocab(&self) -> &'static [ParamDesc] {
        &VOCAB
    }

    fn link(&self, index: usize) -> Option<NodeHandle> {
        match index {
            0 => Some(self.link.clone()),
            1 => Some(self.interval.clone()),
            _ => None,
        }
    }

    fn set_link(&mut self, index: usize, node: NodeHandle) -> SimResult<()> {
        match index {
            0 => {
                check_link_type(self.name(), &VOCAB[0], self.ty, &node)?;
                self.link = node;
            }
            1 => {
                check_link_type(self.name(), &VOCAB[1], ValueType::Real, &node)?;
                self.interval = node;
            }
            _ => return Err(bad_index(self.name(), index, VOCAB.len())),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/derivative.rs"]
mod tests;
