use std::{cell::Cell, rc::Rc};

use crate::{
    foundation::{
        core::{Time, Value, ValueType},
        error::{SimError, SimResult},
    },
    node::value::{NodeHandle, ValueNode},
};

/// A typed constant that can be edited in place between evaluations.
#[derive(Debug)]
pub struct ConstNode {
    value: Cell<Value>,
}

impl ConstNode {
    /// Constant holding `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Cell::new(value.into()),
        }
    }

    /// Shared handle to a new constant.
    pub fn handle(value: impl Into<Value>) -> NodeHandle {
        Rc::new(Self::new(value))
    }

    /// Current value.
    pub fn get(&self) -> Value {
        self.value.get()
    }

    /// Replace the value; the type is fixed at construction.
    pub fn set_value(&self, value: impl Into<Value>) -> SimResult<()> {
        let value = value.into();
        let current = self.value.get().value_type();
        if value.value_type() != current {
            return Err(SimError::type_mismatch(
                "constant",
                current,
                value.value_type(),
            ));
        }
        self.value.set(value);
        Ok(())
    }
}

impl ValueNode for ConstNode {
    fn value_type(&self) -> ValueType {
        self.value.get().value_type()
    }

    fn value_at(&self, _t: Time) -> SimResult<Value> {
        Ok(self.value.get())
    }

    fn name(&self) -> &'static str {
        "constant"
    }

    fn local_name(&self) -> &'static str {
        "Constant"
    }
}
