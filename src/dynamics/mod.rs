//! Spring dynamics: the oscillator model, the ODE driver and the cached node.

pub(crate) mod dynamic;
pub(crate) mod integrate;
pub(crate) mod oscillator;
