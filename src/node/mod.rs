//! The value-node graph: time-indexed nodes and typed links between them.

pub(crate) mod animated;
pub(crate) mod constant;
pub(crate) mod derivative;
pub(crate) mod linkable;
pub(crate) mod value;
