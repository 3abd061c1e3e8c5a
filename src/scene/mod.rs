//! JSON scene files describing one dynamic node and how to sample it.

pub(crate) mod model;
