//! Time-indexed animation curves used to drive node parameters.

pub(crate) mod anim;
pub(crate) mod ease;
pub(crate) mod ops;
pub(crate) mod proc;
