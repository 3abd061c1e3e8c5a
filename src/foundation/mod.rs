//! Core value types, the error taxonomy and evaluation diagnostics.

pub(crate) mod core;
/// Pluggable receivers of per-evaluation events.
pub mod diagnostics;
pub(crate) mod error;
pub(crate) mod math;
