use crate::foundation::core::ValueType;

/// Convenience result type used across springtip.
pub type SimResult<T> = Result<T, SimError>;

/// Top-level error taxonomy used by node and simulation APIs.
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    /// A value or link of the wrong type was supplied.
    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Where the mismatch was detected (node or link name).
        context: String,
        /// Type the receiver accepts.
        expected: ValueType,
        /// Type that was offered.
        found: ValueType,
    },

    /// Invalid link index or link name.
    #[error("link error: {0}")]
    Link(String),

    /// Degenerate parameters or non-finite intermediate values during evaluation.
    #[error("computation error: {0}")]
    Computation(String),

    /// The integrator could not meet its tolerance.
    #[error("integration did not converge: {0}")]
    NonConvergence(String),

    /// Invalid user-provided input or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while validating or sampling animation curves.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    /// Build a [`SimError::TypeMismatch`] value.
    pub fn type_mismatch(context: impl Into<String>, expected: ValueType, found: ValueType) -> Self {
        Self::TypeMismatch {
            context: context.into(),
            expected,
            found,
        }
    }

    /// Build a [`SimError::Link`] value.
    pub fn link(msg: impl Into<String>) -> Self {
        Self::Link(msg.into())
    }

    /// Build a [`SimError::Computation`] value.
    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Build a [`SimError::NonConvergence`] value.
    pub fn non_convergence(msg: impl Into<String>) -> Self {
        Self::NonConvergence(msg.into())
    }

    /// Build a [`SimError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SimError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`SimError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
