use crate::{
    foundation::{
        core::ValueType,
        error::{SimError, SimResult},
    },
    node::value::{NodeHandle, ValueNode},
};

/// Presentation metadata of one link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ParamDesc {
    /// Stable machine name.
    pub name: &'static str,
    /// Human-readable label.
    pub local_name: &'static str,
    /// One-line description.
    pub description: &'static str,
}

impl ParamDesc {
    /// Descriptor with all three strings.
    pub const fn new(
        name: &'static str,
        local_name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            local_name,
            description,
        }
    }
}

/// A value node parametrized by a fixed, ordered set of named, typed links.
pub trait LinkableNode: ValueNode {
    /// Link descriptors in index order.
    fn vocab(&self) -> &'static [ParamDesc];

    /// Handle currently bound at `index`, if the index exists.
    fn link(&self, index: usize) -> Option<NodeHandle>;

    /// Bind `node` at `index`.
    ///
    /// A node of the wrong type or an unknown index is rejected and the
    /// previous binding is kept.
    fn set_link(&mut self, index: usize, node: NodeHandle) -> SimResult<()>;

    /// Number of links.
    fn link_count(&self) -> usize {
        self.vocab().len()
    }

    /// Index of the link called `name`.
    fn link_index(&self, name: &str) -> Option<usize> {
        self.vocab().iter().position(|p| p.name == name)
    }

    /// Handle currently bound to the link called `name`.
    fn link_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.link_index(name).and_then(|i| self.link(i))
    }

    /// Bind `node` to the link called `name`.
    fn set_link_by_name(&mut self, name: &str, node: NodeHandle) -> SimResult<()> {
        let index = self
            .link_index(name)
            .ok_or_else(|| SimError::link(format!("{} has no link named '{name}'", self.name())))?;
        self.set_link(index, node)
    }
}

pub(crate) fn check_link_type(
    owner: &str,
    param: &ParamDesc,
    expected: ValueType,
    node: &NodeHandle,
) -> SimResult<()> {
    let found = node.value_type();
    if found != expected {
        return Err(SimError::type_mismatch(
            format!("{owner} link '{}'", param.name),
            expected,
            found,
        ));
    }
    Ok(())
}

pub(crate) fn bad_index(owner: &str, index: usize, count: usize) -> SimError {
    SimError::link(format!(
        "{owner} link index {index} out of range (0..{count})"
    ))
}
