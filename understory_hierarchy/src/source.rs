// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability contract required from the system that owns the nodes.

use crate::types::InstanceId;

/// Read access to an externally owned node hierarchy.
///
/// The [`Hierarchy`](crate::Hierarchy) never walks the external graph on its
/// own initiative. It calls into a `NodeSource` only from
/// [`Hierarchy::build`](crate::Hierarchy::build),
/// [`Hierarchy::try_add_single`](crate::Hierarchy::try_add_single), and
/// [`Hierarchy::add_recurse`](crate::Hierarchy::add_recurse).
///
/// ## Contract
///
/// - `instance_id` is stable for a node while it is alive.
/// - `children_of` yields children in the system's own order and yields the
///   same order on repeated calls while the node is unchanged.
/// - `payload` returns a handle the hierarchy stores as-is. It is never
///   inspected.
pub trait NodeSource {
    /// Handle to a node in the external system.
    type Node: Clone;
    /// Opaque per-node handle stored alongside each slot (for example a transform handle).
    type Payload;

    /// Returns the identifier of `node`.
    fn instance_id(&self, node: &Self::Node) -> InstanceId;

    /// Returns the parent of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Returns the direct children of `node` in order.
    fn children_of(&self, node: &Self::Node) -> impl Iterator<Item = Self::Node>;

    /// Returns the payload handle to store for `node`.
    fn payload(&self, node: &Self::Node) -> Self::Payload;
}
