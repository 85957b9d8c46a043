// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the hierarchy: identifiers, slot indices, and reparenting records.

/// Sentinel stored in the parent array for roots.
pub(crate) const INVALID: u32 = u32::MAX;

/// Identifier assigned to a node by the external system that owns it.
///
/// Unique among live nodes at any instant, but the owning system may hand the
/// same value to a new node after the old one is destroyed. Anything outside
/// the [`Hierarchy`](crate::Hierarchy) that caches data by `InstanceId` has to
/// drop those entries when the id is removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InstanceId(pub i32);

impl InstanceId {
    /// Returns the raw integer value.
    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for InstanceId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Dense index of a slot inside a [`Hierarchy`](crate::Hierarchy).
///
/// Slot indices are only meaningful for the store that produced them and only
/// until the next mutation. [`Hierarchy::remove`](crate::Hierarchy::remove)
/// compacts the arrays and may renumber surviving slots; resolve the
/// [`InstanceId`] again with [`Hierarchy::index_of`](crate::Hierarchy::index_of)
/// after mutating.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SlotIndex(pub(crate) u32);

impl SlotIndex {
    pub(crate) const fn new(idx: u32) -> Self {
        Self(idx)
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "slot counts are bounded by u32 when slots are pushed."
    )]
    pub(crate) const fn from_usize(idx: usize) -> Self {
        Self(idx as u32)
    }

    /// Returns the position of this slot in the parallel arrays.
    #[inline]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) const fn raw(self) -> u32 {
        self.0
    }
}

/// One requested parent change, as produced by an external change-detection pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ParentChange {
    /// Node whose parent changed.
    pub child: InstanceId,
    /// The node's new parent, or `None` if it became a root.
    pub new_parent: Option<InstanceId>,
}

impl ParentChange {
    /// Convenience constructor.
    pub const fn new(child: InstanceId, new_parent: Option<InstanceId>) -> Self {
        Self { child, new_parent }
    }
}

/// A parent change that [`Hierarchy::change_parents`](crate::Hierarchy::change_parents)
/// actually performed.
///
/// `new_parent` is the parent that took effect, which is `None` when the
/// requested parent is not tracked by the store.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AppliedParentChange {
    /// Node that was moved.
    pub child: InstanceId,
    /// Parent before the change (`None` for a root).
    pub old_parent: Option<InstanceId>,
    /// Parent after the change (`None` for a root).
    pub new_parent: Option<InstanceId>,
}

/// How [`Hierarchy::change_parents`](crate::Hierarchy::change_parents) treats
/// a pair that would make a node its own ancestor.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ConflictPolicy {
    /// Skip only the offending pair and keep applying the rest of the batch.
    #[default]
    SkipOffending,
    /// Validate the whole batch first and apply nothing if any pair would form a cycle.
    RejectBatch,
}
