// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for malformed caller input and invariant checks.
//!
//! Expected, recoverable conditions (a node whose parent is not tracked, a
//! reparent request for an unknown child) are reported through return values
//! instead. See [`Hierarchy::try_add_single`](crate::Hierarchy::try_add_single)
//! and [`Hierarchy::change_parents`](crate::Hierarchy::change_parents).

use crate::types::{InstanceId, SlotIndex};

/// Failure of [`Hierarchy::build`](crate::Hierarchy::build).
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// The same instance id was reached twice while walking the roots.
    #[error("instance id {0:?} was visited more than once")]
    DuplicateInstanceId(InstanceId),
}

/// Failure of [`Hierarchy::change_parents`](crate::Hierarchy::change_parents)
/// under [`ConflictPolicy::RejectBatch`](crate::ConflictPolicy::RejectBatch).
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ReparentError {
    /// Moving `child` under `new_parent` would make `child` its own ancestor.
    #[error("moving {child:?} under {new_parent:?} would create a cycle")]
    Cycle {
        /// Node the offending pair tried to move.
        child: InstanceId,
        /// Requested parent.
        new_parent: InstanceId,
    },
}

/// A structural invariant that [`Hierarchy::validate`](crate::Hierarchy::validate) found broken.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// The parallel arrays have different lengths.
    #[error("parallel arrays disagree on length")]
    LengthMismatch,
    /// The reverse index has a different number of entries than there are slots.
    #[error("reverse index holds {entries} entries for {slots} slots")]
    ReverseIndexSize {
        /// Entries in the reverse index.
        entries: usize,
        /// Live slots.
        slots: usize,
    },
    /// The reverse index does not map a slot's id back to that slot.
    #[error("reverse index does not map {id:?} to {slot:?}")]
    ReverseIndexMismatch {
        /// Slot whose id is mis-mapped.
        slot: SlotIndex,
        /// The slot's instance id.
        id: InstanceId,
    },
    /// A parent pointer refers past the end of the arrays.
    #[error("{slot:?} points at a parent slot that does not exist")]
    DanglingParent {
        /// Slot with the bad pointer.
        slot: SlotIndex,
    },
    /// A child does not appear exactly once in its parent's child list.
    #[error("{slot:?} appears {count} times in its parent's child list")]
    ChildListCount {
        /// The child slot.
        slot: SlotIndex,
        /// Number of occurrences found.
        count: usize,
    },
    /// A child list names a slot whose parent pointer disagrees.
    #[error("{parent:?} lists {child:?} as a child but the child points elsewhere")]
    StrayChild {
        /// Owner of the child list.
        parent: SlotIndex,
        /// Listed child.
        child: SlotIndex,
    },
    /// Following parent pointers from a slot never reaches a root.
    #[error("parent chain from {slot:?} does not reach a root")]
    Cycle {
        /// Slot whose ancestor chain loops.
        slot: SlotIndex,
    },
}
