// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_hierarchy --heading-base-level=0

//! Understory Hierarchy: a flat, incrementally maintained index of an externally owned node hierarchy.
//!
//! Scene graphs, entity trees, and document models often own their nodes in a
//! pointer-linked graph that is expensive to walk. Systems that reprocess
//! "everything under the nodes that changed" every frame need a cheaper picture
//! of that graph: which node is whose parent, in which order children appear,
//! and which slot a given external id lives in right now.
//!
//! [`Hierarchy`] keeps that picture in parallel arrays and updates it in
//! response to explicit notifications. It never walks the external graph on
//! its own.
//!
//! - Cost proportional to the touched subtree for adding, removing, and reparenting.
//! - Lookup from external [`InstanceId`] to internal [`SlotIndex`] at all times.
//! - Batched removal that does not care whether a child is listed before or after its parent.
//! - Depth-first descendant enumeration that matches the external traversal order.
//!
//! ## Not an owner
//!
//! The external system owns node lifetimes and payloads. This crate stores one
//! opaque payload per slot (a transform handle, an entity key) and never looks
//! inside it. External ids may be recycled after a node is destroyed: once an
//! id has been passed to [`Hierarchy::remove`], any cache keyed by it belongs
//! to the caller to drop.
//!
//! ## API overview
//!
//! - [`NodeSource`]: what the external system must provide (id, parent, ordered children, payload).
//! - [`Hierarchy`]: the store. Built with [`Hierarchy::build`], kept in sync with
//!   [`Hierarchy::try_add_single`], [`Hierarchy::add_recurse`], [`Hierarchy::remove`],
//!   and [`Hierarchy::change_parents`].
//! - [`HierarchyView`]: a `Copy` read-only view from [`Hierarchy::as_read_only`] for
//!   concurrent readers.
//! - [`ParentChange`] / [`AppliedParentChange`]: requested and performed parent changes.
//! - [`ConflictPolicy`]: how a reparent batch handles a pair that would form a cycle.
//!
//! Slot indices are renumbered by [`Hierarchy::remove`]. Hold on to [`InstanceId`]s and
//! resolve them with [`Hierarchy::index_of`] after each mutation.
//!
//! ## Example
//!
//! ```rust
//! use understory_hierarchy::{
//!     ConflictPolicy, Hierarchy, InstanceId, NodeSource, ParentChange,
//! };
//!
//! /// Parent pointers and ordered children, indexed by id.
//! struct Scene {
//!     parent: Vec<Option<usize>>,
//!     children: Vec<Vec<usize>>,
//! }
//!
//! impl NodeSource for Scene {
//!     type Node = usize;
//!     type Payload = &'static str;
//!
//!     fn instance_id(&self, node: &usize) -> InstanceId {
//!         InstanceId(i32::try_from(*node).unwrap())
//!     }
//!     fn parent_of(&self, node: &usize) -> Option<usize> {
//!         self.parent[*node]
//!     }
//!     fn children_of(&self, node: &usize) -> impl Iterator<Item = usize> {
//!         self.children[*node].iter().copied()
//!     }
//!     fn payload(&self, _node: &usize) -> &'static str {
//!         "transform"
//!     }
//! }
//!
//! // 0
//! // ├── 1
//! // │   └── 3
//! // └── 2
//! let scene = Scene {
//!     parent: vec![None, Some(0), Some(0), Some(1)],
//!     children: vec![vec![1, 2], vec![3], vec![], vec![]],
//! };
//! let mut h = Hierarchy::build(&scene, [0]).unwrap();
//! assert_eq!(h.len(), 4);
//!
//! // Everything under node 1, including itself.
//! let mut dirty = Vec::new();
//! h.collect_hierarchy_instance_ids([InstanceId(1)], &mut dirty);
//! assert_eq!(dirty, [InstanceId(1), InstanceId(3)]);
//!
//! // Node 3 moved under node 2 in the external system.
//! let mut applied = Vec::new();
//! h.change_parents(
//!     &[ParentChange::new(InstanceId(3), Some(InstanceId(2)))],
//!     ConflictPolicy::SkipOffending,
//!     &mut applied,
//! )
//! .unwrap();
//! assert_eq!(applied[0].old_parent, Some(InstanceId(1)));
//! assert_eq!(h.parent_id(InstanceId(3)), Some(InstanceId(2)));
//!
//! // Node 2 was destroyed with its subtree.
//! assert_eq!(h.remove([InstanceId(2)]), 2);
//! assert!(!h.contains(InstanceId(3)));
//! assert!(h.validate().is_ok());
//! ```
//!
//! This crate is `no_std` and uses `alloc`. Diagnostics are emitted through
//! [`tracing`]; install a subscriber to see them.

#![no_std]

extern crate alloc;

mod build;
mod error;
mod hierarchy;
mod remove;
mod reparent;
mod source;
mod traverse;
mod types;

#[cfg(test)]
mod test_scene;

pub use error::{BuildError, InvariantViolation, ReparentError};
pub use hierarchy::Hierarchy;
pub use source::NodeSource;
pub use traverse::{Ancestors, Children, Descendants, HierarchyView};
pub use types::{AppliedParentChange, ConflictPolicy, InstanceId, ParentChange, SlotIndex};
