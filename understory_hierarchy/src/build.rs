// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Initial population from a set of external roots, and incremental additions.

use alloc::vec::Vec;

use crate::error::BuildError;
use crate::hierarchy::Hierarchy;
use crate::source::NodeSource;
use crate::types::{INVALID, InstanceId};

/// What to do when a walk reaches an id that already has a slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OnDuplicate {
    Fail,
    SkipSubtree,
}

impl<P> Hierarchy<P> {
    /// Builds a hierarchy from scratch by walking `roots` through `source`.
    ///
    /// Every root and its descendants are visited depth-first in pre-order and
    /// receive sequential slot indices in visitation order. Child lists follow
    /// the order of [`NodeSource::children_of`].
    ///
    /// Reaching the same instance id twice (for example by passing a node
    /// twice, or a root together with one of its descendants) is an error.
    /// The partially built store is dropped before returning.
    pub fn build<S, I>(source: &S, roots: I) -> Result<Self, BuildError>
    where
        S: NodeSource<Payload = P>,
        I: IntoIterator<Item = S::Node>,
    {
        let mut hierarchy = Self::new();
        let mut scratch = Vec::new();
        for root in roots {
            hierarchy.push_subtree(source, root, INVALID, OnDuplicate::Fail, &mut scratch)?;
        }
        tracing::debug!(slots = hierarchy.len(), "built hierarchy");
        Ok(hierarchy)
    }

    /// Adds exactly one slot for `node`.
    ///
    /// The node's parent is resolved with [`NodeSource::parent_of`]. A node
    /// without an external parent becomes a new root.
    ///
    /// Returns `false` without changing anything if `node` already has a slot
    /// or if its parent has none.
    pub fn try_add_single<S>(&mut self, source: &S, node: &S::Node) -> bool
    where
        S: NodeSource<Payload = P>,
    {
        let id = source.instance_id(node);
        if self.contains(id) {
            tracing::trace!(?id, "node already tracked; not added");
            return false;
        }
        let Some(parent) = self.resolve_external_parent(source, node) else {
            tracing::trace!(?id, "parent not tracked; not added");
            return false;
        };
        self.push_slot(id, parent, source.payload(node));
        true
    }

    /// Adds `node` and its whole subtree.
    ///
    /// Uses the same depth-first pre-order walk as [`build`](Self::build).
    /// Requires the same precondition as
    /// [`try_add_single`](Self::try_add_single): the node is new and its
    /// external parent is tracked, or it has none. New slots are appended, so
    /// existing slots keep their indices and child order.
    ///
    /// Descendants that already have a slot are skipped together with their
    /// subtrees. Returns the number of slots added, which is 0 when the
    /// precondition does not hold.
    pub fn add_recurse<S>(&mut self, source: &S, node: &S::Node) -> usize
    where
        S: NodeSource<Payload = P>,
    {
        let id = source.instance_id(node);
        if self.contains(id) {
            tracing::trace!(?id, "subtree root already tracked; not added");
            return 0;
        }
        let Some(parent) = self.resolve_external_parent(source, node) else {
            tracing::trace!(?id, "parent not tracked; subtree not added");
            return 0;
        };
        let before = self.len();
        let mut scratch = Vec::new();
        if let Err(e) = self.push_subtree(
            source,
            node.clone(),
            parent,
            OnDuplicate::SkipSubtree,
            &mut scratch,
        ) {
            unreachable!("skipping duplicates cannot fail: {e}");
        }
        let added = self.len() - before;
        tracing::debug!(?id, added, "added subtree");
        added
    }

    /// Raw slot of `node`'s external parent: [`INVALID`] for a root, `None`
    /// if the parent is not tracked.
    fn resolve_external_parent<S>(&self, source: &S, node: &S::Node) -> Option<u32>
    where
        S: NodeSource<Payload = P>,
    {
        match source.parent_of(node) {
            None => Some(INVALID),
            Some(p) => self
                .index_of(source.instance_id(&p))
                .map(|idx| idx.raw()),
        }
    }

    /// Appends `root` and its descendants in pre-order below `parent`.
    ///
    /// `scratch` is reused to reverse each child list onto the stack.
    fn push_subtree<S>(
        &mut self,
        source: &S,
        root: S::Node,
        parent: u32,
        on_duplicate: OnDuplicate,
        scratch: &mut Vec<S::Node>,
    ) -> Result<(), BuildError>
    where
        S: NodeSource<Payload = P>,
    {
        let mut stack = Vec::new();
        stack.push((root, parent));
        while let Some((node, parent)) = stack.pop() {
            let id: InstanceId = source.instance_id(&node);
            if self.contains(id) {
                match on_duplicate {
                    OnDuplicate::Fail => return Err(BuildError::DuplicateInstanceId(id)),
                    OnDuplicate::SkipSubtree => {
                        tracing::trace!(?id, "descendant already tracked; skipping its subtree");
                        continue;
                    }
                }
            }
            let idx = self.push_slot(id, parent, source.payload(&node));
            scratch.clear();
            scratch.extend(source.children_of(&node));
            // Reverse so the first child is popped first.
            stack.extend(scratch.drain(..).rev().map(|child| (child, idx)));
        }
        Ok(())
    }
}
