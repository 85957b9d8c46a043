// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only view and traversal iterators.

use alloc::vec;
use alloc::vec::Vec;
use core::slice;

use crate::hierarchy::Hierarchy;
use crate::types::{INVALID, InstanceId, SlotIndex};

/// Immutable view of a [`Hierarchy`].
///
/// Obtained from [`Hierarchy::as_read_only`]. The view is `Copy` and can be
/// handed to any number of readers, including other threads when the payload
/// type is `Sync`. The borrow keeps mutators out until every view is gone.
pub struct HierarchyView<'a, P> {
    inner: &'a Hierarchy<P>,
}

impl<P> Clone for HierarchyView<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for HierarchyView<'_, P> {}

impl<P> core::fmt::Debug for HierarchyView<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("HierarchyView").field(self.inner).finish()
    }
}

impl<'a, P> HierarchyView<'a, P> {
    pub(crate) fn new(inner: &'a Hierarchy<P>) -> Self {
        Self { inner }
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if no slots are live.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the slot currently holding `id`.
    pub fn index_of(&self, id: InstanceId) -> Option<SlotIndex> {
        self.inner.index_of(id)
    }

    /// Returns the instance id stored in `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn instance_id(&self, idx: SlotIndex) -> InstanceId {
        self.inner.instance_id(idx)
    }

    /// Returns the parent slot of `idx`, or `None` for a root.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn parent(&self, idx: SlotIndex) -> Option<SlotIndex> {
        self.inner.parent(idx)
    }

    /// Returns the payload stored in `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn payload(&self, idx: SlotIndex) -> &'a P {
        &self.inner.payload[idx.get()]
    }

    /// Iterates the direct children of `idx` in discovery order.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn children(&self, idx: SlotIndex) -> Children<'a> {
        Children {
            iter: self.inner.children[idx.get()].iter(),
        }
    }

    /// Iterates every descendant of `idx` in depth-first pre-order, excluding `idx`.
    ///
    /// This is the order an external "all nodes under this one, excluding
    /// itself" traversal produces.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn descendants(&self, idx: SlotIndex) -> Descendants<'a> {
        Descendants {
            children: &self.inner.children,
            stack: vec![self.inner.children[idx.get()].iter()],
        }
    }

    /// Iterates the ancestors of `idx`, nearest first, excluding `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn ancestors(&self, idx: SlotIndex) -> Ancestors<'a> {
        Ancestors {
            parent: &self.inner.parent,
            current: self.inner.parent[idx.get()],
        }
    }

    /// Iterates the root slots in slot order.
    pub fn roots(&self) -> impl Iterator<Item = SlotIndex> + use<'a, P> {
        self.inner
            .parent
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == INVALID)
            .map(|(i, _)| SlotIndex::from_usize(i))
    }

    /// Inserts the ids of `roots` and all of their descendants into `visited`.
    ///
    /// Expands a handful of "something changed here" ids into the full set of
    /// ids that need reprocessing without walking the external graph. Ids that
    /// are not tracked contribute nothing.
    pub fn collect_hierarchy_instance_ids<I, E>(&self, roots: I, visited: &mut E)
    where
        I: IntoIterator<Item = InstanceId>,
        E: Extend<InstanceId>,
    {
        for root in roots {
            let Some(idx) = self.index_of(root) else {
                continue;
            };
            visited.extend(core::iter::once(root));
            visited.extend(self.descendants(idx).map(|d| self.instance_id(d)));
        }
    }
}

/// Iterator over the direct children of a slot.
///
/// Created by [`HierarchyView::children`]. Clone it to restart.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    iter: slice::Iter<'a, u32>,
}

impl Iterator for Children<'_> {
    type Item = SlotIndex;

    fn next(&mut self) -> Option<SlotIndex> {
        self.iter.next().map(|&c| SlotIndex::new(c))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<SlotIndex> {
        self.iter.next_back().map(|&c| SlotIndex::new(c))
    }
}

/// Depth-first pre-order iterator over the descendants of a slot.
///
/// Created by [`HierarchyView::descendants`]. Clone it to restart.
#[derive(Clone, Debug)]
pub struct Descendants<'a> {
    children: &'a [Vec<u32>],
    stack: Vec<slice::Iter<'a, u32>>,
}

impl Iterator for Descendants<'_> {
    type Item = SlotIndex;

    fn next(&mut self) -> Option<SlotIndex> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(&c) => {
                    self.stack.push(self.children[c as usize].iter());
                    return Some(SlotIndex::new(c));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Iterator over the ancestors of a slot, nearest first.
///
/// Created by [`HierarchyView::ancestors`].
#[derive(Clone, Debug)]
pub struct Ancestors<'a> {
    parent: &'a [u32],
    current: u32,
}

impl Iterator for Ancestors<'_> {
    type Item = SlotIndex;

    fn next(&mut self) -> Option<SlotIndex> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.parent[idx as usize];
        Some(SlotIndex::new(idx))
    }
}
