// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays storage for the mirrored hierarchy, lookups, and invariant checks.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::InvariantViolation;
use crate::traverse::{Ancestors, Children, Descendants, HierarchyView};
use crate::types::{INVALID, InstanceId, SlotIndex};

/// Flat index of an externally owned node hierarchy.
///
/// Each live external node occupies one slot in a set of parallel arrays. The
/// slot's position is its [`SlotIndex`]. The store also keeps a reverse index
/// from [`InstanceId`] to slot and an ordered child list per slot.
///
/// `P` is the opaque payload stored per slot (see [`NodeSource::Payload`](crate::NodeSource::Payload)).
///
/// All mutation goes through [`build`](Self::build), [`remove`](Self::remove),
/// [`try_add_single`](Self::try_add_single), [`add_recurse`](Self::add_recurse),
/// and [`change_parents`](Self::change_parents). Each leaves the store
/// satisfying the invariants checked by [`validate`](Self::validate).
#[derive(Clone)]
pub struct Hierarchy<P> {
    // -- Slots --
    pub(crate) instance_id: Vec<InstanceId>,
    pub(crate) parent: Vec<u32>,
    pub(crate) payload: Vec<P>,
    pub(crate) children: Vec<Vec<u32>>,

    // -- Reverse index --
    pub(crate) index_by_instance_id: HashMap<InstanceId, u32>,
}

impl<P> Default for Hierarchy<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> core::fmt::Debug for Hierarchy<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let roots = self.parent.iter().filter(|&&p| p == INVALID).count();
        f.debug_struct("Hierarchy")
            .field("slots", &self.instance_id.len())
            .field("roots", &roots)
            .field("reverse_index", &self.index_by_instance_id.len())
            .finish_non_exhaustive()
    }
}

impl<P> Hierarchy<P> {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            instance_id: Vec::new(),
            parent: Vec::new(),
            payload: Vec::new(),
            children: Vec::new(),
            index_by_instance_id: HashMap::new(),
        }
    }

    /// Creates an empty hierarchy with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instance_id: Vec::with_capacity(capacity),
            parent: Vec::with_capacity(capacity),
            payload: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity),
            index_by_instance_id: HashMap::with_capacity(capacity),
        }
    }

    /// Number of live slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.instance_id.len()
    }

    /// True if no slots are live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instance_id.is_empty()
    }

    /// Returns true if `id` has a slot.
    pub fn contains(&self, id: InstanceId) -> bool {
        self.index_by_instance_id.contains_key(&id)
    }

    /// Returns the slot currently holding `id`.
    pub fn index_of(&self, id: InstanceId) -> Option<SlotIndex> {
        self.index_by_instance_id.get(&id).copied().map(SlotIndex::new)
    }

    /// Returns the instance id stored in `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn instance_id(&self, idx: SlotIndex) -> InstanceId {
        self.instance_id[idx.get()]
    }

    /// Returns the parent slot of `idx`, or `None` for a root.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn parent(&self, idx: SlotIndex) -> Option<SlotIndex> {
        let p = self.parent[idx.get()];
        (p != INVALID).then_some(SlotIndex::new(p))
    }

    /// Returns the instance id of the parent of `id`, if `id` is tracked and not a root.
    pub fn parent_id(&self, id: InstanceId) -> Option<InstanceId> {
        let idx = self.index_of(id)?;
        self.parent(idx).map(|p| self.instance_id(p))
    }

    /// Returns the payload stored in `idx`.
    ///
    /// The payload is captured when the slot is created. Structural operations
    /// move it with its slot but never refresh it from the external system.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn payload(&self, idx: SlotIndex) -> &P {
        &self.payload[idx.get()]
    }

    /// Replaces the payload stored in `idx`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn set_payload(&mut self, idx: SlotIndex, payload: P) -> P {
        core::mem::replace(&mut self.payload[idx.get()], payload)
    }

    /// Returns a read-only view suitable for sharing with concurrent readers.
    #[inline]
    pub fn as_read_only(&self) -> HierarchyView<'_, P> {
        HierarchyView::new(self)
    }

    /// Iterates the direct children of `idx` in discovery order.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn children(&self, idx: SlotIndex) -> Children<'_> {
        self.as_read_only().children(idx)
    }

    /// Iterates every descendant of `idx` in depth-first pre-order, excluding `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn descendants(&self, idx: SlotIndex) -> Descendants<'_> {
        self.as_read_only().descendants(idx)
    }

    /// Iterates the ancestors of `idx`, nearest first, excluding `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn ancestors(&self, idx: SlotIndex) -> Ancestors<'_> {
        self.as_read_only().ancestors(idx)
    }

    /// Number of ancestors of `idx` (0 for a root).
    pub fn depth(&self, idx: SlotIndex) -> usize {
        self.ancestors(idx).count()
    }

    /// Iterates the root slots in slot order.
    pub fn roots(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.as_read_only().roots()
    }

    /// Inserts the ids of `roots` and all of their descendants into `visited`.
    ///
    /// See [`HierarchyView::collect_hierarchy_instance_ids`].
    pub fn collect_hierarchy_instance_ids<I, E>(&self, roots: I, visited: &mut E)
    where
        I: IntoIterator<Item = InstanceId>,
        E: Extend<InstanceId>,
    {
        self.as_read_only()
            .collect_hierarchy_instance_ids(roots, visited);
    }

    /// Removes every slot, keeping allocated capacity.
    pub fn clear(&mut self) {
        self.instance_id.clear();
        self.parent.clear();
        self.payload.clear();
        self.children.clear();
        self.index_by_instance_id.clear();
    }

    /// Releases excess capacity held by the backing collections.
    pub fn shrink_to_fit(&mut self) {
        self.instance_id.shrink_to_fit();
        self.parent.shrink_to_fit();
        self.payload.shrink_to_fit();
        self.children.shrink_to_fit();
        for list in &mut self.children {
            list.shrink_to_fit();
        }
        self.index_by_instance_id.shrink_to_fit();
    }

    /// Checks every structural invariant of the store.
    ///
    /// This walks the whole store and is meant for tests and debugging.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let n = self.instance_id.len();
        if self.parent.len() != n || self.payload.len() != n || self.children.len() != n {
            return Err(InvariantViolation::LengthMismatch);
        }
        if self.index_by_instance_id.len() != n {
            return Err(InvariantViolation::ReverseIndexSize {
                entries: self.index_by_instance_id.len(),
                slots: n,
            });
        }
        for (i, &id) in self.instance_id.iter().enumerate() {
            let slot = SlotIndex::from_usize(i);
            if self.index_by_instance_id.get(&id).copied() != Some(slot.raw()) {
                return Err(InvariantViolation::ReverseIndexMismatch { slot, id });
            }
            let p = self.parent[i];
            if p == INVALID {
                continue;
            }
            let Some(siblings) = self.children.get(p as usize) else {
                return Err(InvariantViolation::DanglingParent { slot });
            };
            let count = siblings.iter().filter(|&&c| c == slot.raw()).count();
            if count != 1 {
                return Err(InvariantViolation::ChildListCount { slot, count });
            }
        }
        for (i, list) in self.children.iter().enumerate() {
            for &c in list {
                if self.parent.get(c as usize).copied() != Some(SlotIndex::from_usize(i).raw()) {
                    return Err(InvariantViolation::StrayChild {
                        parent: SlotIndex::from_usize(i),
                        child: SlotIndex::new(c),
                    });
                }
            }
        }
        for i in 0..n {
            let mut steps = 0;
            let mut cur = self.parent[i];
            while cur != INVALID {
                steps += 1;
                if steps > n {
                    return Err(InvariantViolation::Cycle { slot: SlotIndex::from_usize(i) });
                }
                cur = self.parent[cur as usize];
            }
        }
        Ok(())
    }

    // --- internals ---

    /// Appends a slot and links it under `parent` (or as a root for [`INVALID`]).
    pub(crate) fn push_slot(&mut self, id: InstanceId, parent: u32, payload: P) -> u32 {
        let idx = u32::try_from(self.instance_id.len())
            .ok()
            .filter(|&idx| idx != INVALID)
            .expect("hierarchy slot count exceeds u32 range");
        self.instance_id.push(id);
        self.parent.push(parent);
        self.payload.push(payload);
        self.children.push(Vec::new());
        self.index_by_instance_id.insert(id, idx);
        if parent != INVALID {
            self.children[parent as usize].push(idx);
        }
        idx
    }

    /// Removes `idx` from its parent's child list and makes it a root.
    ///
    /// Returns the former parent.
    pub(crate) fn unlink_parent(&mut self, idx: u32) -> u32 {
        let p = self.parent[idx as usize];
        if p != INVALID {
            let siblings = &mut self.children[p as usize];
            if let Some(pos) = siblings.iter().position(|&c| c == idx) {
                siblings.remove(pos);
            }
            self.parent[idx as usize] = INVALID;
        }
        p
    }

    /// Appends `idx` as the last child of `parent`. `idx` must be a root.
    pub(crate) fn link_parent(&mut self, idx: u32, parent: u32) {
        debug_assert_eq!(self.parent[idx as usize], INVALID, "slot is already linked");
        self.parent[idx as usize] = parent;
        if parent != INVALID {
            self.children[parent as usize].push(idx);
        }
    }

    /// Instance id of a raw parent value, `None` for the sentinel.
    pub(crate) fn id_of_raw(&self, idx: u32) -> Option<InstanceId> {
        (idx != INVALID).then(|| self.instance_id[idx as usize])
    }
}
