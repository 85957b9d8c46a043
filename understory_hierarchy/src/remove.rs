// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cascading subtree removal with swap-and-remap compaction.

use alloc::vec::Vec;

use crate::hierarchy::Hierarchy;
use crate::types::{INVALID, InstanceId, SlotIndex};

impl<P> Hierarchy<P> {
    /// Removes the nodes named by `ids` together with all of their descendants.
    ///
    /// Ids that are not tracked, or that were already removed as part of an
    /// earlier id's subtree in the same call, are ignored. The result does not
    /// depend on the order of `ids`, so a child may be listed before or after
    /// its own ancestor.
    ///
    /// The arrays are compacted by moving the last surviving slot into each
    /// hole, so indices of surviving slots can change. Cost is proportional to
    /// the number of removed slots plus the child lists touched, not to the
    /// size of the whole store.
    ///
    /// Returns the number of slots removed.
    pub fn remove<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = InstanceId>,
    {
        let mut doomed: Vec<u32> = Vec::new();
        let mut stack: Vec<u32> = Vec::new();
        for id in ids {
            // Marked slots leave the reverse index right away, so a later id
            // inside an already-marked subtree is not found again.
            let Some(root) = self.index_by_instance_id.remove(&id) else {
                continue;
            };
            self.unlink_parent(root);
            doomed.push(root);
            stack.push(root);
            while let Some(idx) = stack.pop() {
                for &c in &self.children[idx as usize] {
                    let removed = self.index_by_instance_id.remove(&self.instance_id[c as usize]);
                    debug_assert!(removed.is_some(), "descendant missing from reverse index");
                    doomed.push(c);
                    stack.push(c);
                }
            }
        }
        if doomed.is_empty() {
            return 0;
        }

        // Highest index first: every slot above the current hole is then a survivor.
        doomed.sort_unstable_by(|a, b| b.cmp(a));
        for &hole in &doomed {
            self.swap_remove_slot(hole);
        }
        tracing::debug!(removed = doomed.len(), remaining = self.len(), "removed subtrees");
        doomed.len()
    }

    /// Drops slot `hole` and moves the last slot into its place.
    ///
    /// The moved slot must be a survivor: its parent's child list, its
    /// children's parent pointers, and its reverse-index entry are patched.
    fn swap_remove_slot(&mut self, hole: u32) {
        let last = SlotIndex::from_usize(self.len() - 1).raw();
        if hole != last {
            let moved_parent = self.parent[last as usize];
            if moved_parent != INVALID {
                let siblings = &mut self.children[moved_parent as usize];
                let pos = siblings
                    .iter()
                    .position(|&c| c == last)
                    .expect("moved slot missing from its parent's child list");
                siblings[pos] = hole;
            }
            for &c in &self.children[last as usize] {
                self.parent[c as usize] = hole;
            }
            self.index_by_instance_id
                .insert(self.instance_id[last as usize], hole);
        }
        let hole = hole as usize;
        self.instance_id.swap_remove(hole);
        self.parent.swap_remove(hole);
        self.payload.swap_remove(hole);
        self.children.swap_remove(hole);
    }
}
