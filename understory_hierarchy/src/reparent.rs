// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched reparenting driven by externally detected parent changes.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::ReparentError;
use crate::hierarchy::Hierarchy;
use crate::types::{AppliedParentChange, ConflictPolicy, INVALID, InstanceId, ParentChange};

/// A pair resolved against the store.
enum Resolved {
    /// Child is not tracked, or already sits under the requested parent.
    Skip,
    /// Move `child` under `parent` (raw slot, [`INVALID`] for a root).
    Move { child: u32, parent: u32 },
}

impl<P> Hierarchy<P> {
    /// Applies a batch of parent changes in order.
    ///
    /// For each pair:
    ///
    /// - a `child` that is not tracked is skipped;
    /// - a `new_parent` that is `None` or not tracked makes the child a root;
    /// - a pair whose resolved parent is already the child's parent is a no-op;
    /// - otherwise the child is detached and appended as the last child of its
    ///   new parent, and an [`AppliedParentChange`] is pushed onto `applied`.
    ///
    /// Pairs are resolved against the state left by the pairs before them.
    /// `applied` is appended to, never cleared, and lists exactly the moves
    /// that happened with the parent that actually took effect.
    ///
    /// A pair that would make a node its own ancestor is handled by `policy`.
    /// With [`ConflictPolicy::SkipOffending`] the pair is dropped and the batch
    /// continues. With [`ConflictPolicy::RejectBatch`] the batch is checked up
    /// front and, on the first offending pair, nothing is applied and
    /// [`ReparentError::Cycle`] is returned.
    pub fn change_parents(
        &mut self,
        changes: &[ParentChange],
        policy: ConflictPolicy,
        applied: &mut Vec<AppliedParentChange>,
    ) -> Result<(), ReparentError> {
        if policy == ConflictPolicy::RejectBatch {
            self.check_batch(changes)?;
        }

        let before = applied.len();
        for change in changes {
            let Resolved::Move { child, parent } = self.resolve(change, |i| self.parent[i as usize])
            else {
                continue;
            };
            if self.creates_cycle(child, parent, |i| self.parent[i as usize]) {
                tracing::warn!(
                    child = ?change.child,
                    new_parent = ?change.new_parent,
                    "reparent would create a cycle; skipped"
                );
                continue;
            }
            let old = self.unlink_parent(child);
            self.link_parent(child, parent);
            applied.push(AppliedParentChange {
                child: change.child,
                old_parent: self.id_of_raw(old),
                new_parent: self.id_of_raw(parent),
            });
        }
        tracing::debug!(
            requested = changes.len(),
            applied = applied.len() - before,
            "changed parents"
        );
        Ok(())
    }

    /// Dry-runs `changes` against an overlay of parent pointers.
    fn check_batch(&self, changes: &[ParentChange]) -> Result<(), ReparentError> {
        let mut overlay: HashMap<u32, u32> = HashMap::new();
        for change in changes {
            let parent_of = |i: u32| overlay.get(&i).copied().unwrap_or(self.parent[i as usize]);
            let Resolved::Move { child, parent } = self.resolve(change, parent_of) else {
                continue;
            };
            if self.creates_cycle(child, parent, parent_of) {
                return Err(ReparentError::Cycle {
                    child: change.child,
                    new_parent: self.instance_id[parent as usize],
                });
            }
            overlay.insert(child, parent);
        }
        Ok(())
    }

    fn resolve(&self, change: &ParentChange, parent_of: impl Fn(u32) -> u32) -> Resolved {
        let Some(child) = self.index_by_instance_id.get(&change.child).copied() else {
            tracing::trace!(child = ?change.child, "reparent of untracked node; skipped");
            return Resolved::Skip;
        };
        let parent = change
            .new_parent
            .and_then(|p: InstanceId| self.index_by_instance_id.get(&p).copied())
            .unwrap_or(INVALID);
        if parent == INVALID && change.new_parent.is_some() {
            tracing::trace!(
                child = ?change.child,
                new_parent = ?change.new_parent,
                "new parent not tracked; node becomes a root"
            );
        }
        if parent_of(child) == parent {
            return Resolved::Skip;
        }
        Resolved::Move { child, parent }
    }

    /// True if `parent` is `child` or one of its descendants.
    fn creates_cycle(&self, child: u32, parent: u32, parent_of: impl Fn(u32) -> u32) -> bool {
        let mut cur = parent;
        // A well-formed forest reaches a root in at most `len` steps.
        for _ in 0..=self.len() {
            if cur == INVALID {
                return false;
            }
            if cur == child {
                return true;
            }
            cur = parent_of(cur);
        }
        true
    }
}
