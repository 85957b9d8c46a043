// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory external node system used by the unit tests.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::hierarchy::Hierarchy;
use crate::source::NodeSource;
use crate::types::InstanceId;

#[derive(Clone, Debug)]
struct SceneNode {
    parent: Option<InstanceId>,
    children: Vec<InstanceId>,
    payload: u32,
}

/// A mutable forest that owns its nodes and recycles destroyed ids.
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryScene {
    nodes: HashMap<InstanceId, SceneNode>,
    roots: Vec<InstanceId>,
    next_id: i32,
    free_ids: Vec<InstanceId>,
    next_payload: u32,
}

impl MemoryScene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates a node as the last child of `parent`, or as a new root.
    pub(crate) fn create(&mut self, parent: Option<InstanceId>) -> InstanceId {
        let id = self.free_ids.pop().unwrap_or_else(|| {
            self.next_id += 1;
            InstanceId(self.next_id)
        });
        self.next_payload += 1;
        self.nodes.insert(
            id,
            SceneNode {
                parent,
                children: Vec::new(),
                payload: self.next_payload * 10,
            },
        );
        self.attach(id, parent);
        id
    }

    /// Destroys `id` and its whole subtree, releasing their ids for reuse.
    pub(crate) fn destroy(&mut self, id: InstanceId) {
        self.detach(id);
        let mut stack = Vec::from([id]);
        while let Some(cur) = stack.pop() {
            let node = self.nodes.remove(&cur).expect("destroying unknown node");
            stack.extend(node.children);
            self.free_ids.push(cur);
        }
    }

    /// Moves `id` to the end of `parent`'s children, or makes it a root.
    pub(crate) fn reparent(&mut self, id: InstanceId, parent: Option<InstanceId>) {
        self.detach(id);
        self.nodes.get_mut(&id).expect("unknown node").parent = parent;
        self.attach(id, parent);
    }

    pub(crate) fn contains(&self, id: InstanceId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn roots(&self) -> Vec<InstanceId> {
        self.roots.clone()
    }

    pub(crate) fn parent_id(&self, id: InstanceId) -> Option<InstanceId> {
        self.nodes[&id].parent
    }

    pub(crate) fn payload_of(&self, id: InstanceId) -> u32 {
        self.nodes[&id].payload
    }

    pub(crate) fn children_ids(&self, id: InstanceId) -> Vec<InstanceId> {
        self.nodes[&id].children.clone()
    }

    /// Every node below `id` in depth-first pre-order, excluding `id`.
    pub(crate) fn descendants_preorder(&self, id: InstanceId) -> Vec<InstanceId> {
        let mut out = Vec::new();
        let mut stack: Vec<InstanceId> = self.nodes[&id].children.iter().rev().copied().collect();
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.nodes[&cur].children.iter().rev().copied());
        }
        out
    }

    /// All live ids, sorted.
    pub(crate) fn ids(&self) -> Vec<InstanceId> {
        let mut ids: Vec<_> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn attach(&mut self, id: InstanceId, parent: Option<InstanceId>) {
        match parent {
            Some(p) => self
                .nodes
                .get_mut(&p)
                .expect("unknown parent")
                .children
                .push(id),
            None => self.roots.push(id),
        }
    }

    fn detach(&mut self, id: InstanceId) {
        let parent = self.nodes[&id].parent;
        let list = match parent {
            Some(p) => &mut self.nodes.get_mut(&p).expect("unknown parent").children,
            None => &mut self.roots,
        };
        list.retain(|&c| c != id);
    }
}

impl NodeSource for MemoryScene {
    type Node = InstanceId;
    type Payload = u32;

    fn instance_id(&self, node: &InstanceId) -> InstanceId {
        *node
    }

    fn parent_of(&self, node: &InstanceId) -> Option<InstanceId> {
        self.nodes[node].parent
    }

    fn children_of(&self, node: &InstanceId) -> impl Iterator<Item = InstanceId> {
        self.nodes[node].children.iter().copied()
    }

    fn payload(&self, node: &InstanceId) -> u32 {
        self.nodes[node].payload
    }
}

/// Parent and ordered children of a tracked id, by instance id.
pub(crate) type Links = (Option<InstanceId>, Vec<InstanceId>);

/// Slot-independent picture of a hierarchy, keyed by instance id.
pub(crate) fn snapshot<P>(h: &Hierarchy<P>) -> BTreeMap<InstanceId, Links> {
    (0..h.len())
        .map(|i| {
            let idx = crate::SlotIndex::from_usize(i);
            let parent = h.parent(idx).map(|p| h.instance_id(p));
            let children = h.children(idx).map(|c| h.instance_id(c)).collect();
            (h.instance_id(idx), (parent, children))
        })
        .collect()
}

/// Asserts that `h` tracks exactly the scene's nodes with the same links,
/// child order, and payloads.
#[track_caller]
pub(crate) fn assert_mirrors(h: &Hierarchy<u32>, scene: &MemoryScene) {
    assert_eq!(h.len(), scene.len(), "slot count differs from scene");
    for id in scene.ids() {
        let idx = h
            .index_of(id)
            .unwrap_or_else(|| panic!("{id:?} is not tracked"));
        assert_eq!(h.parent_id(id), scene.parent_id(id), "parent of {id:?}");
        let children: Vec<_> = h.children(idx).map(|c| h.instance_id(c)).collect();
        assert_eq!(children, scene.children_ids(id), "children of {id:?}");
        assert_eq!(*h.payload(idx), scene.payload_of(id), "payload of {id:?}");
    }
}
