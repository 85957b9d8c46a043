// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feeding per-frame scene changes into a hierarchy.
//!
//! Each frame the scene reports spawned, destroyed, and reparented nodes. The
//! hierarchy is updated from those notifications alone, then the set of nodes
//! whose world transform must be recomputed is derived from the changed roots.
//!
//! Run:
//! - `cargo run -p understory_hierarchy_demos --example change_feed`

use std::collections::{BTreeSet, HashMap};

use kurbo::{Affine, Vec2};
use understory_hierarchy::{
    AppliedParentChange, ConflictPolicy, Hierarchy, InstanceId, NodeSource, ParentChange,
};

/// Index into the scene's transform table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct TransformHandle(usize);

struct SceneNode {
    parent: Option<InstanceId>,
    children: Vec<InstanceId>,
    transform: TransformHandle,
}

/// Owns nodes and transforms; destroyed ids are handed out again.
#[derive(Default)]
struct Scene {
    nodes: HashMap<InstanceId, SceneNode>,
    transforms: Vec<Affine>,
    free: Vec<InstanceId>,
    next: i32,
}

impl Scene {
    fn spawn(&mut self, parent: Option<InstanceId>, local: Affine) -> InstanceId {
        let id = self.free.pop().unwrap_or_else(|| {
            self.next += 1;
            InstanceId(self.next)
        });
        self.transforms.push(local);
        let transform = TransformHandle(self.transforms.len() - 1);
        self.nodes.insert(
            id,
            SceneNode {
                parent,
                children: Vec::new(),
                transform,
            },
        );
        if let Some(p) = parent {
            self.nodes.get_mut(&p).unwrap().children.push(id);
        }
        id
    }

    fn despawn(&mut self, id: InstanceId) {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = self.nodes.remove(&cur).unwrap();
            stack.extend(node.children);
            self.free.push(cur);
        }
    }

    fn reparent(&mut self, id: InstanceId, parent: Option<InstanceId>) {
        self.detach(id);
        self.nodes.get_mut(&id).unwrap().parent = parent;
        if let Some(p) = parent {
            self.nodes.get_mut(&p).unwrap().children.push(id);
        }
    }

    fn detach(&mut self, id: InstanceId) {
        if let Some(p) = self.nodes[&id].parent {
            self.nodes.get_mut(&p).unwrap().children.retain(|&c| c != id);
        }
    }
}

impl NodeSource for Scene {
    type Node = InstanceId;
    type Payload = TransformHandle;

    fn instance_id(&self, node: &InstanceId) -> InstanceId {
        *node
    }

    fn parent_of(&self, node: &InstanceId) -> Option<InstanceId> {
        self.nodes[node].parent
    }

    fn children_of(&self, node: &InstanceId) -> impl Iterator<Item = InstanceId> {
        self.nodes[node].children.iter().copied()
    }

    fn payload(&self, node: &InstanceId) -> TransformHandle {
        self.nodes[node].transform
    }
}

/// Recomputes world transforms for `dirty`, parents before children.
fn refresh_world(
    hierarchy: &Hierarchy<TransformHandle>,
    scene: &Scene,
    dirty: &BTreeSet<InstanceId>,
    world: &mut HashMap<InstanceId, Affine>,
) {
    let mut ordered: Vec<_> = dirty
        .iter()
        .filter_map(|&id| hierarchy.index_of(id))
        .collect();
    ordered.sort_by_key(|&idx| hierarchy.depth(idx));
    for idx in ordered {
        let local = scene.transforms[hierarchy.payload(idx).0];
        let parent_world = hierarchy
            .parent(idx)
            .map_or(Affine::IDENTITY, |p| world[&hierarchy.instance_id(p)]);
        world.insert(hierarchy.instance_id(idx), parent_world * local);
    }
}

fn main() {
    let mut scene = Scene::default();
    let stage = scene.spawn(None, Affine::IDENTITY);
    let left = scene.spawn(Some(stage), Affine::translate(Vec2::new(-100.0, 0.0)));
    let right = scene.spawn(Some(stage), Affine::translate(Vec2::new(100.0, 0.0)));
    let prop = scene.spawn(Some(left), Affine::translate(Vec2::new(0.0, 10.0)));
    let _ = scene.spawn(Some(prop), Affine::rotate(0.5));

    let mut hierarchy = Hierarchy::build(&scene, [stage]).unwrap();
    let mut world = HashMap::new();
    let mut everything = BTreeSet::new();
    hierarchy.collect_hierarchy_instance_ids([stage], &mut everything);
    refresh_world(&hierarchy, &scene, &everything, &mut world);

    // Frame 1: the prop moves from the left group to the right group.
    scene.reparent(prop, Some(right));
    let mut applied: Vec<AppliedParentChange> = Vec::new();
    hierarchy
        .change_parents(
            &[ParentChange::new(prop, Some(right))],
            ConflictPolicy::SkipOffending,
            &mut applied,
        )
        .unwrap();
    println!("frame 1 applied: {applied:?}");
    let mut dirty = BTreeSet::new();
    hierarchy.collect_hierarchy_instance_ids(applied.iter().map(|c| c.child), &mut dirty);
    refresh_world(&hierarchy, &scene, &dirty, &mut world);
    println!("frame 1 refreshed {} of {} nodes", dirty.len(), hierarchy.len());

    // Frame 2: the left group is destroyed, and a new node reuses its id.
    scene.despawn(left);
    let removed = hierarchy.remove([left]);
    // Ids can be recycled, so cached data keyed by them goes too.
    world.remove(&left);
    let spawned = scene.spawn(Some(stage), Affine::translate(Vec2::new(0.0, -50.0)));
    assert_eq!(spawned, left, "the scene recycled the id");
    let added = hierarchy.add_recurse(&scene, &spawned);
    let mut dirty = BTreeSet::new();
    hierarchy.collect_hierarchy_instance_ids([spawned], &mut dirty);
    refresh_world(&hierarchy, &scene, &dirty, &mut world);
    println!("frame 2 removed {removed}, added {added}");

    // Incremental refresh must agree with a full recompute.
    let mut full = HashMap::new();
    let mut everything = BTreeSet::new();
    hierarchy.collect_hierarchy_instance_ids([stage], &mut everything);
    refresh_world(&hierarchy, &scene, &everything, &mut full);
    assert_eq!(world, full);
    assert!(hierarchy.validate().is_ok());
    println!("{hierarchy:?}");
}
