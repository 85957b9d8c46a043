// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchy basics.
//!
//! Mirror a small transform scene, walk it in pre-order to compose world
//! transforms, and query the subtree below a node.
//!
//! Run:
//! - `cargo run -p understory_hierarchy_demos --example hierarchy_basics`

use std::collections::HashMap;

use kurbo::{Affine, Point, Vec2};
use understory_hierarchy::{Hierarchy, InstanceId, NodeSource};

/// A node owned by the scene, with a local transform relative to its parent.
struct SceneNode {
    parent: Option<usize>,
    children: Vec<usize>,
    local: Affine,
}

#[derive(Default)]
struct Scene {
    nodes: Vec<SceneNode>,
}

impl Scene {
    fn spawn(&mut self, parent: Option<usize>, local: Affine) -> usize {
        let id = self.nodes.len();
        self.nodes.push(SceneNode {
            parent,
            children: Vec::new(),
            local,
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }
}

fn id_of(node: usize) -> InstanceId {
    InstanceId(i32::try_from(node).expect("scene ids fit in i32"))
}

impl NodeSource for Scene {
    type Node = usize;
    type Payload = Affine;

    fn instance_id(&self, node: &usize) -> InstanceId {
        id_of(*node)
    }

    fn parent_of(&self, node: &usize) -> Option<usize> {
        self.nodes[*node].parent
    }

    fn children_of(&self, node: &usize) -> impl Iterator<Item = usize> {
        self.nodes[*node].children.iter().copied()
    }

    fn payload(&self, node: &usize) -> Affine {
        self.nodes[*node].local
    }
}

fn main() {
    // window
    // ├── panel (translated)
    // │   ├── icon (scaled)
    // │   └── label
    // └── cursor
    let mut scene = Scene::default();
    let window = scene.spawn(None, Affine::IDENTITY);
    let panel = scene.spawn(Some(window), Affine::translate(Vec2::new(100.0, 50.0)));
    let icon = scene.spawn(Some(panel), Affine::scale(2.0));
    let label = scene.spawn(Some(panel), Affine::translate(Vec2::new(40.0, 0.0)));
    let cursor = scene.spawn(Some(window), Affine::translate(Vec2::new(5.0, 5.0)));

    let hierarchy = Hierarchy::build(&scene, [window]).unwrap();
    println!("{hierarchy:?}");

    // Pre-order guarantees a parent's world transform is known before its children.
    let mut world: HashMap<InstanceId, Affine> = HashMap::new();
    for root in hierarchy.roots() {
        world.insert(hierarchy.instance_id(root), *hierarchy.payload(root));
        for idx in hierarchy.descendants(root) {
            let parent = hierarchy.parent(idx).unwrap();
            let parent_world = world[&hierarchy.instance_id(parent)];
            world.insert(
                hierarchy.instance_id(idx),
                parent_world * *hierarchy.payload(idx),
            );
        }
    }

    for (name, node) in [("icon", icon), ("label", label), ("cursor", cursor)] {
        let id = id_of(node);
        let origin = world[&id] * Point::ORIGIN;
        let depth = hierarchy.depth(hierarchy.index_of(id).unwrap());
        println!("{name:>6}: depth {depth}, origin {origin:?}");
    }
    assert_eq!(world[&id_of(label)] * Point::ORIGIN, Point::new(140.0, 50.0));

    // Everything that must be recomputed when the panel moves.
    let mut dirty = Vec::new();
    hierarchy.collect_hierarchy_instance_ids([id_of(panel)], &mut dirty);
    println!("panel subtree: {dirty:?}");
    assert_eq!(dirty.len(), 3);
}
