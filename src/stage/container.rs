#![doc = r#"
Container [Q]: the scene-graph hierarchy. Parent/child links use
`Handle<Container>` rather than raw pointers (per DESIGN NOTES §9 on cyclic
references), and transform propagation walks the hierarchy applying
`math::Transformation::concatenate`.

Grounded on `original_source/source/Entity/Container/Container.c`'s
parent/child `VirtualList` links and its depth-first transform-propagation
recursion.
"#]

use crate::math::Transformation;
use crate::memory::{Handle, Registry};

pub struct Container {
    pub transformation: Transformation,
    parent: Option<Handle<Container>>,
    children: Vec<Handle<Container>>,
}

impl Container {
    fn new() -> Self {
        Container { transformation: Transformation::identity(), parent: None, children: Vec::new() }
    }

    pub fn parent(&self) -> Option<Handle<Container>> {
        self.parent
    }

    pub fn children(&self) -> &[Handle<Container>] {
        &self.children
    }
}

pub struct Stage {
    containers: Registry<Container>,
    roots: Vec<Handle<Container>>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    pub fn new() -> Self {
        Stage { containers: Registry::new(), roots: Vec::new() }
    }

    pub fn spawn_root(&mut self) -> Handle<Container> {
        let handle = self.containers.insert(Container::new());
        self.roots.push(handle);
        handle
    }

    /// Attaches a freshly spawned child under `parent`; detaches it from
    /// any previous parent first.
    pub fn attach(&mut self, parent: Handle<Container>, child: Handle<Container>) {
        self.detach(child);
        if let Some(parent_container) = self.containers.get_mut(parent) {
            parent_container.children.push(child);
        }
        if let Some(child_container) = self.containers.get_mut(child) {
            child_container.parent = Some(parent);
        }
        self.roots.retain(|r| *r != child);
    }

    pub fn spawn_child(&mut self, parent: Handle<Container>) -> Handle<Container> {
        let handle = self.containers.insert(Container::new());
        self.attach(parent, handle);
        handle
    }

    fn detach(&mut self, child: Handle<Container>) {
        if let Some(container) = self.containers.get(child) {
            if let Some(old_parent) = container.parent {
                if let Some(parent_container) = self.containers.get_mut(old_parent) {
                    parent_container.children.retain(|c| *c != child);
                }
            }
        }
    }

    /// Removes `handle` and, recursively, every descendant, freeing their
    /// registry slots (their handles then resolve to `None` forever, per
    /// `memory::Registry`'s generation bump).
    pub fn remove(&mut self, handle: Handle<Container>) {
        let children: Vec<Handle<Container>> = self.containers.get(handle).map(|c| c.children.clone()).unwrap_or_default();
        for child in children {
            self.remove(child);
        }
        self.detach(handle);
        self.containers.remove(handle);
        self.roots.retain(|r| *r != handle);
    }

    pub fn get(&self, handle: Handle<Container>) -> Option<&Container> {
        self.containers.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle<Container>) -> Option<&mut Container> {
        self.containers.get_mut(handle)
    }

    /// Propagates transforms depth-first from every root: each container's
    /// global transform is concatenated against its (already-clean) parent,
    /// recursing only into children — containers with a clean
    /// `Invalidity` are still visited (in case a descendant needs a fresh
    /// parent), but `concatenate` is a no-op on a clean child unless its
    /// own local state changed.
    pub fn propagate_transforms(&mut self) {
        let roots = self.roots.clone();
        for root in roots {
            self.propagate_from(root);
        }
    }

    fn propagate_from(&mut self, handle: Handle<Container>) {
        let Some(container) = self.containers.get_mut(handle) else { return };
        container.transformation.concatenate_as_root();
        let children = container.children.clone();
        for child in children {
            self.propagate_child(handle, child);
        }
    }

    fn propagate_child(&mut self, parent: Handle<Container>, child: Handle<Container>) {
        let parent_transform = match self.containers.get(parent) {
            Some(p) => p.transformation,
            None => return,
        };
        let Some(child_container) = self.containers.get_mut(child) else { return };
        child_container.transformation.concatenate(&parent_transform);
        let grandchildren = child_container.children.clone();
        for grandchild in grandchildren {
            self.propagate_child(child, grandchild);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3D;

    #[test]
    fn child_global_position_includes_parent_offset() {
        let mut stage = Stage::new();
        let parent = stage.spawn_root();
        let child = stage.spawn_child(parent);

        stage.get_mut(parent).unwrap().transformation.set_local_position(Vector3D::from_ints(10, 0, 0));
        stage.get_mut(child).unwrap().transformation.set_local_position(Vector3D::from_ints(5, 0, 0));

        stage.propagate_transforms();

        assert_eq!(stage.get(child).unwrap().transformation.global_position, Vector3D::from_ints(15, 0, 0));
    }

    #[test]
    fn removing_a_parent_removes_its_descendants() {
        let mut stage = Stage::new();
        let parent = stage.spawn_root();
        let child = stage.spawn_child(parent);
        let grandchild = stage.spawn_child(child);

        stage.remove(parent);

        assert!(stage.get(parent).is_none());
        assert!(stage.get(child).is_none());
        assert!(stage.get(grandchild).is_none());
    }

    #[test]
    fn reattaching_detaches_from_previous_parent() {
        let mut stage = Stage::new();
        let a = stage.spawn_root();
        let b = stage.spawn_root();
        let child = stage.spawn_child(a);

        stage.attach(b, child);

        assert!(!stage.get(a).unwrap().children().contains(&child));
        assert!(stage.get(b).unwrap().children().contains(&child));
    }

    #[test]
    fn propagation_reaches_three_generations() {
        let mut stage = Stage::new();
        let root = stage.spawn_root();
        let mid = stage.spawn_child(root);
        let leaf = stage.spawn_child(mid);

        stage.get_mut(root).unwrap().transformation.set_local_position(Vector3D::from_ints(1, 0, 0));
        stage.get_mut(mid).unwrap().transformation.set_local_position(Vector3D::from_ints(1, 0, 0));
        stage.get_mut(leaf).unwrap().transformation.set_local_position(Vector3D::from_ints(1, 0, 0));

        stage.propagate_transforms();

        assert_eq!(stage.get(leaf).unwrap().transformation.global_position, Vector3D::from_ints(3, 0, 0));
    }
}
