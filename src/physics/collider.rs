#![doc = r#"
Collider [M]: AABB cuboid shapes, broad/narrow-phase collision dispatch, and
deferred destruction during iteration (§4.K).

Grounded on `original_source/source/Component/Collider/ColliderManager.c`:
the `deleteMe` deferred-removal flag, the `dirty`-on-add-during-dispatch
restart, and the generation stamp that caches world position once per
dispatch pass rather than recomputing it for every pairwise test.
"#]

use crate::math::{Fix13, Vector3D};
use crate::messaging::{EventCode, ObjectId};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Layers: u16 {
        const LAYER_0 = 1 << 0;
        const LAYER_1 = 1 << 1;
        const LAYER_2 = 1 << 2;
        const LAYER_3 = 1 << 3;
        const LAYER_4 = 1 << 4;
        const LAYER_5 = 1 << 5;
        const LAYER_6 = 1 << 6;
        const LAYER_7 = 1 << 7;
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CollisionAxis: u8 {
        const X = 0b001;
        const Y = 0b010;
        const Z = 0b100;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cuboid {
    pub half_extent: Vector3D,
}

impl Cuboid {
    /// Six-sided AABB overlap test between two cuboids centered at `a_pos`
    /// and `b_pos`.
    fn overlaps(&self, a_pos: Vector3D, other: &Cuboid, b_pos: Vector3D) -> bool {
        (a_pos.x - b_pos.x).abs() < self.half_extent.x + other.half_extent.x
            && (a_pos.y - b_pos.y).abs() < self.half_extent.y + other.half_extent.y
            && (a_pos.z - b_pos.z).abs() < self.half_extent.z + other.half_extent.z
    }

    fn max_extent_squared(&self, other: &Cuboid) -> crate::math::Fix13 {
        let a = self.half_extent.x.max(self.half_extent.y).max(self.half_extent.z);
        let b = other.half_extent.x.max(other.half_extent.y).max(other.half_extent.z);
        let sum = a + b;
        sum.mul(sum)
    }
}

pub struct Collider {
    pub owner: ObjectId,
    pub shape: Cuboid,
    pub layers: Layers,
    pub layers_to_ignore: Layers,
    pub local_displacement: Vector3D,
    pub checks_for_collisions: bool,
    pub enabled: bool,
    pub delete_me: bool,
    world_position: Vector3D,
    position_generation: u64,
}

impl Collider {
    pub fn new(owner: ObjectId, shape: Cuboid) -> Self {
        Collider {
            owner,
            shape,
            layers: Layers::empty(),
            layers_to_ignore: Layers::empty(),
            local_displacement: Vector3D::ZERO,
            checks_for_collisions: true,
            enabled: true,
            delete_me: false,
            world_position: Vector3D::ZERO,
            position_generation: 0,
        }
    }

    /// Recomputes `world_position` from `owner_position` only if it hasn't
    /// already been refreshed for this dispatch `generation`.
    fn refresh_world_position(&mut self, owner_position: Vector3D, generation: u64) {
        if self.position_generation != generation {
            self.world_position = owner_position + self.local_displacement;
            self.position_generation = generation;
        }
    }

    pub fn world_position(&self) -> Vector3D {
        self.world_position
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum PairState {
    None,
    Colliding,
}

pub struct CollisionInformation {
    pub collider_owner: ObjectId,
    pub other_collider_owner: ObjectId,
}

pub struct ColliderManager {
    colliders: Vec<Collider>,
    pair_states: std::collections::HashMap<(usize, usize), PairState>,
    generation: u64,
    dirty: bool,
}

impl Default for ColliderManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ColliderManager {
    pub fn new() -> Self {
        ColliderManager { colliders: Vec::new(), pair_states: std::collections::HashMap::new(), generation: 0, dirty: false }
    }

    /// Adds a collider. If called during `dispatch`, sets `dirty` so the
    /// caller's dispatch loop restarts its inner iteration, per §4.K.
    pub fn add(&mut self, collider: Collider, during_dispatch: bool) -> usize {
        self.colliders.push(collider);
        if during_dispatch {
            self.dirty = true;
        }
        self.colliders.len() - 1
    }

    pub fn mark_for_deletion(&mut self, index: usize) {
        if let Some(c) = self.colliders.get_mut(index) {
            c.delete_me = true;
        }
    }

    pub fn collider(&self, index: usize) -> Option<&Collider> {
        self.colliders.get(index)
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Runs one collision-detection pass: drops deleted colliders,
    /// recomputes world positions once per generation, and dispatches
    /// start/persist/end events for every enabled, colliding pair whose
    /// layer masks don't exclude them and who don't share an owner.
    ///
    /// `owner_position` resolves a collider's owning entity's world
    /// position; `dispatch` is called with (start|persists|end, a, b).
    pub fn update(
        &mut self,
        mut owner_position: impl FnMut(ObjectId) -> Vector3D,
        mut dispatch: impl FnMut(EventCode, &CollisionInformation),
    ) {
        self.generation += 1;
        self.colliders.retain(|c| !c.delete_me);

        let n = self.colliders.len();
        for i in 0..n {
            let pos = owner_position(self.colliders[i].owner);
            let generation = self.generation;
            self.colliders[i].refresh_world_position(pos, generation);
        }

        let mut seen = std::collections::HashSet::new();

        for i in 0..n {
            if !self.colliders[i].enabled || !self.colliders[i].checks_for_collisions {
                continue;
            }
            for j in 0..n {
                if i == j || !self.colliders[j].enabled {
                    continue;
                }
                let (a, b) = (&self.colliders[i], &self.colliders[j]);
                if a.owner == b.owner {
                    continue;
                }
                if a.layers_to_ignore.intersects(b.layers) {
                    continue;
                }

                let dx = a.world_position - b.world_position;
                let dist_sq = dx.squared_length();
                if dist_sq > a.shape.max_extent_squared(&b.shape) {
                    continue;
                }

                let key = if i < j { (i, j) } else { (j, i) };
                seen.insert(key);

                let colliding = a.shape.overlaps(a.world_position, &b.shape, b.world_position);
                let previous = self.pair_states.get(&key).copied().unwrap_or(PairState::None);

                let info = CollisionInformation { collider_owner: a.owner, other_collider_owner: b.owner };
                match (previous, colliding) {
                    (PairState::None, true) => dispatch(EventCode::CollisionStart, &info),
                    (PairState::Colliding, true) => dispatch(EventCode::CollisionPersists, &info),
                    (PairState::Colliding, false) => dispatch(EventCode::CollisionEnd, &info),
                    (PairState::None, false) => {}
                }

                if colliding {
                    self.pair_states.insert(key, PairState::Colliding);
                } else {
                    self.pair_states.remove(&key);
                }
            }
        }

        self.pair_states.retain(|key, _| seen.contains(key));
    }

    /// Sweeps small fractional displacements back along `last_motion` from
    /// the current (overlapping) positions of colliders `a_index`/`b_index`
    /// and re-tests per axis to find which axis first produced the
    /// overlap, returning a bitmask of all axes that do (§4.K
    /// "axis-of-collision resolution").
    pub fn resolve_collision_axis(&self, a_index: usize, b_index: usize, last_motion: Vector3D) -> CollisionAxis {
        let Some(a) = self.colliders.get(a_index) else { return CollisionAxis::empty() };
        let Some(b) = self.colliders.get(b_index) else { return CollisionAxis::empty() };

        const STEPS: i32 = 8;
        let mut axis = CollisionAxis::empty();

        for step in 1..=STEPS {
            let fraction = Fix13::from_f32(step as f32 / STEPS as f32);
            let back = last_motion.scale(fraction);

            let a_pos_x = Vector3D::new(a.world_position.x - back.x, a.world_position.y, a.world_position.z);
            if !a.shape.overlaps(a_pos_x, &b.shape, b.world_position) {
                axis.insert(CollisionAxis::X);
            }
            let a_pos_y = Vector3D::new(a.world_position.x, a.world_position.y - back.y, a.world_position.z);
            if !a.shape.overlaps(a_pos_y, &b.shape, b.world_position) {
                axis.insert(CollisionAxis::Y);
            }
            let a_pos_z = Vector3D::new(a.world_position.x, a.world_position.y, a.world_position.z - back.z);
            if !a.shape.overlaps(a_pos_z, &b.shape, b.world_position) {
                axis.insert(CollisionAxis::Z);
            }

            if !axis.is_empty() {
                break;
            }
        }

        axis
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fix13;

    fn cuboid(half: i32) -> Cuboid {
        Cuboid { half_extent: Vector3D::from_ints(half, half, half) }
    }

    #[test]
    fn overlapping_colliders_fire_collision_start_then_persists() {
        let mut mgr = ColliderManager::new();
        let mut a = Collider::new(1, cuboid(5));
        a.layers = Layers::LAYER_0;
        let mut b = Collider::new(2, cuboid(5));
        b.layers = Layers::LAYER_0;
        mgr.add(a, false);
        mgr.add(b, false);

        let positions = [Vector3D::ZERO, Vector3D::from_ints(2, 0, 0)];
        let mut events = Vec::new();
        mgr.update(
            |owner| positions[(owner - 1) as usize],
            |code, _info| events.push(code),
        );
        mgr.update(
            |owner| positions[(owner - 1) as usize],
            |code, _info| events.push(code),
        );

        assert_eq!(events, vec![EventCode::CollisionStart, EventCode::CollisionPersists]);
    }

    #[test]
    fn separation_fires_collision_end() {
        let mut mgr = ColliderManager::new();
        mgr.add(Collider::new(1, cuboid(5)), false);
        mgr.add(Collider::new(2, cuboid(5)), false);

        let mut far = false;
        let mut events = Vec::new();
        for _ in 0..2 {
            mgr.update(
                |owner| if far { Vector3D::from_ints(1000 * (owner as i32), 0, 0) } else { Vector3D::ZERO },
                |code, _| events.push(code),
            );
            far = true;
        }
        assert!(events.contains(&EventCode::CollisionEnd));
    }

    #[test]
    fn layers_to_ignore_suppresses_collision_even_when_overlapping() {
        let mut mgr = ColliderManager::new();
        let mut a = Collider::new(1, cuboid(5));
        a.layers_to_ignore = Layers::LAYER_1;
        let mut b = Collider::new(2, cuboid(5));
        b.layers = Layers::LAYER_1;
        mgr.add(a, false);
        mgr.add(b, false);

        let mut events = Vec::new();
        mgr.update(|_| Vector3D::ZERO, |code, _| events.push(code));
        assert!(events.is_empty());
    }

    #[test]
    fn same_owner_colliders_never_collide() {
        let mut mgr = ColliderManager::new();
        mgr.add(Collider::new(1, cuboid(5)), false);
        mgr.add(Collider::new(1, cuboid(5)), false);

        let mut events = Vec::new();
        mgr.update(|_| Vector3D::ZERO, |code, _| events.push(code));
        assert!(events.is_empty());
    }

    #[test]
    fn deleted_collider_is_removed_on_next_update() {
        let mut mgr = ColliderManager::new();
        mgr.add(Collider::new(1, cuboid(5)), false);
        mgr.mark_for_deletion(0);
        mgr.update(|_| Vector3D::ZERO, |_, _| {});
        assert!(mgr.is_empty());
    }

    #[test]
    fn adding_during_dispatch_sets_dirty() {
        let mut mgr = ColliderManager::new();
        mgr.add(Collider::new(1, cuboid(5)), false);
        mgr.add(Collider::new(2, cuboid(5)), true);
        assert!(mgr.take_dirty());
        assert!(!mgr.take_dirty());
    }

    #[test]
    fn resolve_collision_axis_identifies_axis_of_approach() {
        let mut mgr = ColliderManager::new();
        mgr.add(Collider::new(1, cuboid(5)), false);
        mgr.add(Collider::new(2, cuboid(5)), false);
        mgr.update(
            |owner| if owner == 1 { Vector3D::from_ints(2, 0, 0) } else { Vector3D::ZERO },
            |_, _| {},
        );
        let axis = mgr.resolve_collision_axis(0, 1, Vector3D::from_ints(4, 0, 0));
        assert!(axis.contains(CollisionAxis::X));
        assert!(!axis.contains(CollisionAxis::Y));
    }

    #[test]
    fn world_position_includes_local_displacement() {
        let mut collider = Collider::new(1, cuboid(5));
        collider.local_displacement = Vector3D::from_ints(3, 0, 0);
        collider.refresh_world_position(Vector3D::ZERO, 1);
        assert_eq!(collider.world_position().x, Fix13::from_int(3));
    }
}
