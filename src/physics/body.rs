#![doc = r#"
Body [N]: the physics integrator's per-entity state, the cycle-counter
time-scale throttle, and gravity-axis gating.

Grounded on `original_source/source/Component/Physics/BodyManager.c`: the
`cycle`/`skipCycles`/`remainingSkipCycles` scheme for throttling updates
below the target frame rate, and gravity being applied only to axes a body
is not already moving on (`gravitySensibleAxis` in the original).
"#]

use crate::math::{Fix13, Vector3D};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Axis: u8 {
        const X = 0b001;
        const Y = 0b010;
        const Z = 0b100;
    }
}

/// Throttles how often bodies are integrated relative to the target frame
/// rate, via the two `time_scale` regimes in §4.L.
pub struct TimeScale {
    value: f32,
    skip_cycles: u32,
    remaining_skip_cycles: u32,
}

impl Default for TimeScale {
    fn default() -> Self {
        TimeScale { value: 1.0, skip_cycles: 0, remaining_skip_cycles: 0 }
    }
}

impl TimeScale {
    /// Sets the throttle factor, clamping to `(0, 1]` as the reference does
    /// (floor of 0.1 rather than allowing zero, which would stall physics
    /// entirely).
    pub fn set(&mut self, target_updates_per_second: u32, value: f32) {
        self.value = value.clamp(0.1, 1.0);
        self.remaining_skip_cycles = 0;

        if self.value > 0.5 {
            let target = (target_updates_per_second as f32 * self.value).round() as u32;
            let skips = target_updates_per_second.saturating_sub(target).max(1);
            self.skip_cycles = ((target as f32 / skips as f32) + 0.5) as u32;
        } else if self.value < 1.0 {
            self.skip_cycles = ((1.0 / self.value) - 1.0 + 0.5) as u32;
        } else {
            self.skip_cycles = 0;
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Returns whether this update cycle should actually integrate bodies,
    /// advancing the internal skip counter per the `time_scale` regime.
    pub fn should_update(&mut self) -> bool {
        if self.value >= 1.0 {
            return true;
        }

        self.remaining_skip_cycles += 1;

        if self.value > 0.5 {
            if self.remaining_skip_cycles > self.skip_cycles {
                self.remaining_skip_cycles = 0;
                return false;
            }
            true
        } else {
            if self.remaining_skip_cycles <= self.skip_cycles {
                return false;
            }
            self.remaining_skip_cycles = 0;
            true
        }
    }
}

pub type OwnerId = u64;

pub struct Body {
    pub owner: OwnerId,
    pub mass: Fix13,
    pub velocity: Vector3D,
    pub acceleration: Vector3D,
    pub friction: Fix13,
    pub axis_subject_to_gravity: Axis,
    pub awake: bool,
    pub delete_me: bool,
    position: Vector3D,
}

impl Body {
    pub fn new(owner: OwnerId, mass: Fix13, position: Vector3D) -> Self {
        Body {
            owner,
            mass,
            velocity: Vector3D::ZERO,
            acceleration: Vector3D::ZERO,
            friction: Fix13::ZERO,
            axis_subject_to_gravity: Axis::empty(),
            awake: true,
            delete_me: false,
            position,
        }
    }

    pub fn position(&self) -> Vector3D {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3D) {
        self.position = position;
    }

    fn moving_axes(&self) -> Axis {
        let mut axes = Axis::empty();
        if !self.velocity.x.is_zero() {
            axes.insert(Axis::X);
        }
        if !self.velocity.y.is_zero() {
            axes.insert(Axis::Y);
        }
        if !self.velocity.z.is_zero() {
            axes.insert(Axis::Z);
        }
        axes
    }

    pub fn apply_force(&mut self, force: Vector3D) {
        if self.mass.is_zero() {
            return;
        }
        self.acceleration = self.acceleration + force.scale(Fix13::from_f32(1.0).div(self.mass));
    }

    /// Masks `gravity` to the axes this body is subject to gravity on and
    /// not already moving on, then applies it as one frame's force impulse,
    /// matching `BodyManager::update`'s `gravitySensibleAxis` computation.
    pub fn apply_gravity(&mut self, gravity: Vector3D) {
        let sensible = self.axis_subject_to_gravity & !self.moving_axes();
        if sensible.is_empty() {
            return;
        }
        let force = Vector3D::new(
            if sensible.contains(Axis::X) { gravity.x.mul(self.mass) } else { Fix13::ZERO },
            if sensible.contains(Axis::Y) { gravity.y.mul(self.mass) } else { Fix13::ZERO },
            if sensible.contains(Axis::Z) { gravity.z.mul(self.mass) } else { Fix13::ZERO },
        );
        self.apply_force(force);
    }

    /// Integrates this body by one fixed `dt`: velocity += acceleration *
    /// dt, position += velocity * dt, then friction damps velocity along
    /// axes currently in motion (§4.L steps 3-4). The acceleration
    /// accumulator is cleared afterward, since `apply_force`/`apply_gravity`
    /// build it fresh each tick.
    pub fn integrate(&mut self, dt: Fix13) {
        if !self.awake || self.delete_me {
            return;
        }

        self.velocity = self.velocity + self.acceleration.scale(dt);
        self.position = self.position + self.velocity.scale(dt);
        self.acceleration = Vector3D::ZERO;

        if !self.friction.is_zero() {
            let damp = Fix13::from_f32(1.0) - self.friction;
            let moving = self.moving_axes();
            if moving.contains(Axis::X) {
                self.velocity.x = self.velocity.x.mul(damp);
            }
            if moving.contains(Axis::Y) {
                self.velocity.y = self.velocity.y.mul(damp);
            }
            if moving.contains(Axis::Z) {
                self.velocity.z = self.velocity.z.mul(damp);
            }
        }
    }
}

pub struct BodyManager {
    bodies: Vec<Body>,
    gravity: Vector3D,
    time_scale: TimeScale,
    target_updates_per_second: u32,
    dt: Fix13,
}

impl BodyManager {
    pub fn new(gravity: Vector3D, target_updates_per_second: u32, dt: Fix13) -> Self {
        BodyManager {
            bodies: Vec::new(),
            gravity,
            time_scale: TimeScale::default(),
            target_updates_per_second,
            dt,
        }
    }

    pub fn add(&mut self, body: Body) {
        self.bodies.push(body);
    }

    pub fn set_time_scale(&mut self, value: f32) {
        self.time_scale.set(self.target_updates_per_second, value);
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Runs one physics update: drops deleted bodies, and if the
    /// time-scale throttle admits this cycle, applies gravity and
    /// integrates every awake body.
    pub fn update(&mut self) {
        self.bodies.retain(|b| !b.delete_me);

        if !self.time_scale.should_update() {
            return;
        }

        for body in &mut self.bodies {
            if !body.awake {
                continue;
            }
            body.apply_gravity(self.gravity);
            body.integrate(self.dt);
        }
    }
}
