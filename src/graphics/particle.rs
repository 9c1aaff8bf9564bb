#![doc = r#"
Particle system (supplemented, grounded on
`original_source/.../Actor/ParticleSystem/Particles/Particle.c`): a
fixed-capacity recycle pool of short-lived visual entities with a spawn
cadence and per-particle life span countdown.

The reference's `Particle` carries an optional `Body` and collider, which
this crate already has in `physics`; the particle system itself only owns
the bookkeeping that is specific to it: the recycle pool, spawn timing, and
expiry.
"#]

use crate::math::{Fix13, Vector3D};

pub struct ParticleSpec {
    pub life_span_ms: u32,
    pub initial_force: Vector3D,
}

struct Particle {
    alive: bool,
    remaining_ms: u32,
    position: Vector3D,
    force: Vector3D,
}

impl Particle {
    fn dead() -> Self {
        Particle { alive: false, remaining_ms: 0, position: Vector3D::ZERO, force: Vector3D::ZERO }
    }
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    spec: ParticleSpec,
    spawn_period_ms: u32,
    spawn_accumulator_ms: u32,
    spawn_position: Vector3D,
}

impl ParticleSystem {
    /// Creates a system with a fixed-capacity pool of `capacity` particles,
    /// none of which are alive initially.
    pub fn new(capacity: usize, spec: ParticleSpec, spawn_period_ms: u32) -> Self {
        ParticleSystem {
            particles: (0..capacity).map(|_| Particle::dead()).collect(),
            spec,
            spawn_period_ms,
            spawn_accumulator_ms: 0,
            spawn_position: Vector3D::ZERO,
        }
    }

    pub fn set_spawn_position(&mut self, position: Vector3D) {
        self.spawn_position = position;
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.alive).count()
    }

    /// Finds a dead slot and recycles it as a freshly spawned particle at
    /// the current spawn position. Returns `None` if the pool is saturated,
    /// matching the reference's "no allocation beyond capacity" contract.
    fn spawn_one(&mut self) -> bool {
        if let Some(slot) = self.particles.iter_mut().find(|p| !p.alive) {
            slot.alive = true;
            slot.remaining_ms = self.spec.life_span_ms;
            slot.position = self.spawn_position;
            slot.force = self.spec.initial_force;
            true
        } else {
            false
        }
    }

    /// Advances spawn cadence and every live particle's life span and
    /// position by `delta_ms`. Particles whose life span reaches zero are
    /// expired (returned to the dead pool) and passed to `on_expire`.
    pub fn advance(&mut self, delta_ms: u32, mut on_expire: impl FnMut(usize)) {
        self.spawn_accumulator_ms += delta_ms;
        while self.spawn_accumulator_ms >= self.spawn_period_ms {
            self.spawn_accumulator_ms -= self.spawn_period_ms;
            self.spawn_one();
        }

        for (index, particle) in self.particles.iter_mut().enumerate() {
            if !particle.alive {
                continue;
            }
            particle.position = particle.position + particle.force.scale(Fix13::from_f32(delta_ms as f32 / 1000.0));
            particle.remaining_ms = particle.remaining_ms.saturating_sub(delta_ms);
            if particle.remaining_ms == 0 {
                particle.alive = false;
                on_expire(index);
            }
        }
    }

    pub fn position_of(&self, index: usize) -> Option<Vector3D> {
        self.particles.get(index).filter(|p| p.alive).map(|p| p.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ParticleSpec {
        ParticleSpec { life_span_ms: 100, initial_force: Vector3D::ZERO }
    }

    #[test]
    fn spawn_cadence_recycles_dead_slots() {
        let mut system = ParticleSystem::new(2, spec(), 50);
        system.advance(50, |_| {});
        assert_eq!(system.alive_count(), 1);
        system.advance(50, |_| {});
        assert_eq!(system.alive_count(), 2);
    }

    #[test]
    fn spawning_beyond_capacity_is_silently_bounded() {
        let mut system = ParticleSystem::new(1, spec(), 10);
        system.advance(100, |_| {});
        assert_eq!(system.alive_count(), 1);
    }

    #[test]
    fn particles_expire_after_their_life_span() {
        let mut system = ParticleSystem::new(1, spec(), 10);
        let mut expired = 0;
        system.advance(10, |_| {});
        assert_eq!(system.alive_count(), 1);
        system.advance(100, |_| expired += 1);
        assert_eq!(expired, 1);
        assert_eq!(system.alive_count(), 0);
    }

    #[test]
    fn recycled_slot_resets_life_span() {
        let mut system = ParticleSystem::new(1, spec(), 10);
        system.advance(10, |_| {});
        system.advance(100, |_| {});
        assert_eq!(system.alive_count(), 0);
        system.advance(10, |_| {});
        assert_eq!(system.alive_count(), 1);
    }
}
