#![doc = r#"
Streaming culling [P]: classifies entities as spawn-worthy or unload-worthy
by comparing their spec position to camera-centred AABBs padded by a load
pad and a larger unload pad (§4.J).
"#]

use crate::math::Vector3D;

#[derive(Clone, Copy, Debug)]
pub struct StreamingPads {
    load_pad: Vector3D,
    unload_pad: Vector3D,
}

impl StreamingPads {
    /// `load_pad` must be strictly smaller than `unload_pad` on every axis
    /// to avoid load/unload hysteresis thrash (§4.J); panics otherwise,
    /// since a misconfigured pad pair is a programming error, not runtime
    /// data to recover from.
    pub fn new(load_pad: Vector3D, unload_pad: Vector3D) -> Self {
        assert!(load_pad.x < unload_pad.x && load_pad.y < unload_pad.y && load_pad.z < unload_pad.z, "load pad must be smaller than unload pad on every axis");
        StreamingPads { load_pad, unload_pad }
    }

    fn within(camera: Vector3D, pad: Vector3D, position: Vector3D) -> bool {
        (position.x - camera.x).abs() <= pad.x
            && (position.y - camera.y).abs() <= pad.y
            && (position.z - camera.z).abs() <= pad.z
    }

    pub fn should_spawn(&self, camera: Vector3D, position: Vector3D) -> bool {
        Self::within(camera, self.load_pad, position)
    }

    pub fn should_unload(&self, camera: Vector3D, position: Vector3D) -> bool {
        !Self::within(camera, self.unload_pad, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pads() -> StreamingPads {
        StreamingPads::new(Vector3D::from_ints(100, 100, 100), Vector3D::from_ints(150, 150, 150))
    }

    #[test]
    fn entity_inside_load_pad_should_spawn() {
        let p = pads();
        assert!(p.should_spawn(Vector3D::ZERO, Vector3D::from_ints(50, 0, 0)));
    }

    #[test]
    fn entity_between_pads_neither_spawns_nor_unloads() {
        let p = pads();
        let pos = Vector3D::from_ints(120, 0, 0);
        assert!(!p.should_spawn(Vector3D::ZERO, pos));
        assert!(!p.should_unload(Vector3D::ZERO, pos));
    }

    #[test]
    fn entity_beyond_unload_pad_should_unload() {
        let p = pads();
        assert!(p.should_unload(Vector3D::ZERO, Vector3D::from_ints(200, 0, 0)));
    }

    #[test]
    #[should_panic(expected = "load pad must be smaller")]
    fn misconfigured_pads_panic_at_construction() {
        StreamingPads::new(Vector3D::from_ints(200, 200, 200), Vector3D::from_ints(100, 100, 100));
    }
}
