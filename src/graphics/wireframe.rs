#![doc = r#"
Wireframe [L]: line and polygon drawing into the two DRAM framebuffers
addressed by the left and right eye columns (§4.L).
"#]

use crate::graphics::visual::VisualState;
use crate::math::{Fix13, Vector3D};

pub const FRAMEBUFFER_WIDTH: usize = 384;
pub const FRAMEBUFFER_HEIGHT: usize = 224;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

pub struct Framebuffer {
    bits: Vec<u8>,
}

impl Framebuffer {
    fn new() -> Self {
        Framebuffer { bits: vec![0; (FRAMEBUFFER_WIDTH * FRAMEBUFFER_HEIGHT) / 8 + 1] }
    }

    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= FRAMEBUFFER_WIDTH || y as usize >= FRAMEBUFFER_HEIGHT {
            return None;
        }
        Some(y as usize * FRAMEBUFFER_WIDTH + x as usize)
    }

    fn set(&mut self, x: i32, y: i32) {
        if let Some(bit) = Self::index(x, y) {
            self.bits[bit / 8] |= 1 << (bit % 8);
        }
    }

    pub fn is_set(&self, x: i32, y: i32) -> bool {
        match Self::index(x, y) {
            Some(bit) => self.bits[bit / 8] & (1 << (bit % 8)) != 0,
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|b| *b = 0);
    }
}

pub struct WireframeBuffers {
    pub left: Framebuffer,
    pub right: Framebuffer,
}

impl Default for WireframeBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl WireframeBuffers {
    pub fn new() -> Self {
        WireframeBuffers { left: Framebuffer::new(), right: Framebuffer::new() }
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    fn buffer_mut(&mut self, eye: Eye) -> &mut Framebuffer {
        match eye {
            Eye::Left => &mut self.left,
            Eye::Right => &mut self.right,
        }
    }

    /// Draws a line from `a` to `b` into the given eye's buffer using a
    /// Bresenham sweep on the screen-space x/y components.
    pub fn draw_line(&mut self, eye: Eye, a: Vector3D, b: Vector3D) {
        let buffer = self.buffer_mut(eye);
        let (mut x0, mut y0) = (a.x.to_int(), a.y.to_int());
        let (x1, y1) = (b.x.to_int(), b.y.to_int());

        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            buffer.set(x0, y0);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Draws a closed polygon as successive line segments joining
    /// `vertices`, wrapping back to the first vertex.
    pub fn draw_polygon(&mut self, eye: Eye, vertices: &[Vector3D]) {
        if vertices.len() < 2 {
            return;
        }
        for window in vertices.windows(2) {
            self.draw_line(eye, window[0], window[1]);
        }
        self.draw_line(eye, vertices[vertices.len() - 1], vertices[0]);
    }
}

/// A drawable wireframe object: a closed polygon plus the show/transparency/
/// Z-sort state shared with sprites (§3.1's `VisualState`).
pub struct WireframeObject {
    vertices: Vec<Vector3D>,
    visual: VisualState,
}

impl WireframeObject {
    pub fn new(vertices: Vec<Vector3D>) -> Self {
        WireframeObject { visual: VisualState::new(Fix13::ZERO), vertices }
    }

    pub fn visual(&self) -> &VisualState {
        &self.visual
    }

    pub fn visual_mut(&mut self) -> &mut VisualState {
        &mut self.visual
    }
}

/// Owns a set of `WireframeObject`s and draws only the shown ones into a
/// pair of `WireframeBuffers`, matching `WireframeManager`'s per-frame
/// `isAnyVisible`/draw pass.
#[derive(Default)]
pub struct WireframeObjectRegistry {
    objects: Vec<WireframeObject>,
}

impl WireframeObjectRegistry {
    pub fn new() -> Self {
        WireframeObjectRegistry { objects: Vec::new() }
    }

    pub fn add(&mut self, object: WireframeObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut WireframeObject> {
        self.objects.get_mut(index)
    }

    pub fn draw_all(&self, buffers: &mut WireframeBuffers, eye: Eye) {
        for object in &self.objects {
            if object.visual.is_shown() {
                buffers.draw_polygon(eye, &object.vertices);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: i32, y: i32) -> Vector3D {
        Vector3D::new(Fix13::from_int(x), Fix13::from_int(y), Fix13::ZERO)
    }

    #[test]
    fn horizontal_line_sets_every_pixel_between_endpoints() {
        let mut fb = WireframeBuffers::new();
        fb.draw_line(Eye::Left, point(0, 5), point(10, 5));
        for x in 0..=10 {
            assert!(fb.left.is_set(x, 5));
        }
    }

    #[test]
    fn drawing_is_isolated_per_eye() {
        let mut fb = WireframeBuffers::new();
        fb.draw_line(Eye::Left, point(0, 0), point(5, 0));
        assert!(fb.left.is_set(3, 0));
        assert!(!fb.right.is_set(3, 0));
    }

    #[test]
    fn polygon_closes_back_to_first_vertex() {
        let mut fb = WireframeBuffers::new();
        fb.draw_polygon(Eye::Left, &[point(0, 0), point(10, 0), point(10, 10), point(0, 10)]);
        assert!(fb.left.is_set(0, 5));
        assert!(fb.left.is_set(10, 5));
    }

    #[test]
    fn clear_resets_both_buffers() {
        let mut fb = WireframeBuffers::new();
        fb.draw_line(Eye::Left, point(0, 0), point(2, 0));
        fb.clear();
        assert!(!fb.left.is_set(1, 0));
    }

    #[test]
    fn out_of_bounds_points_are_ignored_without_panicking() {
        let mut fb = WireframeBuffers::new();
        fb.draw_line(Eye::Left, point(-5, -5), point(-1, -1));
    }

    #[test]
    fn hidden_objects_are_skipped_by_the_registry() {
        let mut registry = WireframeObjectRegistry::new();
        let hidden = registry.add(WireframeObject::new(vec![point(0, 0), point(4, 0), point(4, 4), point(0, 4)]));
        registry.add(WireframeObject::new(vec![point(20, 20), point(24, 20), point(24, 24), point(20, 24)]));
        registry.get_mut(hidden).unwrap().visual_mut().hide();

        let mut buffers = WireframeBuffers::new();
        registry.draw_all(&mut buffers, Eye::Left);

        assert!(!buffers.left.is_set(0, 2));
        assert!(buffers.left.is_set(20, 22));
    }
}
