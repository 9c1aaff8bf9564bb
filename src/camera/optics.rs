#![doc = r#"
Pixel-space optics: the parameters a projection table is derived from (§4.D).
"#]

use crate::math::Fix13;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Optics {
    /// Distance from the eye to the screen plane, in pixels.
    pub eye_to_screen_distance: Fix13,
    /// Maximum view distance per axis, beyond which projection clamps.
    pub max_view_distance_x: Fix13,
    pub max_view_distance_y: Fix13,
    /// Half the distance between the two simulated eyes (stereoscopic base).
    pub inter_ocular_base: Fix13,
    /// Screen-space point the projection is centered on.
    pub view_point_center_x: Fix13,
    pub view_point_center_y: Fix13,
    /// Multiplier applied to the computed on-screen scale.
    pub scaling_modifier: Fix13,
}

impl Default for Optics {
    fn default() -> Self {
        Optics {
            eye_to_screen_distance: Fix13::from_int(384),
            max_view_distance_x: Fix13::from_int(4096),
            max_view_distance_y: Fix13::from_int(4096),
            inter_ocular_base: Fix13::from_int(10),
            view_point_center_x: Fix13::from_int(192),
            view_point_center_y: Fix13::from_int(112),
            scaling_modifier: Fix13::ONE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionTable {
    pub screen_x: Fix13,
    pub screen_y: Fix13,
    pub parallax: Fix13,
    pub scale: Fix13,
}

impl Optics {
    /// Projects a world-space point, relative to the camera, into screen
    /// space: perspective-divides by Z against the eye-to-screen distance,
    /// derives parallax from the inter-ocular base, and scales by the
    /// optics' modifier. This is the table sprites consult every frame
    /// their projection is marked invalid (§4.D).
    pub fn project(&self, relative_x: Fix13, relative_y: Fix13, relative_z: Fix13) -> ProjectionTable {
        let depth = relative_z.max(Fix13::ONE);
        let perspective = self.eye_to_screen_distance.div(depth);

        let screen_x = self.view_point_center_x + relative_x.mul(perspective).mul(self.scaling_modifier);
        let screen_y = self.view_point_center_y + relative_y.mul(perspective).mul(self.scaling_modifier);
        let parallax = self.inter_ocular_base.mul(perspective);
        let scale = perspective.mul(self.scaling_modifier);

        ProjectionTable { screen_x, screen_y, parallax, scale }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farther_points_project_smaller_parallax() {
        let optics = Optics::default();
        let near = optics.project(Fix13::ZERO, Fix13::ZERO, Fix13::from_int(100));
        let far = optics.project(Fix13::ZERO, Fix13::ZERO, Fix13::from_int(1000));
        assert!(near.parallax.raw() >= far.parallax.raw());
    }

    #[test]
    fn centered_point_projects_to_view_point_center() {
        let optics = Optics::default();
        let p = optics.project(Fix13::ZERO, Fix13::ZERO, Fix13::from_int(256));
        assert_eq!(p.screen_x, optics.view_point_center_x);
        assert_eq!(p.screen_y, optics.view_point_center_y);
    }
}
