//! Camera orientation, main light orientation, and per-pixel view ray reconstruction.

use glam::{EulerRot, Quat, Vec2, Vec3, Vec4};

/// Orientation and field of view of the camera being composited.
///
/// The camera looks down its local -Z with +Y up. World +Y is the zenith at
/// the eye position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Camera-to-world rotation as a unit quaternion.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl CameraView {
    /// Camera rotated by `yaw` about world +Y, then pitched by `pitch` (radians).
    pub fn from_yaw_pitch(yaw: f32, pitch: f32, fov_y: f32) -> Self {
        Self {
            rotation: Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0),
            fov_y,
        }
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Reconstruct the normalized world-space view ray through the center of
    /// pixel `(x, y)`. `rt_size` is `(width, height, 1/width, 1/height)`;
    /// row 0 is the top of the target.
    pub fn view_ray(&self, x: u32, y: u32, rt_size: Vec4) -> Vec3 {
        let uv = Vec2::new((x as f32 + 0.5) * rt_size.z, (y as f32 + 0.5) * rt_size.w);
        let ndc = Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);
        let tan_half = (self.fov_y * 0.5).tan();
        let aspect = rt_size.x * rt_size.w;
        let local = Vec3::new(ndc.x * tan_half * aspect, ndc.y * tan_half, -1.0);
        (self.rotation * local).normalize()
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            fov_y: 60.0_f32.to_radians(),
        }
    }
}

/// The dominant directional light.
///
/// Light travels along its local +Z, so [`MainLight::forward`] points from
/// the light into the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainLight {
    pub rotation: Quat,
}

impl MainLight {
    /// Light whose sun disc sits at `elevation` above the horizon and
    /// `azimuth` clockwise from the default camera forward (-Z), in radians.
    pub fn from_elevation_azimuth(elevation: f32, azimuth: f32) -> Self {
        let to_light = Vec3::new(
            elevation.cos() * azimuth.sin(),
            elevation.sin(),
            -elevation.cos() * azimuth.cos(),
        );
        Self {
            rotation: Quat::from_rotation_arc(Vec3::Z, -to_light.normalize()),
        }
    }

    /// World-space forward vector of the light.
    pub fn forward(&self) -> Vec3 {
        (self.rotation * Vec3::Z).normalize()
    }

    /// Unit vector from the scene toward the light.
    pub fn direction_to_light(&self) -> Vec3 {
        -self.forward()
    }
}

impl Default for MainLight {
    /// Sun at the zenith.
    fn default() -> Self {
        Self::from_elevation_azimuth(std::f32::consts::FRAC_PI_2, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rt_size(w: f32, h: f32) -> Vec4 {
        Vec4::new(w, h, 1.0 / w, 1.0 / h)
    }

    #[test]
    fn test_center_pixel_looks_forward() {
        let camera = CameraView::default();
        let ray = camera.view_ray(1, 1, rt_size(3.0, 3.0));
        assert!((ray - Vec3::NEG_Z).length() < 1e-6, "{ray}");
    }

    #[test]
    fn test_top_row_looks_up() {
        let camera = CameraView::default();
        let rt = rt_size(64.0, 64.0);
        let top = camera.view_ray(32, 0, rt);
        let bottom = camera.view_ray(32, 63, rt);
        assert!(top.y > 0.0 && bottom.y < 0.0);
        // Edge rows are close to half the vertical field of view.
        let half = camera.fov_y * 0.5;
        assert!((top.y.asin() - half).abs() < 0.02, "{}", top.y.asin());
    }

    #[test]
    fn test_rays_are_normalized() {
        let camera = CameraView::from_yaw_pitch(0.7, 0.3, 1.2);
        let rt = rt_size(40.0, 30.0);
        for (x, y) in [(0, 0), (39, 29), (20, 15), (5, 25)] {
            let r = camera.view_ray(x, y, rt);
            assert!((r.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pitch_raises_forward() {
        let camera = CameraView::from_yaw_pitch(0.0, 0.5, 1.0);
        assert!((camera.forward().y - 0.5_f32.sin()).abs() < 1e-5);
    }

    #[test]
    fn test_main_light_at_zenith_points_down() {
        let light = MainLight::default();
        assert!((light.forward() - Vec3::NEG_Y).length() < 1e-5);
        assert!((light.direction_to_light() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_main_light_elevation() {
        let light = MainLight::from_elevation_azimuth(0.2, 0.0);
        let to_light = light.direction_to_light();
        assert!((to_light.y - 0.2_f32.sin()).abs() < 1e-5);
        assert!(to_light.z < 0.0, "azimuth 0 faces the default camera: {to_light}");
    }
}
