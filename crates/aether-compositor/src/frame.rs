//! Per-camera frame state.

use glam::{Vec3, Vec4};

use crate::camera::{CameraView, MainLight};

/// Everything the per-pixel kernel needs besides the atmosphere settings.
///
/// Built at the start of each camera's processing and dropped at the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub width: u32,
    pub height: u32,
    /// `(width, height, 1/width, 1/height)`.
    pub rt_size: Vec4,
    /// World-space forward vector of the main light.
    pub main_light_dir: Vec3,
    pub camera: CameraView,
}

impl FrameContext {
    pub fn new(width: u32, height: u32, camera: CameraView, main_light: &MainLight) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        Self {
            width,
            height,
            rt_size: Vec4::new(w, h, 1.0 / w, 1.0 / h),
            main_light_dir: main_light.forward(),
            camera,
        }
    }

    /// Direction from the scene toward the light, as the scattering model expects it.
    pub fn light_dir(&self) -> Vec3 {
        -self.main_light_dir
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rt_size_reciprocals() {
        let frame = FrameContext::new(320, 200, CameraView::default(), &MainLight::default());
        assert_eq!(frame.rt_size, Vec4::new(320.0, 200.0, 1.0 / 320.0, 1.0 / 200.0));
        assert_eq!(frame.pixel_count(), 64_000);
    }

    #[test]
    fn test_light_dir_is_opposite_forward() {
        let light = MainLight::from_elevation_azimuth(0.4, 1.0);
        let frame = FrameContext::new(4, 4, CameraView::default(), &light);
        assert!((frame.light_dir() - light.direction_to_light()).length() < 1e-6);
    }

    #[test]
    fn test_empty_target_has_finite_rt_size() {
        let frame = FrameContext::new(0, 0, CameraView::default(), &MainLight::default());
        assert!(frame.rt_size.is_finite());
        assert_eq!(frame.pixel_count(), 0);
    }
}
