//! Perspective camera for picking and projection
//!
//! The camera sits on +z looking down -z at the origin. Pointer positions are
//! handled in normalized device coordinates (x, y in [-1, 1], y up).

use glam::{Vec2, Vec3};

use crate::consts::{CAMERA_DISTANCE, CAMERA_FOV_DEG};
use crate::sim::Ray;

/// Fixed perspective camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view in radians
    fov: f32,
    /// Aspect ratio (width / height)
    aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CAMERA_FOV_DEG, 1.0)
    }
}

impl Camera {
    pub fn new(fov_deg: f32, aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            fov: fov_deg.to_radians(),
            aspect: aspect.max(f32::EPSILON),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the aspect ratio after a viewport resize
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    #[inline]
    fn half_height(&self) -> f32 {
        (self.fov * 0.5).tan()
    }

    /// World-space ray through a pointer position
    pub fn ray(&self, ndc: Vec2) -> Ray {
        let h = self.half_height();
        let dir = Vec3::new(ndc.x * h * self.aspect, ndc.y * h, -1.0);
        Ray::new(self.position, dir)
    }

    /// Project a world point to NDC; None if it is behind the camera
    pub fn project(&self, p: Vec3) -> Option<Vec2> {
        let v = p - self.position;
        let depth = -v.z;
        if depth <= f32::EPSILON {
            return None;
        }
        let h = self.half_height();
        Some(Vec2::new(v.x / (depth * h * self.aspect), v.y / (depth * h)))
    }

    /// NDC height covered by one world unit at the depth of `p`
    pub fn ndc_scale(&self, p: Vec3) -> f32 {
        let depth = (self.position.z - p.z).max(f32::EPSILON);
        1.0 / (depth * self.half_height())
    }
}

/// Convert a pixel position within a viewport to NDC
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
}

/// Convert NDC back to a pixel position within a viewport
pub fn ndc_to_screen(ndc: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_down_z() {
        let camera = Camera::default();
        let ray = camera.ray(Vec2::ZERO);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 5.0));
        assert!((ray.dir - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_project_then_ray_hits_point() {
        let camera = Camera::new(75.0, 16.0 / 9.0);
        let p = Vec3::new(2.0, -1.0, 0.5);
        let ndc = camera.project(p).unwrap();
        let ray = camera.ray(ndc);
        // Closest approach of the ray to p should be ~0
        let t = (p - ray.origin).dot(ray.dir);
        assert!((ray.at(t) - p).length() < 1e-4);
    }

    #[test]
    fn test_screen_to_ndc_corners() {
        assert_eq!(screen_to_ndc(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0));
        assert_eq!(screen_to_ndc(800.0, 600.0, 800.0, 600.0), Vec2::new(1.0, -1.0));
        assert_eq!(ndc_to_screen(Vec2::ZERO, 800.0, 600.0), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_behind_camera_not_projected() {
        let camera = Camera::default();
        assert!(camera.project(Vec3::new(0.0, 0.0, 6.0)).is_none());
    }
}
