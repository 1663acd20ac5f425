//! Ray picking against element volumes
//!
//! Cubes are tested as axis-aligned boxes, spheres and pyramids as spheres.

use glam::Vec3;

use super::element::{Element, ElementId, Shape};

/// A world-space ray with normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Distance along the ray to a sphere, if hit in front of the origin
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let near = -b - sqrt_disc;
    if near >= 0.0 {
        return Some(near);
    }
    // Origin inside the sphere
    let far = -b + sqrt_disc;
    (far >= 0.0).then_some(0.0)
}

/// Distance along the ray to an axis-aligned box (slab test)
pub fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray.dir.recip();
    let t1 = (min - ray.origin) * inv;
    let t2 = (max - ray.origin) * inv;
    let t_near = t1.min(t2).max_element();
    let t_far = t1.max(t2).min_element();
    if t_near > t_far || t_far < 0.0 || t_near.is_nan() {
        return None;
    }
    Some(t_near.max(0.0))
}

/// Distance along the ray to the element's pick volume
pub fn intersect(ray: &Ray, element: &Element) -> Option<f32> {
    let center = element.position();
    match element.shape {
        Shape::Cube { size } => {
            let half = Vec3::splat(size * 0.5);
            ray_aabb(ray, center - half, center + half)
        }
        Shape::Sphere { radius } => ray_sphere(ray, center, radius),
        Shape::Pyramid { .. } => ray_sphere(ray, center, element.shape.bounding_radius()),
    }
}

/// Nearest element hit by the ray; equal distances go to the lowest id
pub fn nearest_hit<'a, I>(ray: &Ray, elements: I) -> Option<ElementId>
where
    I: IntoIterator<Item = &'a Element>,
{
    elements
        .into_iter()
        .filter(|e| !e.is_released())
        .filter_map(|e| intersect(ray, e).map(|t| (t, e.id)))
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::behavior::Variant;
    use crate::sim::element::{Behavior, ElementKind, Motion};

    fn at(id: ElementId, shape: Shape, pos: Vec3) -> Element {
        Element::new(
            id,
            Behavior::initial(Variant::Collect),
            ElementKind::Collect,
            shape,
            pos,
            &Motion::default(),
        )
    }

    #[test]
    fn test_ray_sphere_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = ray_sphere(&ray, Vec3::ZERO, 1.0).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert!(ray_sphere(&ray, Vec3::new(3.0, 0.0, 0.0), 1.0).is_none());
        // Behind the origin
        assert!(ray_sphere(&ray, Vec3::new(0.0, 0.0, 8.0), 1.0).is_none());
    }

    #[test]
    fn test_ray_aabb_axis_parallel() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::NEG_Z);
        let t = ray_aabb(&ray, Vec3::splat(-0.5), Vec3::splat(0.5)).unwrap();
        assert!((t - 4.5).abs() < 1e-5);
        assert!(ray_aabb(&ray, Vec3::new(1.0, 1.0, -0.5), Vec3::new(2.0, 2.0, 0.5)).is_none());
    }

    #[test]
    fn test_nearest_hit_prefers_closest() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let far = at(1, Shape::Cube { size: 0.5 }, Vec3::new(0.0, 0.0, -1.0));
        let near = at(2, Shape::Sphere { radius: 0.3 }, Vec3::new(0.0, 0.0, 1.0));
        let off = at(3, Shape::Cube { size: 0.5 }, Vec3::new(4.0, 0.0, 1.0));
        assert_eq!(nearest_hit(&ray, [&far, &near, &off]), Some(2));
    }

    #[test]
    fn test_released_elements_are_not_pickable() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let mut e = at(1, Shape::Cube { size: 0.5 }, Vec3::ZERO);
        e.delete();
        assert_eq!(nearest_hit(&ray, [&e]), None);
    }
}
