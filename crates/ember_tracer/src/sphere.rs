//! Sphere primitive for ray tracing.

use crate::{Material, Surface};
use ember_math::{Direction, Interval, Ray, Vec3};

/// A sphere primitive.
pub struct Sphere<M: Material> {
    center: Vec3,
    radius: f32,
    material: M,
}

impl<M: Material> Sphere<M> {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: M) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }
}

impl<M: Material> Surface for Sphere<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        // Unit direction, so the quadratic's `a` term is 1
        let oc = self.center - ray.origin();
        let h = ray.direction().vec().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = h - sqrtd;
        if !ray_t.surrounds(root) {
            root = h + sqrtd;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        Some(root)
    }

    fn at(&self, point: Vec3) -> (Direction, &dyn Material) {
        (Direction::new(point - self.center), &self.material)
    }
}
