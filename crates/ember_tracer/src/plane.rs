//! Infinite plane primitive.

use crate::{Material, Surface};
use ember_math::{Direction, Interval, Ray, Vec3};

/// An infinite plane through `point` with a fixed `normal`.
pub struct Plane<M: Material> {
    point: Vec3,
    normal: Direction,
    material: M,
}

impl<M: Material> Plane<M> {
    pub fn new(point: Vec3, normal: Direction, material: M) -> Self {
        Self {
            point,
            normal,
            material,
        }
    }
}

impl<M: Material> Surface for Plane<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let denom = self.normal.dot(ray.direction());
        // Parallel rays never hit
        if denom.abs() < 1e-8 {
            return None;
        }
        let t = (self.point - ray.origin()).dot(self.normal.vec()) / denom;
        ray_t.surrounds(t).then_some(t)
    }

    fn at(&self, _point: Vec3) -> (Direction, &dyn Material) {
        (self.normal, &self.material)
    }
}
