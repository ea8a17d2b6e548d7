use crate::{Direction, Vec3};

/// A ray in 3D space with an origin and a unit direction.
///
/// Rays are immutable; advancing along one produces a new point via
/// [`Ray::at`] and continuing a path produces a new `Ray`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Direction,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Direction) -> Self {
        Self { origin, direction }
    }

    /// Create a ray toward an arbitrary (not yet normalized) vector.
    #[inline]
    pub fn toward(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, Direction::new(direction))
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Get the point at distance `t` along the ray.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction.vec() * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_creation() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let ray = Ray::new(origin, Direction::Y);

        assert_eq!(ray.origin(), origin);
        assert_eq!(ray.direction(), Direction::Y);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Direction::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_toward_normalizes() {
        let ray = Ray::toward(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0));
        assert!((ray.direction().vec().length() - 1.0).abs() < 1e-6);
        assert_eq!(ray.at(5.0), Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_ray_copy() {
        let ray1 = Ray::new(Vec3::ZERO, Direction::Y);
        let ray2 = ray1; // Copy, not move

        assert_eq!(ray1.origin(), ray2.origin());
        assert_eq!(ray1.at(1.0), ray2.at(1.0));
    }
}
