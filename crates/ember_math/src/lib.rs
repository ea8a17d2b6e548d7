// Re-export glam for convenience
pub use glam::*;

// Ember math types
mod direction;
mod energy;
mod frame;
mod interval;
mod ray;

pub use direction::Direction;
pub use energy::Energy;
pub use frame::Frame;
pub use interval::Interval;
pub use ray::Ray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        let c = a + b;
        assert_eq!(c, Vec3::new(5.0, 7.0, 9.0));
    }

    #[test]
    fn test_reexported_types_compose() {
        let ray = Ray::new(Vec3::ZERO, Direction::UP);
        let frame = Frame::from_normal(Direction::UP);
        let local = frame.to_local(ray.direction());
        assert!((local.y() - 1.0).abs() < 1e-6);
    }
}
