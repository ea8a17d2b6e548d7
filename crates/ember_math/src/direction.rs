use crate::Vec3;
use std::ops::Neg;

/// A unit-length direction in 3D space.
///
/// Directions are normalized on construction and every operation that
/// returns a `Direction` keeps them normalized. In the local shading
/// frame `Direction::UP` (+Y) is the surface normal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Direction(Vec3);

impl Direction {
    /// The reference "up" vector defining the local shading frame.
    pub const UP: Direction = Direction(Vec3::Y);

    pub const X: Direction = Direction(Vec3::X);
    pub const Y: Direction = Direction(Vec3::Y);
    pub const Z: Direction = Direction(Vec3::Z);

    /// Normalize `v` into a direction.
    ///
    /// A zero or non-finite vector falls back to `UP`.
    pub fn new(v: Vec3) -> Self {
        Self(v.try_normalize().unwrap_or(Vec3::Y))
    }

    /// Build a direction from spherical coordinates around +Y.
    ///
    /// `cos_theta` is measured from +Y, `phi` rotates around it from +X.
    pub fn from_spherical(cos_theta: f32, phi: f32) -> Self {
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        Self::new(Vec3::new(sin_theta * phi.cos(), cos_theta, sin_theta * phi.sin()))
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.0.z
    }

    /// The underlying unit vector.
    #[inline]
    pub fn vec(&self) -> Vec3 {
        self.0
    }

    #[inline]
    pub fn dot(&self, other: Direction) -> f32 {
        self.0.dot(other.0)
    }

    /// Cosine of the angle to `UP`, i.e. the local-frame `y` component.
    #[inline]
    pub fn cos_theta(&self) -> f32 {
        self.0.y
    }

    /// The half-vector between two directions.
    ///
    /// Opposite directions have no half-vector; `UP` is returned instead.
    pub fn half(&self, other: Direction) -> Direction {
        Self::new(self.0 + other.0)
    }

    /// Mirror this direction about `normal`, keeping the side it points to.
    ///
    /// For a direction pointing away from a surface, the result also points
    /// away from it.
    pub fn reflect(&self, normal: Direction) -> Direction {
        let n = normal.0;
        Self::new(2.0 * self.0.dot(n) * n - self.0)
    }

    /// Refract an incident direction travelling *into* a surface.
    ///
    /// `normal` faces against the incident direction and `ratio` is
    /// `n1 / n2`. Returns `None` on total internal reflection.
    pub fn refract(&self, normal: Direction, ratio: f32) -> Option<Direction> {
        let cos_i = (-self.0.dot(normal.0)).min(1.0);
        let sin2_t = ratio * ratio * (1.0 - cos_i * cos_i);
        if sin2_t > 1.0 {
            return None;
        }
        let cos_t = (1.0 - sin2_t).sqrt();
        Some(Self::new(ratio * self.0 + (ratio * cos_i - cos_t) * normal.0))
    }
}

impl Neg for Direction {
    type Output = Direction;

    #[inline]
    fn neg(self) -> Direction {
        Direction(-self.0)
    }
}

impl From<Direction> for Vec3 {
    fn from(d: Direction) -> Self {
        d.0
    }
}
