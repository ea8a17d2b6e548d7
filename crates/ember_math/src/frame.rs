//! Orthonormal shading frames.

use crate::{Direction, Vec3};

/// An orthonormal basis whose local `UP` (+Y) maps to a world normal.
///
/// Materials work in the local frame where the normal is always
/// `Direction::UP`; the integrator converts world directions in and out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    tangent: Vec3,
    normal: Vec3,
    bitangent: Vec3,
}

impl Frame {
    /// Build a frame around `normal`.
    ///
    /// Branchless construction from Duff et al. 2017, "Building an
    /// Orthonormal Basis, Revisited".
    pub fn from_normal(normal: Direction) -> Self {
        let n = normal.vec();
        let sign = if n.z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        let tangent = Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
        let bitangent = Vec3::new(b, sign + n.y * n.y * a, -n.y);

        Self {
            tangent,
            normal: n,
            bitangent,
        }
    }

    /// World direction to local (normal = +Y).
    pub fn to_local(&self, v: Direction) -> Direction {
        let w = v.vec();
        Direction::new(Vec3::new(
            w.dot(self.tangent),
            w.dot(self.normal),
            w.dot(self.bitangent),
        ))
    }

    /// Local direction (normal = +Y) to world.
    pub fn to_world(&self, v: Direction) -> Direction {
        Direction::new(v.x() * self.tangent + v.y() * self.normal + v.z() * self.bitangent)
    }
}
