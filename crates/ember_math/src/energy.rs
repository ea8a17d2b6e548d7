//! RGB energy type for radiance and path throughput.

use glam::Vec3;
use std::ops::{Add, AddAssign, Mul};

/// An RGB triple of light energy.
///
/// Used both for radiance carried along a ray and for the multiplicative
/// throughput ("signal") of a path. Components are expected to stay finite
/// and non-negative; a violation means a material produced bad math.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Energy(Vec3);

impl Energy {
    /// No energy.
    pub const ZERO: Energy = Energy(Vec3::ZERO);

    /// Unit energy in every channel (the initial path throughput).
    pub const ONE: Energy = Energy(Vec3::ONE);

    /// Create energy from red, green and blue components.
    #[inline]
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self(Vec3::new(red, green, blue))
    }

    /// Same value in every channel.
    #[inline]
    pub const fn splat(value: f32) -> Self {
        Self(Vec3::splat(value))
    }

    /// Wrap a raw vector.
    #[inline]
    pub const fn from_vec3(v: Vec3) -> Self {
        Self(v)
    }

    #[inline]
    pub fn red(&self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn green(&self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn blue(&self) -> f32 {
        self.0.z
    }

    /// The underlying vector.
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        self.0
    }

    /// Accumulate `gain` attenuated by `signal`.
    ///
    /// Returns `self + gain * signal`, the per-bounce radiance update.
    #[inline]
    pub fn gained(self, gain: Energy, signal: Energy) -> Energy {
        Energy(self.0 + gain.0 * signal.0)
    }

    /// Scale every channel by `s`.
    #[inline]
    pub fn scaled(self, s: f32) -> Energy {
        Energy(self.0 * s)
    }

    /// Component-wise product, used to attenuate throughput by reflectance.
    #[inline]
    pub fn by(self, other: Energy) -> Energy {
        Energy(self.0 * other.0)
    }

    /// Component-wise sum.
    #[inline]
    pub fn plus(self, other: Energy) -> Energy {
        Energy(self.0 + other.0)
    }

    /// `1 - self` per channel.
    #[inline]
    pub fn complement(self) -> Energy {
        Energy(Vec3::ONE - self.0)
    }

    /// The strongest channel.
    #[inline]
    pub fn max_component(&self) -> f32 {
        self.0.max_element()
    }

    /// True when every channel is exactly zero.
    #[inline]
    pub fn is_black(&self) -> bool {
        self.0 == Vec3::ZERO
    }

    /// True when no channel is NaN or infinite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// True when every channel is finite and >= 0.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.0.min_element() >= 0.0
    }
}

impl Add for Energy {
    type Output = Energy;

    #[inline]
    fn add(self, rhs: Energy) -> Energy {
        self.plus(rhs)
    }
}

impl AddAssign for Energy {
    #[inline]
    fn add_assign(&mut self, rhs: Energy) {
        self.0 += rhs.0;
    }
}

impl Mul for Energy {
    type Output = Energy;

    #[inline]
    fn mul(self, rhs: Energy) -> Energy {
        self.by(rhs)
    }
}

impl Mul<f32> for Energy {
    type Output = Energy;

    #[inline]
    fn mul(self, rhs: f32) -> Energy {
        self.scaled(rhs)
    }
}

impl From<Vec3> for Energy {
    fn from(v: Vec3) -> Self {
        Self(v)
    }
}

impl From<Energy> for Vec3 {
    fn from(e: Energy) -> Self {
        e.0
    }
}
