//! Random stream helpers.
//!
//! Every function takes the stream explicitly; nothing here touches a
//! global or thread-local generator.

use ember_math::Direction;
use rand::RngCore;
use std::f32::consts::PI;

/// A uniform float in [0, 1) built from the top 24 bits of a `u32`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Cosine-weighted direction on the local hemisphere around `Direction::UP`.
///
/// The density of the result is `cos(theta) / pi`, and `cos(theta)` is
/// always strictly positive.
pub fn cosine_hemisphere(rng: &mut dyn RngCore) -> Direction {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);
    let cos_theta = (1.0 - u1).sqrt();
    Direction::from_spherical(cos_theta, 2.0 * PI * u2)
}

/// A GGX-distributed microfacet normal around `Direction::UP`.
///
/// The density of the result is `D(m) * cos(theta_m)` for GGX parameter
/// `alpha`.
pub fn ggx_half_vector(alpha: f32, rng: &mut dyn RngCore) -> Direction {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);
    let tan2 = alpha * alpha * u1 / (1.0 - u1);
    let cos_theta = 1.0 / (1.0 + tan2).sqrt();
    Direction::from_spherical(cos_theta, 2.0 * PI * u2)
}

/// Seed for the random stream of one work item.
///
/// Mixes the configured seed with the frame and row indices (SplitMix64
/// finalizer) so every (frame, row) pair gets an independent stream.
pub fn stream_seed(seed: u64, frame: u64, row: u64) -> u64 {
    let mut z = seed
        .wrapping_add(frame.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(row.wrapping_mul(0xD1B5_4A32_D192_ED03));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
