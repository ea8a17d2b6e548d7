//! Shading toolkit: Fresnel, absorption and microfacet terms.
//!
//! Pure functions with no sampling decisions of their own. Materials
//! compose them into full BSDFs.
//!
//! References:
//! - Schlick 1994, "An Inexpensive BRDF Model for Physically-based Rendering"
//! - Walter et al. 2007, "Microfacet Models for Refraction through Rough Surfaces"
//! - Karis 2013, "Specular BRDF Reference" (graphicrants.blogspot.com)

use ember_math::{Direction, Energy};
use std::f32::consts::PI;

/// Roughness below this is clamped; the GGX lobe is a Dirac delta at zero.
pub const MIN_ROUGHNESS: f32 = 0.01;

/// Added to denominators that can reach zero at grazing angles.
const EPSILON: f32 = 1e-7;

/// Reflectance at normal incidence between media with indices `n1` and `n2`.
#[inline]
pub fn reflectance_at_normal(n1: f32, n2: f32) -> f32 {
    let r0 = (n1 - n2) / (n1 + n2);
    r0 * r0
}

/// Schlick's approximation of the fraction of light reflected at a boundary.
///
/// `incident` travels toward the surface and `normal` faces against it.
/// When `r0` is zero it is derived from `n1` (the medium the ray is in) and
/// `n2`. Going from a denser medium to a lighter one applies the
/// critical-angle check and returns exactly 1.0 on total internal
/// reflection. Always returns a value in [0, 1].
pub fn schlick_reflectance(incident: Direction, normal: Direction, r0: f32, n1: f32, n2: f32) -> f32 {
    let mut cos_x = (-normal.dot(incident)).clamp(0.0, 1.0);
    let mut r0 = r0;
    if r0 == 0.0 {
        r0 = reflectance_at_normal(n1, n2);
        if n1 > n2 {
            let n = n1 / n2;
            let sin_t2 = n * n * (1.0 - cos_x * cos_x);
            if sin_t2 > 1.0 {
                return 1.0;
            }
            cos_x = (1.0 - sin_t2).sqrt();
        }
    }
    (r0 + (1.0 - r0) * schlick_weight(cos_x)).clamp(0.0, 1.0)
}

/// `(1 - cos)^5`, the Schlick falloff.
#[inline]
pub fn schlick_weight(cos_theta: f32) -> f32 {
    let x = (1.0 - cos_theta).clamp(0.0, 1.0);
    let x2 = x * x;
    x2 * x2 * x
}

/// Schlick Fresnel from a precomputed normal-incidence reflectance.
#[inline]
pub fn schlick_fresnel(f0: f32, cos_theta: f32) -> f32 {
    f0 + (1.0 - f0) * schlick_weight(cos_theta)
}

/// Per-channel Schlick Fresnel, for colored (metallic) reflectance.
#[inline]
pub fn schlick_fresnel_energy(f0: Energy, cos_theta: f32) -> Energy {
    f0.plus(f0.complement().scaled(schlick_weight(cos_theta)))
}

/// Beer-Lambert attenuation through an absorbing medium.
///
/// Returns `exp(-absorb * distance)` per channel, in (0, 1] for finite
/// non-negative inputs.
pub fn beers_law_attenuation(distance: f32, absorb: Energy) -> Energy {
    debug_assert!(distance >= 0.0, "negative distance through medium: {distance}");
    Energy::new(
        (-absorb.red() * distance).exp(),
        (-absorb.green() * distance).exp(),
        (-absorb.blue() * distance).exp(),
    )
}

/// Perceptual roughness to GGX alpha, clamped away from the mirror limit.
#[inline]
pub fn ggx_alpha(roughness: f32) -> f32 {
    let r = roughness.clamp(MIN_ROUGHNESS, 1.0);
    r * r
}

/// GGX (Trowbridge-Reitz) normal distribution at the half-vector of
/// `wi` and `wo`.
pub fn ggx_distribution(wi: Direction, wo: Direction, normal: Direction, roughness: f32) -> f32 {
    let m = wi.half(wo);
    let nm = normal.dot(m);
    if nm <= 0.0 {
        return 0.0;
    }
    let a = ggx_alpha(roughness);
    let a2 = a * a;
    let nm2 = nm * nm;
    // Written so `1 - a2` never rounds away at tiny alpha
    let denom = nm2 * a2 + (1.0 - nm2);
    a2 / (PI * denom * denom).max(f32::MIN_POSITIVE)
}

/// Smith G1 shadowing for GGX seen from `wo`.
pub fn smith_ggx_shadowing(wo: Direction, normal: Direction, roughness: f32) -> f32 {
    let a = ggx_alpha(roughness);
    let a2 = a * a;
    let nv = normal.dot(wo).clamp(0.0, 1.0);
    (2.0 * nv) / (nv + (a2 + (1.0 - a2) * nv * nv).sqrt() + EPSILON)
}

/// Smith G1 masking in the local frame (normal = +Y), given `a2 = alpha^2`.
pub fn smith_ggx_masking(wo: Direction, a2: f32) -> f32 {
    let dot_nv = wo.y().abs();
    let denom = (a2 + (1.0 - a2) * dot_nv * dot_nv).sqrt() + dot_nv;
    2.0 * dot_nv / (denom + EPSILON)
}

/// Height-correlated Smith masking-shading in the local frame, given
/// `a2 = alpha^2`.
pub fn smith_ggx_masking_shading(wi: Direction, wo: Direction, a2: f32) -> f32 {
    let dot_nl = wi.y().abs();
    let dot_nv = wo.y().abs();
    let denom_a = dot_nv * (a2 + (1.0 - a2) * dot_nl * dot_nl).sqrt();
    let denom_b = dot_nl * (a2 + (1.0 - a2) * dot_nv * dot_nv).sqrt();
    2.0 * dot_nl * dot_nv / (denom_a + denom_b + EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_math::Vec3;

    fn dirs() -> Vec<Direction> {
        let mut out = Vec::new();
        for i in 0..12 {
            let cos_theta = 0.02 + 0.98 * i as f32 / 11.0;
            out.push(Direction::from_spherical(cos_theta, i as f32 * 0.7));
        }
        out
    }

    #[test]
    fn test_schlick_weight() {
        assert!((schlick_weight(1.0) - 0.0).abs() < 0.001);
        assert!((schlick_weight(0.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_schlick_reflectance_at_normal_incidence() {
        let down = -Direction::UP;
        let r = schlick_reflectance(down, Direction::UP, 0.0, 1.0, 1.5);
        assert!((r - 0.04).abs() < 1e-5);

        // Explicit r0 wins over the indices
        let r = schlick_reflectance(down, Direction::UP, 0.5, 1.0, 1.5);
        assert!((r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_schlick_reflectance_in_unit_range() {
        for d in dirs() {
            let incident = -d;
            for (n1, n2) in [(1.0, 1.5), (1.5, 1.0), (1.0, 2.4), (1.33, 1.0)] {
                let r = schlick_reflectance(incident, Direction::UP, 0.0, n1, n2);
                assert!((0.0..=1.0).contains(&r), "r={r} n1={n1} n2={n2}");
            }
        }
    }

    #[test]
    fn test_schlick_total_internal_reflection() {
        // Glass to air beyond the ~41.8 degree critical angle
        let incident = Direction::new(Vec3::new(0.9, -0.3, 0.0));
        let r = schlick_reflectance(incident, Direction::UP, 0.0, 1.5, 1.0);
        assert_eq!(r, 1.0);

        // Same angle entering glass never reflects fully
        let r = schlick_reflectance(incident, Direction::UP, 0.0, 1.0, 1.5);
        assert!(r < 1.0);
    }

    #[test]
    fn test_schlick_fresnel_energy_matches_scalar() {
        let f0 = Energy::new(0.04, 0.5, 0.9);
        let cos_theta = 0.3;
        let e = schlick_fresnel_energy(f0, cos_theta);
        assert!((e.red() - schlick_fresnel(0.04, cos_theta)).abs() < 1e-6);
        assert!((e.green() - schlick_fresnel(0.5, cos_theta)).abs() < 1e-6);
        assert!((e.blue() - schlick_fresnel(0.9, cos_theta)).abs() < 1e-6);
    }

    #[test]
    fn test_beers_law_zero_distance() {
        let absorb = Energy::new(0.5, 3.0, 100.0);
        assert_eq!(beers_law_attenuation(0.0, absorb), Energy::ONE);
    }

    #[test]
    fn test_beers_law_strictly_decreasing() {
        let absorb = Energy::new(0.1, 1.0, 4.0);
        let mut prev = beers_law_attenuation(0.0, absorb);
        for i in 1..20 {
            let next = beers_law_attenuation(i as f32 * 0.1, absorb);
            assert!(next.red() < prev.red());
            assert!(next.green() < prev.green());
            assert!(next.blue() < prev.blue());
            assert!(next.blue() > 0.0);
            prev = next;
        }
    }

    #[test]
    fn test_ggx_distribution_finite_and_non_negative() {
        for roughness in [0.0, 0.001, 0.05, 0.25, 0.5, 0.75, 0.99, 1.0] {
            for wi in dirs() {
                for wo in dirs() {
                    let d = ggx_distribution(wi, wo, Direction::UP, roughness);
                    assert!(d.is_finite() && d >= 0.0, "d={d} roughness={roughness}");
                }
            }
        }
    }

    #[test]
    fn test_ggx_distribution_peak_at_min_roughness() {
        let a = ggx_alpha(0.0);
        let a2 = a * a;
        let peak = ggx_distribution(Direction::UP, Direction::UP, Direction::UP, 0.0);
        let expected = 1.0 / (PI * a2);
        assert!(((peak - expected) / expected).abs() < 1e-3, "peak={peak} expected={expected}");
    }

    #[test]
    fn test_ggx_distribution_normalized() {
        // Integral of D(m) * cos(theta_m) over the hemisphere is 1
        let roughness = 0.5;
        let steps = 2000;
        let mut sum = 0.0;
        for i in 0..steps {
            let cos_theta = (i as f32 + 0.5) / steps as f32;
            let m = Direction::from_spherical(cos_theta, 0.0);
            // wi == wo == m makes the half-vector m itself
            let d = ggx_distribution(m, m, Direction::UP, roughness);
            sum += d * cos_theta / steps as f32;
        }
        let integral = 2.0 * PI * sum;
        assert!((integral - 1.0).abs() < 0.01, "integral={integral}");
    }

    #[test]
    fn test_smith_terms_in_unit_range() {
        for roughness in [0.0, 0.05, 0.3, 0.6, 1.0] {
            let a = ggx_alpha(roughness);
            let a2 = a * a;
            for wi in dirs() {
                let g1 = smith_ggx_shadowing(wi, Direction::UP, roughness);
                assert!((0.0..=1.0).contains(&g1), "g1={g1}");
                let m = smith_ggx_masking(wi, a2);
                assert!((0.0..=1.0).contains(&m), "masking={m}");
                for wo in dirs() {
                    let g2 = smith_ggx_masking_shading(wi, wo, a2);
                    assert!((0.0..=1.0).contains(&g2), "g2={g2}");
                }
            }
        }
    }

    #[test]
    fn test_smith_at_grazing_is_finite() {
        let flat = Direction::new(Vec3::X);
        assert_eq!(smith_ggx_shadowing(flat, Direction::UP, 0.0), 0.0);
        assert_eq!(smith_ggx_masking_shading(flat, flat, 0.0), 0.0);
    }

    #[test]
    fn test_smith_shadowing_agrees_with_masking() {
        let wo = Direction::from_spherical(0.4, 1.0);
        let roughness = 0.6;
        let a = ggx_alpha(roughness);
        let g = smith_ggx_shadowing(wo, Direction::UP, roughness);
        let m = smith_ggx_masking(wo, a * a);
        assert!((g - m).abs() < 1e-5);
    }
}
