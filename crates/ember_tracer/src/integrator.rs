//! Unidirectional path integrator.
//!
//! Traces one light path per call: accumulates emission at every hit,
//! scatters through the surface material, and ends on a miss, an absorbing
//! surface, a Russian-roulette kill or the bounce budget.

use crate::sampling::gen_f32;
use crate::Scene;
use ember_math::{Energy, Ray};
use rand::RngCore;

/// Why a path stopped. All of these are valid outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Escaped the scene and picked up environment radiance
    Miss,
    /// Ran out of bounces
    BounceLimit,
    /// Killed by Russian roulette
    Roulette,
    /// The material did not scatter (e.g. a light)
    Absorbed,
}

/// One-sample radiance estimate along a traced path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    /// Accumulated radiance
    pub energy: Energy,
    /// Surfaces hit before the path ended
    pub bounces: u32,
    pub termination: Termination,
}

/// Trace a single path from `ray` for at most `max_bounces` surface hits.
pub fn trace_path(
    ray: Ray,
    scene: &dyn Scene,
    max_bounces: u32,
    rng: &mut dyn RngCore,
) -> PathSample {
    let mut ray = ray;
    let mut signal = Energy::ONE;
    let mut energy = Energy::ZERO;

    for bounce in 0..max_bounces {
        let Some(hit) = scene.intersect(&ray) else {
            energy = energy.gained(scene.env(&ray), signal);
            return PathSample {
                energy,
                bounces: bounce,
                termination: Termination::Miss,
            };
        };

        let point = ray.at(hit.distance);
        let (normal, material) = hit.surface.at(point);
        energy = energy.gained(material.emit(normal, ray.direction()), signal);

        signal = match roulette(signal, rng) {
            Some(survivor) => survivor,
            None => {
                return PathSample {
                    energy,
                    bounces: bounce + 1,
                    termination: Termination::Roulette,
                }
            }
        };

        match material.scatter(normal, ray.direction(), hit.distance, rng) {
            Some(scatter) => {
                signal = signal.by(scatter.attenuation);
                ray = Ray::new(point, scatter.direction);
            }
            None => {
                return PathSample {
                    energy,
                    bounces: bounce + 1,
                    termination: Termination::Absorbed,
                }
            }
        }
    }

    PathSample {
        energy,
        bounces: max_bounces,
        termination: Termination::BounceLimit,
    }
}

/// Russian roulette on the path throughput.
///
/// Survives with probability `min(max channel, 1)` and rescales the
/// survivor by the inverse, so the expected throughput is unchanged.
/// Full-strength signals always survive untouched.
pub fn roulette(signal: Energy, rng: &mut dyn RngCore) -> Option<Energy> {
    let survival = signal.max_component().min(1.0);
    if survival >= 1.0 {
        return Some(signal);
    }
    if survival <= 0.0 || gen_f32(rng) >= survival {
        return None;
    }
    Some(signal.scaled(1.0 / survival))
}
