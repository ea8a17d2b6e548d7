//! Ember tracer - adaptive Monte Carlo path tracing core.
//!
//! Estimates the radiance reaching each pixel by tracing random light
//! paths and evaluating physically-based materials at every bounce.
//!
//! - [`shading`]: Fresnel, Beer's law and GGX/Smith microfacet terms
//! - [`Material`]: Lambert, microfacet, dielectric and light models
//! - [`trace_path`]: the per-path integrator with Russian roulette
//! - [`Sampler`]: the adaptive frame controller and pixel accumulator
//!
//! Scenes and cameras are consumed through the [`Scene`] and [`Camera`]
//! traits; [`World`], [`Sphere`], [`Plane`] and [`PinholeCamera`] are
//! simple implementations for tests and demos.

mod camera;
mod integrator;
mod material;
pub mod pixel;
mod plane;
mod sampler;
pub mod sampling;
mod scene;
pub mod shading;
mod sphere;

pub use camera::{Camera, PinholeCamera};
pub use integrator::{roulette, trace_path, PathSample, Termination};
pub use material::{Dielectric, Lambert, Light, Material, Microfacet, Scatter};
pub use pixel::Pixel;
pub use plane::Plane;
pub use sampler::{
    adaptive_samples, FrameStats, Sampler, SamplerConfig, SamplerError, SamplerResult, BIAS,
};
pub use scene::{Environment, Hit, Scene, Surface, World};
pub use sphere::Sphere;

/// Re-export the math types used throughout the public API
pub use ember_math::{Direction, Energy, Frame, Interval, Ray, Vec3};
