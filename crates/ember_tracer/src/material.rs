//! Material trait for surface scattering.
//!
//! Materials evaluate in a local shading frame where the surface normal is
//! `Direction::UP`. `wo` points from the surface toward the viewer (back
//! along the incoming ray) and `wi` points toward where light arrives from,
//! which is where the path continues.

use crate::sampling::{cosine_hemisphere, gen_f32, ggx_half_vector};
use crate::shading::{
    beers_law_attenuation, ggx_alpha, ggx_distribution, reflectance_at_normal,
    schlick_fresnel_energy, schlick_reflectance, smith_ggx_masking_shading,
};
use ember_math::{Direction, Energy, Frame};
use rand::RngCore;
use std::f32::consts::{FRAC_1_PI, PI};

/// Result of scattering a path at a surface.
#[derive(Debug, Clone, Copy)]
pub struct Scatter {
    /// World-space direction the path continues in
    pub direction: Direction,
    /// Multiplier applied to the path throughput (eval / pdf)
    pub attenuation: Energy,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Importance-sample an incoming light direction `wi` for the viewer
    /// direction `wo`, both in the local frame.
    fn sample(&self, wo: Direction, rng: &mut dyn RngCore) -> Direction;

    /// Density of [`Material::sample`] producing `wi` for `wo`.
    fn pdf(&self, wi: Direction, wo: Direction) -> f32;

    /// Reflected energy for the pair, including the `cos(theta_i)` factor
    /// and not yet divided by the pdf.
    fn eval(&self, wi: Direction, wo: Direction) -> Energy;

    /// Light emitted by the surface toward a ray travelling along `incoming`.
    fn emit(&self, _normal: Direction, _incoming: Direction) -> Energy {
        Energy::ZERO
    }

    /// Scatter a ray travelling along `incoming` that hit this surface after
    /// `distance`.
    ///
    /// Returns `None` when the path ends here. The default implementation
    /// samples in the local frame of the side facing the ray and weights by
    /// `eval / pdf`.
    fn scatter(
        &self,
        normal: Direction,
        incoming: Direction,
        _distance: f32,
        rng: &mut dyn RngCore,
    ) -> Option<Scatter> {
        let facing = if normal.dot(incoming) > 0.0 { -normal } else { normal };
        let frame = Frame::from_normal(facing);
        let wo = frame.to_local(-incoming);

        // Grazing view: nothing is reflected toward the viewer
        if wo.cos_theta() <= 0.0 {
            return None;
        }

        let wi = self.sample(wo, rng);

        // Sampled below the surface: absorbed
        if wi.cos_theta() <= 0.0 {
            return None;
        }

        let pdf = self.pdf(wi, wo);
        debug_assert!(pdf > 0.0, "material sampled a direction with pdf {pdf}");
        if pdf <= 0.0 {
            return None;
        }

        let attenuation = self.eval(wi, wo).scaled(1.0 / pdf);
        debug_assert!(attenuation.is_valid(), "invalid attenuation {attenuation:?}");

        Some(Scatter {
            direction: frame.to_world(wi),
            attenuation,
        })
    }
}

/// Lambertian (diffuse) material.
///
/// Cosine-weighted sampling with `pdf = cos / pi` and
/// `eval = albedo * cos / pi`, so every scattered path is weighted by
/// exactly `albedo`.
#[derive(Debug, Clone)]
pub struct Lambert {
    albedo: Energy,
}

impl Lambert {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Energy) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Energy {
        self.albedo
    }
}

impl Material for Lambert {
    fn sample(&self, _wo: Direction, rng: &mut dyn RngCore) -> Direction {
        cosine_hemisphere(rng)
    }

    fn pdf(&self, wi: Direction, _wo: Direction) -> f32 {
        wi.cos_theta().max(0.0) * FRAC_1_PI
    }

    fn eval(&self, wi: Direction, _wo: Direction) -> Energy {
        self.albedo.scaled(wi.cos_theta().max(0.0) * FRAC_1_PI)
    }
}

/// Microfacet material: a GGX specular lobe over a Lambertian base.
///
/// The specular lobe is `F * D * G / (4 cos_i cos_o)` with Schlick Fresnel
/// and height-correlated Smith masking-shading. The diffuse base is
/// weighted by `1 - F`. Sampling picks one of the two lobes and the pdf is
/// the mixture of both.
#[derive(Debug, Clone)]
pub struct Microfacet {
    /// Diffuse base color
    pub albedo: Energy,
    /// Fresnel reflectance at normal incidence
    pub f0: Energy,
    /// Perceptual roughness: 0 = mirror-like, 1 = very rough
    pub roughness: f32,
}

impl Microfacet {
    /// Create a microfacet material from its raw parameters.
    pub fn new(albedo: Energy, f0: Energy, roughness: f32) -> Self {
        Self {
            albedo,
            f0,
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    /// A conductor: colored specular, no diffuse base.
    pub fn metal(color: Energy, roughness: f32) -> Self {
        Self::new(Energy::ZERO, color, roughness)
    }

    /// A dielectric coating of index `ior` over a diffuse base.
    pub fn plastic(albedo: Energy, roughness: f32, ior: f32) -> Self {
        Self::new(albedo, Energy::splat(reflectance_at_normal(1.0, ior)), roughness)
    }

    /// Builder method to set roughness.
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Probability of sampling the specular lobe.
    ///
    /// Kept inside [0.1, 0.9] so each lobe can always reach the whole
    /// upper hemisphere through the mixture.
    fn specular_chance(&self) -> f32 {
        let specular = self.f0.max_component();
        let diffuse = self.albedo.max_component() * (1.0 - specular);
        if specular + diffuse <= 0.0 {
            return 0.5;
        }
        (specular / (specular + diffuse)).clamp(0.1, 0.9)
    }

    fn specular_pdf(&self, wi: Direction, wo: Direction) -> f32 {
        let h = wi.half(wo);
        let wo_dot_h = wo.dot(h).abs().max(1e-7);
        ggx_distribution(wi, wo, Direction::UP, self.roughness) * h.cos_theta() / (4.0 * wo_dot_h)
    }
}

impl Material for Microfacet {
    fn sample(&self, wo: Direction, rng: &mut dyn RngCore) -> Direction {
        if gen_f32(rng) < self.specular_chance() {
            let h = ggx_half_vector(ggx_alpha(self.roughness), rng);
            wo.reflect(h)
        } else {
            cosine_hemisphere(rng)
        }
    }

    fn pdf(&self, wi: Direction, wo: Direction) -> f32 {
        if wi.cos_theta() <= 0.0 || wo.cos_theta() <= 0.0 {
            return 0.0;
        }
        let p = self.specular_chance();
        p * self.specular_pdf(wi, wo) + (1.0 - p) * wi.cos_theta() * FRAC_1_PI
    }

    fn eval(&self, wi: Direction, wo: Direction) -> Energy {
        let cos_i = wi.cos_theta();
        let cos_o = wo.cos_theta();
        if cos_i <= 0.0 || cos_o <= 0.0 {
            return Energy::ZERO;
        }

        let h = wi.half(wo);
        let fresnel = schlick_fresnel_energy(self.f0, wi.dot(h).max(0.0));
        let alpha = ggx_alpha(self.roughness);
        let d = ggx_distribution(wi, wo, Direction::UP, self.roughness);
        let g = smith_ggx_masking_shading(wi, wo, alpha * alpha);

        // cos_i cancels against the BRDF denominator
        let specular = fresnel.scaled(d * g / (4.0 * cos_o));
        let diffuse = fresnel.complement().by(self.albedo).scaled(cos_i / PI);
        specular.plus(diffuse)
    }
}

/// Smooth dielectric (glass, water) with optional volumetric absorption.
///
/// Reflects or refracts by Schlick's approximation and attenuates light
/// that travelled through the interior with Beer's law.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    ior: f32,
    /// Absorption coefficient per unit distance inside the medium
    absorb: Energy,
}

impl Dielectric {
    /// Create a clear dielectric.
    pub fn new(ior: f32) -> Self {
        Self {
            ior,
            absorb: Energy::ZERO,
        }
    }

    /// Builder method to set the interior absorption coefficient.
    pub fn with_absorption(mut self, absorb: Energy) -> Self {
        self.absorb = absorb;
        self
    }

    fn reflectance(&self, wo: Direction) -> f32 {
        schlick_reflectance(-wo, Direction::UP, 0.0, 1.0, self.ior)
    }
}

impl Material for Dielectric {
    // sample/pdf/eval describe the mirror lobe alone as a discrete choice:
    // it is picked with probability equal to its reflectance.
    fn sample(&self, wo: Direction, _rng: &mut dyn RngCore) -> Direction {
        wo.reflect(Direction::UP)
    }

    fn pdf(&self, wi: Direction, wo: Direction) -> f32 {
        if wi.dot(wo.reflect(Direction::UP)) > 1.0 - 1e-4 {
            self.reflectance(wo)
        } else {
            0.0
        }
    }

    fn eval(&self, wi: Direction, wo: Direction) -> Energy {
        Energy::splat(self.pdf(wi, wo))
    }

    fn scatter(
        &self,
        normal: Direction,
        incoming: Direction,
        distance: f32,
        rng: &mut dyn RngCore,
    ) -> Option<Scatter> {
        let entering = incoming.dot(normal) < 0.0;
        let (facing, n1, n2) = if entering {
            (normal, 1.0, self.ior)
        } else {
            (-normal, self.ior, 1.0)
        };

        // Light leaving the medium travelled `distance` through it
        let attenuation = if entering {
            Energy::ONE
        } else {
            beers_law_attenuation(distance.max(0.0), self.absorb)
        };

        let reflectance = schlick_reflectance(incoming, facing, 0.0, n1, n2);
        let mirror = (-incoming).reflect(facing);
        let direction = if gen_f32(rng) < reflectance {
            mirror
        } else {
            incoming.refract(facing, n1 / n2).unwrap_or(mirror)
        };

        Some(Scatter {
            direction,
            attenuation,
        })
    }
}

/// Diffuse light emitter. Emits from both sides and never scatters.
///
/// `sample` and `pdf` describe a cosine lobe so they stay consistent, but
/// `eval` is zero and `scatter` always ends the path.
#[derive(Debug, Clone)]
pub struct Light {
    radiance: Energy,
}

impl Light {
    /// Create a new light with the given emitted radiance.
    pub fn new(radiance: Energy) -> Self {
        Self { radiance }
    }
}

impl Material for Light {
    fn sample(&self, _wo: Direction, rng: &mut dyn RngCore) -> Direction {
        cosine_hemisphere(rng)
    }

    fn pdf(&self, wi: Direction, _wo: Direction) -> f32 {
        wi.cos_theta().max(0.0) * FRAC_1_PI
    }

    fn eval(&self, _wi: Direction, _wo: Direction) -> Energy {
        Energy::ZERO
    }

    fn emit(&self, _normal: Direction, _incoming: Direction) -> Energy {
        self.radiance
    }

    fn scatter(
        &self,
        _normal: Direction,
        _incoming: Direction,
        _distance: f32,
        _rng: &mut dyn RngCore,
    ) -> Option<Scatter> {
        None
    }
}
