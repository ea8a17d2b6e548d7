//! Scene seam consumed by the integrator.
//!
//! The integrator only needs the nearest hit along a ray, the normal and
//! material at that point, and the radiance of rays that escape. `World`
//! is a flat list of surfaces that provides all three.

use crate::Material;
use ember_math::{Direction, Energy, Interval, Ray, Vec3};

/// A surface that can be hit by rays.
pub trait Surface: Send + Sync {
    /// Distance to the nearest intersection strictly inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32>;

    /// Geometric normal and material at a point on the surface.
    fn at(&self, point: Vec3) -> (Direction, &dyn Material);
}

/// Nearest intersection of a ray with the scene.
#[derive(Clone, Copy)]
pub struct Hit<'a> {
    /// Distance along the ray
    pub distance: f32,
    /// The surface that was hit
    pub surface: &'a dyn Surface,
}

/// Everything the integrator needs from the scene.
pub trait Scene: Send + Sync {
    /// Nearest intersection in front of the ray origin, if any.
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>>;

    /// Radiance arriving along a ray that escapes all geometry.
    fn env(&self, ray: &Ray) -> Energy;
}

/// Background radiance for rays that miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Environment {
    /// Same radiance in every direction
    Uniform(Energy),
    /// Vertical blend from `horizon` (looking down) to `zenith` (looking up)
    Sky { horizon: Energy, zenith: Energy },
}

impl Environment {
    /// The classic white-to-blue sky.
    pub fn sky() -> Self {
        Environment::Sky {
            horizon: Energy::ONE,
            zenith: Energy::new(0.5, 0.7, 1.0),
        }
    }

    /// Radiance seen along `direction`.
    pub fn radiance(&self, direction: Direction) -> Energy {
        match *self {
            Environment::Uniform(energy) => energy,
            Environment::Sky { horizon, zenith } => {
                let a = 0.5 * (direction.y() + 1.0);
                horizon.scaled(1.0 - a).plus(zenith.scaled(a))
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Uniform(Energy::ZERO)
    }
}

/// A list of surfaces under an environment.
pub struct World {
    surfaces: Vec<Box<dyn Surface>>,
    environment: Environment,
}

impl World {
    /// Create an empty world lit only by `environment`.
    pub fn new(environment: Environment) -> Self {
        Self {
            surfaces: Vec::new(),
            environment,
        }
    }

    /// Add a surface to the world.
    pub fn add(&mut self, surface: Box<dyn Surface>) {
        self.surfaces.push(surface);
    }

    /// Builder form of [`World::add`].
    pub fn with(mut self, surface: impl Surface + 'static) -> Self {
        self.add(Box::new(surface));
        self
    }

    /// Get the number of surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Check if the world has no surfaces.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

impl Scene for World {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let mut nearest: Option<Hit<'_>> = None;
        let mut closest_so_far = Interval::FORWARD.max;

        for surface in &self.surfaces {
            if let Some(distance) = surface.hit(ray, Interval::FORWARD.with_max(closest_so_far)) {
                closest_so_far = distance;
                nearest = Some(Hit {
                    distance,
                    surface: surface.as_ref(),
                });
            }
        }

        nearest
    }

    fn env(&self, ray: &Ray) -> Energy {
        self.environment.radiance(ray.direction())
    }
}
